//! Type System for cflat
//!
//! The closed set of semantic types. `Error` is the absorbing type: once an
//! expression has been reported it carries `Error`, and every rule that sees
//! an `Error` operand stays silent.

use std::fmt;

/// Semantic type of an expression, symbol or declaration
#[derive(Debug, Clone)]
pub enum Type {
    Int,
    Bool,
    Void,
    String,
    /// A value of a named struct type
    Struct(String),
    /// The struct type name itself
    StructDef(String),
    Function { params: Vec<Type>, ret: Box<Type> },
    Error,
}

impl Type {
    pub fn function(params: Vec<Type>, ret: Type) -> Self {
        Self::Function {
            params,
            ret: Box::new(ret),
        }
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Self::Int)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Self::String)
    }

    /// A struct-typed value (struct variable or field)
    pub fn is_struct(&self) -> bool {
        matches!(self, Self::Struct(_))
    }

    /// The name of a struct type used as a value
    pub fn is_struct_def(&self) -> bool {
        matches!(self, Self::StructDef(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Self::Function { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int, Self::Int)
            | (Self::Bool, Self::Bool)
            | (Self::Void, Self::Void)
            | (Self::String, Self::String) => true,
            (Self::Struct(a), Self::Struct(b)) => a == b,
            (Self::StructDef(a), Self::StructDef(b)) => a == b,
            (
                Self::Function { params: pa, ret: ra },
                Self::Function { params: pb, ret: rb },
            ) => pa == pb && ra == rb,
            // Error never equals anything, itself included
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Bool => write!(f, "bool"),
            Self::Void => write!(f, "void"),
            Self::String => write!(f, "String"),
            Self::Struct(name) => write!(f, "{}", name),
            Self::StructDef(_) => write!(f, "struct"),
            Self::Function { .. } => write!(f, "function"),
            Self::Error => write!(f, "error"),
        }
    }
}
