//! Abstract Syntax Tree definitions for cflat
//!
//! Identifier and dot-access nodes carry a parser-assigned `NodeId`; name
//! resolution records what each of them denotes in a side table keyed by
//! that id, so the tree itself is never mutated after parsing.

use crate::utils::Span;

/// Stable identity of an identifier or dot-access node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// A complete program (compilation unit)
#[derive(Debug, Clone)]
pub struct Program {
    pub decls: Vec<Decl>,
}

/// Top-level declarations
#[derive(Debug, Clone)]
pub enum Decl {
    Var(VarDecl),
    Function(FnDecl),
    Struct(StructDecl),
}

/// Variable (or struct field) declaration
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub ty: TypeSpec,
    pub name: Ident,
}

/// Declared type as written in the source
#[derive(Debug, Clone)]
pub enum TypeSpec {
    Int,
    Bool,
    Void,
    /// `struct Name`; the identifier names the struct type
    Struct(Ident),
}

/// Function definition
#[derive(Debug, Clone)]
pub struct FnDecl {
    pub ret: TypeSpec,
    pub name: Ident,
    pub formals: Vec<Formal>,
    pub body: Body,
}

/// Function parameter
#[derive(Debug, Clone)]
pub struct Formal {
    pub ty: TypeSpec,
    pub name: Ident,
}

/// Struct type definition
#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: Ident,
    pub fields: Vec<VarDecl>,
}

/// Declarations followed by statements; the body of a function or of a
/// block statement
#[derive(Debug, Clone, Default)]
pub struct Body {
    pub decls: Vec<VarDecl>,
    pub stmts: Vec<Stmt>,
}

/// Statement
#[derive(Debug, Clone)]
pub enum Stmt {
    /// loc = exp;
    Assign(Assign),
    /// loc++;
    PostInc(Expr),
    /// loc--;
    PostDec(Expr),
    /// cin >> loc;
    Read(Expr),
    /// cout << exp;
    Write(Expr),
    If {
        cond: Expr,
        body: Body,
    },
    IfElse {
        cond: Expr,
        then_body: Body,
        else_body: Body,
    },
    While {
        cond: Expr,
        body: Body,
    },
    Repeat {
        count: Expr,
        body: Body,
    },
    /// f(args);
    Call(Call),
    /// return [exp];
    Return {
        value: Option<Expr>,
    },
}

/// Identifier
#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub span: Span,
    pub id: NodeId,
}

/// Expression
#[derive(Debug, Clone)]
pub enum Expr {
    IntLit(i32, Span),
    /// Quotes and escapes as written
    StringLit(String, Span),
    True(Span),
    False(Span),
    Ident(Ident),
    DotAccess(DotAccess),
    Assign(Box<Assign>),
    Call(Call),
    Unary {
        op: UnOp,
        expr: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
}

/// Assignment, used both as a statement and as an expression
#[derive(Debug, Clone)]
pub struct Assign {
    pub lhs: Expr,
    pub rhs: Expr,
}

/// `base.field`
#[derive(Debug, Clone)]
pub struct DotAccess {
    pub base: Box<Expr>,
    pub field: Ident,
    pub id: NodeId,
}

/// Function call
#[derive(Debug, Clone)]
pub struct Call {
    pub callee: Ident,
    pub args: Vec<Expr>,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

/// Operator families sharing one typing rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    Arithmetic,
    Logical,
    Equality,
    Relational,
}

impl BinOp {
    pub fn class(self) -> OpClass {
        match self {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => OpClass::Arithmetic,
            BinOp::And | BinOp::Or => OpClass::Logical,
            BinOp::Eq | BinOp::Ne => OpClass::Equality,
            BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => OpClass::Relational,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
        }
    }
}

impl Expr {
    /// Position used when reporting on this expression: the left operand
    /// for binary and assignment nodes, the operand for unary nodes, the
    /// callee for calls and the field for dot-accesses.
    pub fn span(&self) -> Span {
        match self {
            Expr::IntLit(_, span)
            | Expr::StringLit(_, span)
            | Expr::True(span)
            | Expr::False(span) => *span,
            Expr::Ident(ident) => ident.span,
            Expr::DotAccess(access) => access.field.span,
            Expr::Assign(assign) => assign.lhs.span(),
            Expr::Call(call) => call.callee.span,
            Expr::Unary { expr, .. } => expr.span(),
            Expr::Binary { left, .. } => left.span(),
        }
    }
}
