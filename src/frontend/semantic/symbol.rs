//! Symbols and the binding side tables
//!
//! Symbols and struct definitions live in arenas owned by `Bindings` and
//! are referred to by index everywhere else: scopes map names to
//! `SymbolId`s, struct variables point at their definition through a
//! `StructId`, and tree nodes are linked to symbols through their
//! `NodeId`.

use std::collections::HashMap;

use crate::frontend::ast::NodeId;
use crate::frontend::semantic::symbol_table::SymbolTable;
use crate::types::Type;
use crate::utils::Span;

/// Index of a symbol in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(usize);

/// Index of a struct definition in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructId(usize);

/// Symbol information
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Where the name was declared
    pub span: Span,
}

/// Kind of symbol
#[derive(Debug, Clone)]
pub enum SymbolKind {
    /// Variable, formal or field of a scalar type
    Plain(Type),
    Function { params: Vec<Type>, ret: Type },
    /// Variable or field whose type is a named struct
    StructVar { def: StructId, struct_name: String },
    /// The struct type name; the id owns its field table
    StructDef(StructId),
}

impl Symbol {
    /// Semantic type of this symbol
    pub fn ty(&self) -> Type {
        match &self.kind {
            SymbolKind::Plain(ty) => ty.clone(),
            SymbolKind::Function { params, ret } => Type::function(params.clone(), ret.clone()),
            SymbolKind::StructVar { struct_name, .. } => Type::Struct(struct_name.clone()),
            SymbolKind::StructDef(_) => Type::StructDef(self.name.clone()),
        }
    }

    /// Number of parameters, for function symbols
    pub fn arity(&self) -> Option<usize> {
        match &self.kind {
            SymbolKind::Function { params, .. } => Some(params.len()),
            _ => None,
        }
    }

    /// Struct definition reached through this symbol, if it is a struct
    /// variable
    pub fn struct_def(&self) -> Option<StructId> {
        match &self.kind {
            SymbolKind::StructVar { def, .. } => Some(*def),
            _ => None,
        }
    }

    /// Human-readable form used by the annotated unparse, e.g.
    /// `int, bool -> void` for functions
    pub fn describe(&self) -> String {
        match &self.kind {
            SymbolKind::Function { params, ret } => {
                let params = if params.is_empty() {
                    "void".to_string()
                } else {
                    params
                        .iter()
                        .map(|p| p.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                format!("{} -> {}", params, ret)
            }
            _ => self.ty().to_string(),
        }
    }
}

/// A struct definition and its private field namespace
#[derive(Debug, Clone)]
pub struct StructInfo {
    pub name: String,
    pub fields: SymbolTable,
}

/// Everything name resolution learned about a program: the symbol and
/// struct arenas, the node links, and the global scope as it stood at the
/// end of the walk.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    symbols: Vec<Symbol>,
    structs: Vec<StructInfo>,
    links: HashMap<NodeId, SymbolId>,
    dot_structs: HashMap<NodeId, StructId>,
    globals: SymbolTable,
}

impl Bindings {
    pub(crate) fn alloc_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len());
        self.symbols.push(symbol);
        id
    }

    pub(crate) fn alloc_struct(&mut self, info: StructInfo) -> StructId {
        let id = StructId(self.structs.len());
        self.structs.push(info);
        id
    }

    /// Link a node to the symbol it denotes; a node is linked at most once
    pub(crate) fn link(&mut self, node: NodeId, symbol: SymbolId) {
        self.links.entry(node).or_insert(symbol);
    }

    /// Record the struct definition a dot-access evaluates to
    pub(crate) fn annotate_dot(&mut self, node: NodeId, def: StructId) {
        self.dot_structs.entry(node).or_insert(def);
    }

    pub(crate) fn set_globals(&mut self, globals: SymbolTable) {
        self.globals = globals;
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0]
    }

    pub fn struct_info(&self, id: StructId) -> &StructInfo {
        &self.structs[id.0]
    }

    /// Symbol linked to a node, if resolution succeeded for it
    pub fn resolved(&self, node: NodeId) -> Option<&Symbol> {
        self.links.get(&node).map(|id| self.symbol(*id))
    }

    /// Struct definition a dot-access node evaluates to, when its field is
    /// itself struct-typed
    pub fn dot_struct(&self, node: NodeId) -> Option<StructId> {
        self.dot_structs.get(&node).copied()
    }

    /// The outermost scope left after resolution
    pub fn globals(&self) -> &SymbolTable {
        &self.globals
    }

    /// Look up a name in the global scope
    pub fn global(&self, name: &str) -> Option<&Symbol> {
        self.globals.lookup_local(name).map(|id| self.symbol(id))
    }

    /// Look up a field of a struct definition
    pub fn field(&self, def: StructId, name: &str) -> Option<&Symbol> {
        self.struct_info(def)
            .fields
            .lookup_local(name)
            .map(|id| self.symbol(id))
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }
}
