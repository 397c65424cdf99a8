//! Scoped symbol table
//!
//! A stack of name → symbol maps, innermost scope last. The table holds
//! `SymbolId`s; the symbols themselves stay in the `Bindings` arena, so
//! popping a scope only forgets names.

use std::collections::HashMap;

use crate::frontend::semantic::symbol::SymbolId;
use crate::utils::{Error, Result};

/// Symbol table with nested scopes
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<HashMap<String, SymbolId>>,
}

impl SymbolTable {
    /// Create a table holding one (global) scope
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    /// Define a symbol in the innermost scope
    pub fn declare(&mut self, name: &str, symbol: SymbolId) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidArgument("name is empty".to_string()));
        }
        let scope = self.scopes.last_mut().ok_or(Error::NoActiveScope)?;
        if scope.contains_key(name) {
            return Err(Error::DuplicateName {
                name: name.to_string(),
            });
        }
        scope.insert(name.to_string(), symbol);
        Ok(())
    }

    /// Enter a new, empty innermost scope
    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Drop the innermost scope
    pub fn pop_scope(&mut self) -> Result<()> {
        self.scopes.pop().map(|_| ()).ok_or(Error::NoActiveScope)
    }

    /// Look up a symbol only in the innermost scope
    pub fn lookup_local(&self, name: &str) -> Option<SymbolId> {
        self.scopes.last()?.get(name).copied()
    }

    /// Look up a symbol, searching from the innermost scope outward
    pub fn lookup_any(&self, name: &str) -> Option<SymbolId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    /// Number of scopes currently on the stack
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Names declared in the innermost scope
    pub fn local_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .scopes
            .last()
            .map(|scope| scope.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::semantic::symbol::{Bindings, Symbol, SymbolKind};
    use crate::types::Type;
    use crate::utils::Span;

    fn ids(count: usize) -> Vec<SymbolId> {
        let mut bindings = Bindings::default();
        (0..count)
            .map(|i| {
                bindings.alloc_symbol(Symbol {
                    name: format!("s{}", i),
                    kind: SymbolKind::Plain(Type::Int),
                    span: Span::new(1, 1),
                })
            })
            .collect()
    }

    #[test]
    fn test_declare_and_lookup() {
        let ids = ids(1);
        let mut table = SymbolTable::new();
        table.declare("x", ids[0]).unwrap();

        assert_eq!(table.lookup_local("x"), Some(ids[0]));
        assert_eq!(table.lookup_any("x"), Some(ids[0]));
        assert_eq!(table.lookup_any("y"), None);
    }

    #[test]
    fn test_duplicate_rejected_first_kept() {
        let ids = ids(2);
        let mut table = SymbolTable::new();
        table.declare("x", ids[0]).unwrap();

        assert_eq!(
            table.declare("x", ids[1]),
            Err(Error::DuplicateName { name: "x".to_string() })
        );
        assert_eq!(table.lookup_local("x"), Some(ids[0]));
    }

    #[test]
    fn test_shadowing() {
        let ids = ids(2);
        let mut table = SymbolTable::new();
        table.declare("x", ids[0]).unwrap();
        table.push_scope();
        table.declare("x", ids[1]).unwrap();

        assert_eq!(table.lookup_any("x"), Some(ids[1]));

        table.pop_scope().unwrap();
        assert_eq!(table.lookup_any("x"), Some(ids[0]));
    }

    #[test]
    fn test_pop_forgets_inner_names() {
        let ids = ids(1);
        let mut table = SymbolTable::new();
        for _ in 0..3 {
            table.push_scope();
        }
        table.declare("inner", ids[0]).unwrap();
        table.pop_scope().unwrap();

        assert_eq!(table.lookup_local("inner"), None);
        assert_eq!(table.lookup_any("inner"), None);
        assert_eq!(table.depth(), 3);
    }

    #[test]
    fn test_no_active_scope() {
        let ids = ids(1);
        let mut table = SymbolTable::new();
        table.pop_scope().unwrap();

        assert_eq!(table.pop_scope(), Err(Error::NoActiveScope));
        assert_eq!(table.declare("x", ids[0]), Err(Error::NoActiveScope));
        assert_eq!(table.lookup_local("x"), None);
        assert_eq!(table.lookup_any("x"), None);
        assert_eq!(table.depth(), 0);
    }

    #[test]
    fn test_empty_name_is_invalid() {
        let ids = ids(1);
        let mut table = SymbolTable::new();
        assert!(matches!(table.declare("", ids[0]), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_local_names_sorted() {
        let ids = ids(2);
        let mut table = SymbolTable::new();
        table.declare("b", ids[0]).unwrap();
        table.declare("a", ids[1]).unwrap();
        assert_eq!(table.local_names(), vec!["a", "b"]);
    }
}
