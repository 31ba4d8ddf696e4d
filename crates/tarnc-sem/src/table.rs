//! Scope-stack symbol table.
//!
//! The table is an ordered stack of scopes, innermost last. Name
//! analysis pushes a scope on entering a function, `if`, `else`,
//! `while` or `repeat` body (struct fields get their own short-lived
//! scope), inserts declarations into the innermost scope, and resolves
//! uses innermost-outward.
//!
//! Scopes are `IndexMap`s so that iteration order is declaration order,
//! stable across runs.

use indexmap::IndexMap;
use tarnc_util::SymId;
use thiserror::Error;

/// One scope: declared names to their symbols, in declaration order
pub type Scope = IndexMap<String, SymId>;

/// Error type for symbol table operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Operation required an open scope but the table is empty
    #[error("symbol table has no open scope")]
    EmptyTable,

    /// The name is already bound in the innermost scope
    #[error("`{0}` is already declared in this scope")]
    Duplicate(String),
}

/// Stack of scopes, outermost first
#[derive(Debug, Default)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    /// Create a table with no open scopes
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    /// Open a new innermost scope
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Close and return the innermost scope
    pub fn pop_scope(&mut self) -> Result<Scope, TableError> {
        self.scopes.pop().ok_or(TableError::EmptyTable)
    }

    /// Number of open scopes
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Bind `name` in the innermost scope
    ///
    /// Fails with [`TableError::Duplicate`] if `name` is already bound
    /// there; outer scopes are not consulted (shadowing is legal).
    pub fn insert_local(&mut self, name: String, sym: SymId) -> Result<(), TableError> {
        let scope = self.scopes.last_mut().ok_or(TableError::EmptyTable)?;
        if scope.contains_key(&name) {
            return Err(TableError::Duplicate(name));
        }
        scope.insert(name, sym);
        Ok(())
    }

    /// Look `name` up in the innermost scope only
    pub fn lookup_local(&self, name: &str) -> Option<SymId> {
        self.scopes.last().and_then(|scope| scope.get(name)).copied()
    }

    /// Look `name` up innermost-outward, returning the first binding
    pub fn lookup_global(&self, name: &str) -> Option<SymId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tarnc_util::Idx;

    fn sym(n: usize) -> SymId {
        SymId::from_usize(n)
    }

    #[test]
    fn test_pop_empty_table_fails() {
        let mut table = SymbolTable::new();
        assert_eq!(table.pop_scope(), Err(TableError::EmptyTable));
    }

    #[test]
    fn test_insert_requires_open_scope() {
        let mut table = SymbolTable::new();
        assert_eq!(
            table.insert_local("x".into(), sym(0)),
            Err(TableError::EmptyTable)
        );
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut table = SymbolTable::new();
        table.push_scope();
        table.insert_local("x".into(), sym(0)).unwrap();

        assert_eq!(table.lookup_local("x"), Some(sym(0)));
        assert_eq!(table.lookup_global("x"), Some(sym(0)));
        assert_eq!(table.lookup_local("y"), None);
        assert_eq!(table.lookup_global("y"), None);
    }

    #[test]
    fn test_duplicate_rejected_in_innermost() {
        let mut table = SymbolTable::new();
        table.push_scope();
        table.insert_local("x".into(), sym(0)).unwrap();
        assert_eq!(
            table.insert_local("x".into(), sym(1)),
            Err(TableError::Duplicate("x".into()))
        );
        // the original binding is untouched
        assert_eq!(table.lookup_local("x"), Some(sym(0)));
    }

    #[test]
    fn test_shadowing_across_scopes_is_legal() {
        let mut table = SymbolTable::new();
        table.push_scope();
        table.insert_local("x".into(), sym(0)).unwrap();
        table.push_scope();
        // same name in an inner scope does not conflict
        table.insert_local("x".into(), sym(1)).unwrap();

        assert_eq!(table.lookup_local("x"), Some(sym(1)));
        assert_eq!(table.lookup_global("x"), Some(sym(1)));

        let popped = table.pop_scope().unwrap();
        assert_eq!(popped.get("x"), Some(&sym(1)));
        assert_eq!(table.lookup_global("x"), Some(sym(0)));
    }

    #[test]
    fn test_lookup_local_ignores_outer_scopes() {
        let mut table = SymbolTable::new();
        table.push_scope();
        table.insert_local("x".into(), sym(0)).unwrap();
        table.push_scope();

        assert_eq!(table.lookup_local("x"), None);
        assert_eq!(table.lookup_global("x"), Some(sym(0)));
    }

    #[test]
    fn test_scope_preserves_declaration_order() {
        let mut table = SymbolTable::new();
        table.push_scope();
        table.insert_local("b".into(), sym(0)).unwrap();
        table.insert_local("a".into(), sym(1)).unwrap();
        table.insert_local("c".into(), sym(2)).unwrap();

        let scope = table.pop_scope().unwrap();
        let names: Vec<_> = scope.keys().cloned().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_depth() {
        let mut table = SymbolTable::new();
        assert_eq!(table.depth(), 0);
        table.push_scope();
        table.push_scope();
        assert_eq!(table.depth(), 2);
        table.pop_scope().unwrap();
        assert_eq!(table.depth(), 1);
    }
}
