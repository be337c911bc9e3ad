use super::scope::Scope;
use super::symbol::{Symbol, SymbolId, SymbolKind};

/// An ordered list of every symbol ever inserted, plus a stack of scopes
/// implementing lexical lookup with an innermost-first, outermost-last
/// search order.
///
/// The same type serves as both the single global table (whose scope
/// stack never grows past one entry) and each function's local table
/// (whose stack grows and shrinks as block scopes are entered and left).
/// Popping a scope only drops its name map; the symbols it declared stay
/// in `arena` — their stack homes are live for the rest of the function.
#[derive(Debug, Default)]
pub struct SymbolTable {
    arena: Vec<Symbol>,
    scopes: Vec<Scope>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision;

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable {
            arena: Vec::new(),
            scopes: vec![Scope::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    pub fn pop_scope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot pop the outermost scope");
        self.scopes.pop();
    }

    /// Inserts `symbol` into the innermost scope, assigning it the next
    /// sequence number. Fails without inserting if the innermost scope
    /// already has a symbol by that name.
    pub fn insert(&mut self, name: &str, kind: SymbolKind) -> Result<SymbolId, Collision> {
        let scope = self.scopes.last_mut().expect("scope stack is never empty");
        if scope.get(name).is_some() {
            return Err(Collision);
        }
        let id = SymbolId(self.arena.len() as u32);
        self.arena.push(Symbol::new(name.to_owned(), kind, id.0));
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .declare(name, id);
        Ok(id)
    }

    /// Looks up `name` starting at the innermost active scope and working
    /// outward. Does not fall back to any other table; the binder is
    /// responsible for trying the global table when a function-local
    /// lookup misses.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.arena[id.index()]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.arena[id.index()]
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// All symbols in insertion (= sequence-number) order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.arena.iter()
    }

    pub fn iter_kind(&self, kind: SymbolKind) -> impl Iterator<Item = &Symbol> {
        self.arena.iter().filter(move |s| s.kind == kind)
    }
}
