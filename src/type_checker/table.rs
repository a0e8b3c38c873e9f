use std::collections::HashMap;

use tracing::trace;

use crate::ast::ast::{NodeId, Symbol};

/// Scoped name → declaration bindings.
///
/// Each name maps to a stack of declarations, innermost last. Each open
/// scope records the names entered in it so `end_scope` can pop exactly
/// those bindings again, newest first.
#[derive(Debug, Default)]
pub struct Table {
    bindings: HashMap<Symbol, Vec<NodeId>>,
    scopes: Vec<Vec<Symbol>>,
}

impl Table {
    pub fn new() -> Self {
        Table::default()
    }

    pub fn begin_scope(&mut self) {
        self.scopes.push(vec![]);
        trace!(depth = self.scopes.len(), "begin scope");
    }

    /// Closes the innermost scope, restoring every binding it shadowed.
    pub fn end_scope(&mut self) {
        let Some(entered) = self.scopes.pop() else {
            return;
        };

        for name in entered.into_iter().rev() {
            if let Some(stack) = self.bindings.get_mut(&name) {
                stack.pop();
                if stack.is_empty() {
                    self.bindings.remove(&name);
                }
            }
        }
        trace!(depth = self.scopes.len(), "end scope");
    }

    /// Binds `name` in the innermost scope. Rebinding a name already bound
    /// in the same scope shadows it until that scope closes.
    pub fn enter(&mut self, name: Symbol, declaration: NodeId) {
        trace!(%name, %declaration, "enter");
        self.bindings.entry(name.clone()).or_default().push(declaration);

        // Bindings made outside any scope live until the table is dropped
        if let Some(scope) = self.scopes.last_mut() {
            scope.push(name);
        }
    }

    pub fn lookup(&self, name: &Symbol) -> Option<NodeId> {
        self.bindings.get(name).and_then(|stack| stack.last().copied())
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
