//! Lexical environments.
//!
//! An [`Environment`] is a shared handle to one scope in a parent chain.
//! Child scopes are created for every block, loop iteration and call;
//! closures keep their defining scope alive through the handle.
//!
//! A closure stored in its own scope chain forms a reference cycle. The
//! interpreter records a [`WeakEnvironment`] for every captured scope and
//! calls [`Environment::clear_chain`] on each when the render ends.
//!
//! Lookups never walk the chain by name. Local reads use [`Environment::get`]
//! on the current scope, and references the resolver bound to an enclosing
//! scope use [`Environment::get_at`] with the recorded hop count.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::value::Value;

/// Error returned by assignment when no binding exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unbound;

struct Scope {
    bindings: RwLock<FxHashMap<String, Value>>,
    parent: Option<Environment>,
}

/// Shared handle to a scope.
#[derive(Clone)]
pub struct Environment(Arc<Scope>);

impl Environment {
    /// Root scope with no parent.
    pub fn new() -> Self {
        Environment(Arc::new(Scope {
            bindings: RwLock::new(FxHashMap::default()),
            parent: None,
        }))
    }

    /// Fresh empty scope whose parent is `self`.
    #[must_use]
    pub fn child(&self) -> Self {
        Environment(Arc::new(Scope {
            bindings: RwLock::new(FxHashMap::default()),
            parent: Some(self.clone()),
        }))
    }

    /// Insert or overwrite a binding in this scope.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.0.bindings.write().insert(name.into(), value);
    }

    /// Binding in this scope only.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.bindings.read().get(name).cloned()
    }

    /// Binding in the scope `distance` hops up the chain.
    pub fn get_at(&self, distance: usize, name: &str) -> Option<Value> {
        self.ancestor(distance)?.get(name)
    }

    /// Overwrite an existing binding in this scope.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), Unbound> {
        match self.0.bindings.write().get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Unbound),
        }
    }

    pub fn assign_at(&self, distance: usize, name: &str, value: Value) -> Result<(), Unbound> {
        self.ancestor(distance).ok_or(Unbound)?.assign(name, value)
    }

    pub fn parent(&self) -> Option<&Environment> {
        self.0.parent.as_ref()
    }

    fn ancestor(&self, distance: usize) -> Option<&Environment> {
        let mut env = self;
        for _ in 0..distance {
            env = env.parent()?;
        }
        Some(env)
    }

    /// Names bound in this scope.
    pub fn names(&self) -> Vec<String> {
        self.0.bindings.read().keys().cloned().collect()
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakEnvironment {
        WeakEnvironment(Arc::downgrade(&self.0))
    }

    /// Drop every binding in this scope and all of its ancestors.
    ///
    /// Values are dropped after the scope lock is released, so a binding
    /// whose drop reaches back into the chain cannot deadlock.
    pub fn clear_chain(&self) {
        let mut env = Some(self);
        while let Some(scope) = env {
            let bindings = std::mem::take(&mut *scope.0.bindings.write());
            drop(bindings);
            env = scope.parent();
        }
    }

    /// Number of scopes from here to the root, the root itself excluded.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut env = self;
        while let Some(parent) = env.parent() {
            depth += 1;
            env = parent;
        }
        depth
    }
}

/// Non-owning handle to a scope.
#[derive(Clone)]
pub struct WeakEnvironment(Weak<Scope>);

impl WeakEnvironment {
    pub fn upgrade(&self) -> Option<Environment> {
        self.0.upgrade().map(Environment)
    }

    /// Whether the scope is still owned by anything.
    pub fn is_live(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("bindings", &self.0.bindings.read().len())
            .field("depth", &self.depth())
            .finish()
    }
}
