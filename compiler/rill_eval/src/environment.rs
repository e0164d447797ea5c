//! Environments: chains of variable scopes.
//!
//! An [`Env`] is a shared handle to one scope. Scopes are linked to their
//! enclosing scope through `parent`; lookup walks outward until the chain
//! ends. The chain is `global -> base -> empty`; every closure call adds a
//! fresh scope whose parent is the closure's defining environment.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rill_ir::Name;

use crate::errors::EvalError;
use crate::promise::Promise;
use crate::value::Value;

/// Variable bindings of one scope.
#[derive(Default)]
pub struct Scope {
    bindings: FxHashMap<Name, Value>,
    parent: Option<Env>,
}

/// Shared handle to a scope.
#[derive(Clone)]
#[repr(transparent)]
pub struct Env(Rc<RefCell<Scope>>);

/// Result of looking a variable up through the scope chain.
#[derive(Clone, Debug, PartialEq)]
pub enum Lookup {
    Found(Value),
    /// Bound, but to the missing-argument marker.
    Missing,
    NotFound,
}

impl Env {
    /// Create a scope with the given parent.
    pub fn new(parent: Option<Env>) -> Self {
        Env(Rc::new(RefCell::new(Scope {
            bindings: FxHashMap::default(),
            parent,
        })))
    }

    /// Create a scope with no parent.
    pub fn empty() -> Self {
        Self::new(None)
    }

    /// Create a fresh scope whose parent is `self`.
    #[must_use]
    pub fn child(&self) -> Self {
        Self::new(Some(self.clone()))
    }

    pub fn parent(&self) -> Option<Env> {
        self.0.borrow().parent.clone()
    }

    /// `self` followed by every enclosing scope.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: Some(self.clone()),
        }
    }

    /// Look `name` up in this scope only.
    pub fn get_local(&self, name: Name) -> Option<Value> {
        self.0.borrow().bindings.get(&name).cloned()
    }

    pub fn contains_local(&self, name: Name) -> bool {
        self.0.borrow().bindings.contains_key(&name)
    }

    /// Look `name` up through the scope chain.
    pub fn lookup(&self, name: Name) -> Lookup {
        for env in self.ancestors() {
            match env.get_local(name) {
                Some(Value::Missing) => return Lookup::Missing,
                Some(value) => return Lookup::Found(value),
                None => {}
            }
        }
        Lookup::NotFound
    }

    /// Look `name` up in function position: bindings that are not functions
    /// are skipped. Promises met on the way are forced with `force`.
    pub fn lookup_function(
        &self,
        name: Name,
        mut force: impl FnMut(&Rc<Promise>) -> Result<Value, EvalError>,
    ) -> Result<Option<Value>, EvalError> {
        for env in self.ancestors() {
            let value = match env.get_local(name) {
                Some(Value::Promise(promise)) => force(&promise)?,
                Some(value) => value,
                None => continue,
            };
            if value.is_function() {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Bind `name` in this scope, replacing any previous binding.
    pub fn bind(&self, name: Name, value: Value) {
        self.0.borrow_mut().bindings.insert(name, value);
    }

    /// Superassignment: rebind `name` in the nearest enclosing scope (not
    /// `self`) that already binds it, or in `global` when none does.
    pub fn assign_enclosing(&self, name: Name, value: Value, global: &Env) {
        let target = self
            .parent()
            .and_then(|parent| parent.ancestors().find(|env| env.contains_local(name)))
            .unwrap_or_else(|| global.clone());
        target.bind(name, value);
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Env) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Env({:p})", Rc::as_ptr(&self.0))
    }
}

/// Iterator over a scope and its enclosing scopes.
pub struct Ancestors {
    next: Option<Env>,
}

impl Iterator for Ancestors {
    type Item = Env;

    fn next(&mut self) -> Option<Env> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

#[cfg(test)]
mod tests;
