//! Promises: lazily evaluated, memoized arguments.
//!
//! A promise starts `Pending` with the code and environment it was created
//! in. Forcing moves it to `Forcing` for the duration of the evaluation and
//! then to `Forced`, after which the stored value is returned without
//! re-running the code. Meeting a `Forcing` promise again means the
//! evaluation depends on its own result; that is reported as
//! [`EvalErrorKind::PromiseRecursion`](crate::errors::EvalErrorKind).
//!
//! A failed forcing puts the promise back to `Pending`, so a later access
//! runs the code again.

use std::cell::RefCell;

use crate::closure::Closure;
use crate::errors::{internal_error, promise_recursion, EvalResult};
use crate::value::Value;

/// Forcing state of a promise.
#[derive(Clone, Debug)]
pub enum PromiseState {
    Pending,
    Forcing,
    Forced(Value),
}

/// A lazily evaluated value.
pub struct Promise {
    /// Absent for promises created already evaluated.
    closure: Option<Closure>,
    state: RefCell<PromiseState>,
}

impl Promise {
    pub fn new(closure: Closure) -> Self {
        Promise {
            closure: Some(closure),
            state: RefCell::new(PromiseState::Pending),
        }
    }

    /// A promise that is forced from the start.
    pub fn evaluated(value: Value) -> Self {
        Promise {
            closure: None,
            state: RefCell::new(PromiseState::Forced(value)),
        }
    }

    /// Code and environment the promise evaluates, if it was created lazily.
    pub fn closure(&self) -> Option<&Closure> {
        self.closure.as_ref()
    }

    pub fn state(&self) -> PromiseState {
        self.state.borrow().clone()
    }

    pub fn is_forced(&self) -> bool {
        matches!(*self.state.borrow(), PromiseState::Forced(_))
    }

    /// The memoized value, if forced.
    pub fn value(&self) -> Option<Value> {
        match &*self.state.borrow() {
            PromiseState::Forced(value) => Some(value.clone()),
            PromiseState::Pending | PromiseState::Forcing => None,
        }
    }

    /// Force the promise, running `eval` on its closure at most once.
    ///
    /// `eval` decides how the closure is executed (through a call-site cache
    /// or generically); the state transitions are the same either way.
    pub fn force_with(&self, eval: impl FnOnce(&Closure) -> EvalResult) -> EvalResult {
        match &*self.state.borrow() {
            PromiseState::Forced(value) => return Ok(value.clone()),
            PromiseState::Forcing => {
                tracing::debug!("promise forced while already under evaluation");
                return Err(promise_recursion());
            }
            PromiseState::Pending => {}
        }
        let Some(closure) = &self.closure else {
            return Err(internal_error("pending promise has no code"));
        };

        *self.state.borrow_mut() = PromiseState::Forcing;
        let guard = ForcingGuard { state: &self.state };
        let result = eval(closure);
        *self.state.borrow_mut() = match &result {
            Ok(value) => PromiseState::Forced(value.clone()),
            Err(_) => PromiseState::Pending,
        };
        drop(guard);
        result
    }
}

/// Puts a promise back to `Pending` if forcing unwinds.
struct ForcingGuard<'a> {
    state: &'a RefCell<PromiseState>,
}

impl Drop for ForcingGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            if matches!(*state, PromiseState::Forcing) {
                *state = PromiseState::Pending;
            }
        }
    }
}

#[cfg(test)]
mod tests;
