use super::*;
use crate::environment::Env;
use crate::errors::{user_error, EvalErrorKind};
use crate::node::Node;
use pretty_assertions::assert_eq;
use std::cell::Cell;
use std::rc::Rc;

fn lazy() -> Promise {
    let code = Rc::new(Node::constant(Value::Null, rill_ir::Span::DUMMY));
    Promise::new(Closure::new(code, Env::empty()))
}

#[test]
fn forces_at_most_once() {
    let promise = lazy();
    let runs = Cell::new(0);
    for _ in 0..3 {
        let value = promise
            .force_with(|_| {
                runs.set(runs.get() + 1);
                Ok(Value::Int(5))
            })
            .unwrap_or(Value::Null);
        assert_eq!(value, Value::Int(5));
    }
    assert_eq!(runs.get(), 1);
    assert!(promise.is_forced());
}

#[test]
fn reentrant_forcing_is_recursion() {
    let promise = lazy();
    let result = promise.force_with(|_| promise.force_with(|_| Ok(Value::Int(1))));
    let err = result.err().map(|e| e.kind);
    assert_eq!(err, Some(EvalErrorKind::PromiseRecursion));
}

#[test]
fn failed_forcing_returns_to_pending() {
    let promise = lazy();
    let first = promise.force_with(|_| Err(user_error("boom")));
    assert!(first.is_err());
    assert!(matches!(promise.state(), PromiseState::Pending));

    let second = promise.force_with(|_| Ok(Value::Int(2)));
    assert_eq!(second.ok(), Some(Value::Int(2)));
}

#[test]
fn recursion_error_leaves_outer_forcing_retryable() {
    let promise = lazy();
    let _ = promise.force_with(|_| promise.force_with(|_| Ok(Value::Null)));
    assert!(matches!(promise.state(), PromiseState::Pending));
}

#[test]
fn evaluated_promise_never_runs_code() {
    let promise = Promise::evaluated(Value::Int(5));
    assert!(promise.closure().is_none());
    let value = promise.force_with(|_| Err(user_error("must not run")));
    assert_eq!(value.ok(), Some(Value::Int(5)));
}

#[test]
fn panic_while_forcing_resets_state() {
    let promise = lazy();
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = promise.force_with(|_| panic!("fault"));
    }));
    assert!(outcome.is_err());
    assert!(matches!(promise.state(), PromiseState::Pending));
}
