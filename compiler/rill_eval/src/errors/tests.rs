use super::*;
use pretty_assertions::assert_eq;

#[test]
fn message_matches_kind_display() {
    let err = unbound_variable("x");
    assert_eq!(err.message, "object 'x' not found");
    assert_eq!(err.to_string(), err.kind.to_string());
}

#[test]
fn signals_are_control_flow() {
    assert_eq!(break_signal().control_flow, Some(ControlFlow::Break));
    assert_eq!(next_signal().control_flow, Some(ControlFlow::Next));
    assert!(!no_loop_for_break_next().is_control_flow());
}

#[test]
fn promise_recursion_is_its_own_kind() {
    let err = promise_recursion();
    assert_eq!(err.kind, EvalErrorKind::PromiseRecursion);
    assert_ne!(err.kind, unbound_variable("x").kind);
}

#[test]
fn call_attribution_keeps_first_call() {
    let err = user_error("boom")
        .with_call_if_absent(|| "inner()".to_string())
        .with_call_if_absent(|| "outer()".to_string());
    assert_eq!(err.call.as_deref(), Some("inner()"));
}

#[test]
fn internal_errors_are_not_attributed() {
    let err = internal_error("bad state").with_call_if_absent(|| "f()".to_string());
    assert!(err.is_internal());
    assert_eq!(err.call, None);
}

#[test]
fn span_is_set_once() {
    let err = unbound_variable("x")
        .with_span(Span::new(1, 2))
        .with_span(Span::new(5, 9));
    assert_eq!(err.span, Some(Span::new(1, 2)));
}
