use super::*;
use crate::errors::EvalErrorKind;
use pretty_assertions::assert_eq;

fn binary(op: BinaryOp, a: Value, b: Value) -> Value {
    evaluate_binary(op, &a, &b).unwrap_or(Value::Missing)
}

#[test]
fn integer_arithmetic_stays_integer() {
    assert_eq!(binary(BinaryOp::Add, Value::Int(2), Value::Int(3)), Value::Int(5));
    assert_eq!(binary(BinaryOp::Mul, Value::Logical(true), Value::Int(4)), Value::Int(4));
}

#[test]
fn division_and_power_produce_doubles() {
    assert_eq!(binary(BinaryOp::Div, Value::Int(1), Value::Int(2)), Value::Double(0.5));
    assert_eq!(binary(BinaryOp::Pow, Value::Int(2), Value::Int(10)), Value::Double(1024.0));
}

#[test]
fn mixed_arithmetic_promotes_to_double() {
    assert_eq!(binary(BinaryOp::Sub, Value::Double(1.5), Value::Int(1)), Value::Double(0.5));
}

#[test]
fn integer_overflow_is_an_error() {
    let err = evaluate_binary(BinaryOp::Add, &Value::Int(i64::MAX), &Value::Int(1)).err();
    assert_eq!(err.map(|e| e.kind), Some(EvalErrorKind::IntegerOverflow));
}

#[test]
fn strings_are_not_numeric() {
    let err = evaluate_binary(BinaryOp::Add, &Value::string("a"), &Value::Int(1)).err();
    assert_eq!(err.map(|e| e.kind), Some(EvalErrorKind::NonNumericArgument));
}

#[test]
fn comparisons() {
    assert_eq!(binary(BinaryOp::Lt, Value::Int(1), Value::Double(1.5)), Value::Logical(true));
    assert_eq!(binary(BinaryOp::Eq, Value::string("a"), Value::string("a")), Value::Logical(true));
    assert_eq!(binary(BinaryOp::Eq, Value::string("1"), Value::Int(1)), Value::Logical(true));
    assert_eq!(
        binary(BinaryOp::Eq, Value::Double(f64::NAN), Value::Double(f64::NAN)),
        Value::Logical(false)
    );
}

#[test]
fn unary_operators() {
    assert_eq!(evaluate_unary(UnaryOp::Neg, &Value::Int(3)).ok(), Some(Value::Int(-3)));
    assert_eq!(
        evaluate_unary(UnaryOp::Not, &Value::Logical(true)).ok(),
        Some(Value::Logical(false))
    );
}

#[test]
fn conditions() {
    assert_eq!(as_logical(&Value::Int(0)).ok(), Some(false));
    assert_eq!(as_logical(&Value::string("TRUE")).ok(), Some(true));
    assert_eq!(
        as_logical(&Value::Null).err().map(|e| e.kind),
        Some(EvalErrorKind::ConditionLength)
    );
    assert_eq!(
        as_logical(&Value::string("maybe")).err().map(|e| e.kind),
        Some(EvalErrorKind::ConditionNotLogical)
    );
}
