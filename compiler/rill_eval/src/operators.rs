//! Binary and unary operator implementations.
//!
//! Operands are scalars. Arithmetic promotes `logical -> integer -> double`;
//! integer `+ - *` stay integer and fail on overflow, `/` and `^` always
//! produce doubles. Comparisons between a string and a number compare the
//! number's printed form.

use std::cmp::Ordering;

use rill_ir::{BinaryOp, UnaryOp};

use crate::deparse::format_double;
use crate::errors::{
    condition_length, condition_not_logical, integer_overflow, invalid_argument,
    non_numeric_argument, EvalError, EvalResult,
};
use crate::value::Value;

#[derive(Copy, Clone)]
enum Num {
    Int(i64),
    Double(f64),
}

#[allow(clippy::cast_precision_loss, reason = "same conversion the language performs")]
fn int_to_double(n: i64) -> f64 {
    n as f64
}

impl Num {
    fn of(value: &Value) -> Option<Num> {
        match value {
            Value::Logical(b) => Some(Num::Int(i64::from(*b))),
            Value::Int(n) => Some(Num::Int(*n)),
            Value::Double(d) => Some(Num::Double(*d)),
            _ => None,
        }
    }

    fn as_double(self) -> f64 {
        match self {
            Num::Int(n) => int_to_double(n),
            Num::Double(d) => d,
        }
    }
}

/// Evaluate a non-short-circuit binary operator on two forced operands.
pub fn evaluate_binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Pow => {
            arithmetic(op, left, right)
        }
        BinaryOp::Eq
        | BinaryOp::NotEq
        | BinaryOp::Lt
        | BinaryOp::LtEq
        | BinaryOp::Gt
        | BinaryOp::GtEq => comparison(op, left, right),
        BinaryOp::And | BinaryOp::AndAnd => {
            Ok(Value::Logical(as_logical(left)? && as_logical(right)?))
        }
        BinaryOp::Or | BinaryOp::OrOr => Ok(Value::Logical(as_logical(left)? || as_logical(right)?)),
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    let (Some(a), Some(b)) = (Num::of(left), Num::of(right)) else {
        return Err(non_numeric_argument());
    };
    match (a, b, op) {
        (Num::Int(a), Num::Int(b), BinaryOp::Add) => checked(a.checked_add(b)),
        (Num::Int(a), Num::Int(b), BinaryOp::Sub) => checked(a.checked_sub(b)),
        (Num::Int(a), Num::Int(b), BinaryOp::Mul) => checked(a.checked_mul(b)),
        _ => {
            let (a, b) = (a.as_double(), b.as_double());
            Ok(Value::Double(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                _ => a.powf(b),
            }))
        }
    }
}

fn checked(result: Option<i64>) -> EvalResult {
    result.map(Value::Int).ok_or_else(integer_overflow)
}

fn comparison(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    let ordering = match (left, right) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Str(a), other) | (other, Value::Str(a)) => {
            let Some(n) = Num::of(other) else {
                return Err(comparison_error());
            };
            let text = scalar_text(n);
            if matches!(left, Value::Str(_)) {
                Some((**a).cmp(text.as_str()))
            } else {
                Some(text.as_str().cmp(&**a))
            }
        }
        _ => {
            let (Some(a), Some(b)) = (Num::of(left), Num::of(right)) else {
                return Err(comparison_error());
            };
            match (a, b) {
                (Num::Int(a), Num::Int(b)) => Some(a.cmp(&b)),
                _ => a.as_double().partial_cmp(&b.as_double()),
            }
        }
    };
    // NaN compares false to everything.
    let Some(ordering) = ordering else {
        return Ok(Value::Logical(matches!(op, BinaryOp::NotEq)));
    };
    Ok(Value::Logical(match op {
        BinaryOp::Eq => ordering == Ordering::Equal,
        BinaryOp::NotEq => ordering != Ordering::Equal,
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::LtEq => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        _ => ordering != Ordering::Less,
    }))
}

fn scalar_text(n: Num) -> String {
    match n {
        Num::Int(n) => n.to_string(),
        Num::Double(d) => format_double(d),
    }
}

#[cold]
fn comparison_error() -> EvalError {
    invalid_argument("comparison is possible only for atomic types")
}

pub fn evaluate_unary(op: UnaryOp, operand: &Value) -> EvalResult {
    match op {
        UnaryOp::Neg => match Num::of(operand) {
            Some(Num::Int(n)) => checked(n.checked_neg()),
            Some(Num::Double(d)) => Ok(Value::Double(-d)),
            None => Err(invalid_argument("invalid argument to unary operator")),
        },
        UnaryOp::Not => match operand {
            Value::Logical(_) | Value::Int(_) | Value::Double(_) => {
                Ok(Value::Logical(!as_logical(operand)?))
            }
            _ => Err(invalid_argument("invalid argument type")),
        },
    }
}

/// Truth value of a condition or logical operand.
pub fn as_logical(value: &Value) -> Result<bool, EvalError> {
    match value {
        Value::Logical(b) => Ok(*b),
        Value::Int(n) => Ok(*n != 0),
        Value::Double(d) if d.is_nan() => Err(condition_not_logical()),
        Value::Double(d) => Ok(*d != 0.0),
        Value::Str(s) => match &**s {
            "TRUE" | "true" | "T" | "True" => Ok(true),
            "FALSE" | "false" | "F" | "False" => Ok(false),
            _ => Err(condition_not_logical()),
        },
        Value::Null => Err(condition_length()),
        _ => Err(condition_not_logical()),
    }
}

#[cfg(test)]
mod tests;
