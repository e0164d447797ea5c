//! Value printing, as auto-print and `print()` show it.

use super::Engine;
use crate::deparse::{deparse_value, format_double, quote_str};
use crate::value::Value;

impl Engine {
    /// Printed form of `value`, without a trailing newline.
    pub fn format_value(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Logical(true) => "[1] TRUE".to_string(),
            Value::Logical(false) => "[1] FALSE".to_string(),
            Value::Int(n) => format!("[1] {n}"),
            Value::Double(d) => format!("[1] {}", format_double(*d)),
            Value::Str(s) => format!("[1] {}", quote_str(s)),
            Value::Builtin(builtin) => {
                format!("function (...) .Primitive(\"{}\")", builtin.name)
            }
            Value::Env(env) => {
                let label = if env.ptr_eq(&self.global_env) {
                    "R_GlobalEnv"
                } else if env.ptr_eq(&self.base_env) {
                    "base"
                } else if env.ptr_eq(&self.empty_env) {
                    "R_EmptyEnv"
                } else {
                    return "<environment>".to_string();
                };
                format!("<environment: {label}>")
            }
            Value::Promise(promise) => match promise.value() {
                Some(value) => self.format_value(&value),
                None => "<promise>".to_string(),
            },
            Value::Missing => String::new(),
            Value::Symbol(_) | Value::Language(_) | Value::Closure(_) => {
                deparse_value(value, &self.interner)
            }
        }
    }

    /// Print `value` on the output stream.
    pub fn print_value(&self, value: &Value) {
        self.console.println(&self.format_value(value));
    }
}
