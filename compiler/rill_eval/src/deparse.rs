//! Nodes and values back to source text.
//!
//! Used for error attribution (`Error in f(x) : ...`), for printing
//! functions and language objects, and by `paste` on language arguments.

use std::fmt::Write;

use rill_ir::{Name, StringInterner};

use crate::node::{CallArg, Node, NodeKind, ParamNode};
use crate::value::{Language, Value};

const INDENT: &str = "    ";

pub fn deparse(node: &Node, interner: &StringInterner) -> String {
    let mut out = String::new();
    Deparser { interner, out: &mut out }.node(node, 0);
    out
}

/// Source-like rendering of a value.
pub fn deparse_value(value: &Value, interner: &StringInterner) -> String {
    let mut out = String::new();
    Deparser { interner, out: &mut out }.value(value, 0);
    out
}

/// Number formatting shared by printing and deparsing: up to seven
/// significant digits, integral values without a fraction.
pub fn format_double(d: f64) -> String {
    if d.is_nan() {
        return "NaN".to_string();
    }
    if d.is_infinite() {
        return if d > 0.0 { "Inf" } else { "-Inf" }.to_string();
    }
    if d.fract() == 0.0 && d.abs() < 1e15 {
        return format!("{d:.0}");
    }
    let magnitude = d.abs().log10().floor();
    if !(-5.0..15.0).contains(&magnitude) {
        return format!("{d:e}");
    }
    #[allow(clippy::cast_possible_truncation, reason = "magnitude is within -5..15")]
    let decimals = (6 - magnitude as i32).clamp(0, 15);
    let text = format!("{d:.prec$}", prec = usize::try_from(decimals).unwrap_or(0));
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// Double-quoted string literal with escapes.
pub fn quote_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

struct Deparser<'a> {
    interner: &'a StringInterner,
    out: &'a mut String,
}

impl Deparser<'_> {
    fn name(&mut self, name: Name) {
        self.out.push_str(self.interner.lookup(name));
    }

    fn node(&mut self, node: &Node, depth: usize) {
        match &node.kind {
            NodeKind::Constant(value) => self.value(value, depth),
            NodeKind::ReadVar { name, .. } => self.name(*name),
            NodeKind::Assign { name, value, scope } => {
                self.name(*name);
                self.out.push_str(match scope {
                    crate::node::AssignScope::Local => " <- ",
                    crate::node::AssignScope::Enclosing => " <<- ",
                });
                self.node(value, depth);
            }
            NodeKind::Function { params, body } => self.function(params, body, depth),
            NodeKind::Call { callee, args, .. } => {
                self.node(callee, depth);
                self.args(args, depth);
            }
            NodeKind::StaticCall { function, args, .. } => {
                match function {
                    Value::Closure(_) => {
                        self.out.push('(');
                        self.value(function, depth);
                        self.out.push(')');
                    }
                    _ => self.value(function, depth),
                }
                self.args(args, depth);
            }
            NodeKind::Block(stmts) => {
                self.out.push('{');
                for stmt in stmts {
                    self.out.push('\n');
                    for _ in 0..=depth {
                        self.out.push_str(INDENT);
                    }
                    self.node(stmt, depth + 1);
                }
                self.out.push('\n');
                for _ in 0..depth {
                    self.out.push_str(INDENT);
                }
                self.out.push('}');
            }
            NodeKind::Paren(inner) => {
                self.out.push('(');
                self.node(inner, depth);
                self.out.push(')');
            }
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.out.push_str("if (");
                self.node(cond, depth);
                self.out.push_str(") ");
                self.node(then_branch, depth);
                if let Some(else_branch) = else_branch {
                    self.out.push_str(" else ");
                    self.node(else_branch, depth);
                }
            }
            NodeKind::While { cond, body } => {
                self.out.push_str("while (");
                self.node(cond, depth);
                self.out.push_str(") ");
                self.node(body, depth);
            }
            NodeKind::Repeat(body) => {
                self.out.push_str("repeat ");
                self.node(body, depth);
            }
            NodeKind::Break => self.out.push_str("break"),
            NodeKind::Next => self.out.push_str("next"),
            NodeKind::Binary { op, lhs, rhs } => {
                self.node(lhs, depth);
                let _ = write!(self.out, " {} ", op.as_symbol());
                self.node(rhs, depth);
            }
            NodeKind::Unary { op, operand } => {
                self.out.push_str(op.as_symbol());
                self.node(operand, depth);
            }
        }
    }

    fn args(&mut self, args: &[CallArg], depth: usize) {
        self.out.push('(');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            if let Some(name) = arg.name {
                self.name(name);
                self.out.push_str(" = ");
            }
            self.node(&arg.value, depth);
        }
        self.out.push(')');
    }

    fn function(&mut self, params: &[ParamNode], body: &Node, depth: usize) {
        self.out.push_str("function(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.name(param.name);
            if let Some(default) = &param.default {
                self.out.push_str(" = ");
                self.node(default, depth);
            }
        }
        self.out.push_str(") ");
        self.node(body, depth);
    }

    fn value(&mut self, value: &Value, depth: usize) {
        match value {
            Value::Null => self.out.push_str("NULL"),
            Value::Missing => {}
            Value::Logical(true) => self.out.push_str("TRUE"),
            Value::Logical(false) => self.out.push_str("FALSE"),
            Value::Int(n) => {
                let _ = write!(self.out, "{n}L");
            }
            Value::Double(d) => self.out.push_str(&format_double(*d)),
            Value::Str(s) => self.out.push_str(&quote_str(s)),
            Value::Symbol(name) => self.name(*name),
            Value::Language(lang) => match &**lang {
                Language::Node(node) => self.node(node, depth),
                Language::Call(call) => {
                    let mut elements = call.elements.iter().enumerate();
                    if let Some((_, head)) = elements.next() {
                        self.value(head, depth);
                    }
                    self.out.push('(');
                    for (i, element) in elements {
                        if i > 1 {
                            self.out.push_str(", ");
                        }
                        if let Some(name) = call.name_at(i) {
                            self.name(name);
                            self.out.push_str(" = ");
                        }
                        self.value(element, depth);
                    }
                    self.out.push(')');
                }
            },
            Value::Closure(function) => self.function(&function.params, &function.body, depth),
            Value::Builtin(builtin) => self.out.push_str(builtin.name),
            Value::Promise(promise) => match (promise.value(), promise.closure()) {
                (Some(value), _) => self.value(&value, depth),
                (None, Some(closure)) => self.node(closure.code(), depth),
                (None, None) => self.out.push_str("<promise>"),
            },
            Value::Env(_) => self.out.push_str("<environment>"),
        }
    }
}
