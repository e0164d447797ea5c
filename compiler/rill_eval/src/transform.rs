//! Syntax tree to executable node conversion.

use std::rc::Rc;

use rill_ir::{Expr, ExprKind, Literal};
use rill_stack::ensure_sufficient_stack;

use crate::node::{AssignScope, CallArg, Node, NodeKind, ParamNode};
use crate::value::Value;

/// Turn a parsed expression into an executable node.
pub fn transform(expr: &Expr) -> Rc<Node> {
    ensure_sufficient_stack(|| Rc::new(transform_inner(expr)))
}

fn transform_inner(expr: &Expr) -> Node {
    let span = expr.span;
    let kind = match &expr.kind {
        ExprKind::Literal(lit) => NodeKind::Constant(literal_value(lit)),
        ExprKind::Ident(name) => return Node::read_var(*name, span),
        ExprKind::Assign { name, value } => NodeKind::Assign {
            name: *name,
            value: transform(value),
            scope: AssignScope::Local,
        },
        ExprKind::SuperAssign { name, value } => NodeKind::Assign {
            name: *name,
            value: transform(value),
            scope: AssignScope::Enclosing,
        },
        ExprKind::Function { params, body } => NodeKind::Function {
            params: params
                .iter()
                .map(|p| ParamNode {
                    name: p.name,
                    default: p.default.as_ref().map(transform),
                })
                .collect(),
            body: transform(body),
        },
        ExprKind::Call { callee, args } => {
            let args = args
                .iter()
                .map(|a| CallArg {
                    name: a.name,
                    value: transform(&a.value),
                })
                .collect();
            return Node::call(transform(callee), args, span);
        }
        ExprKind::Block(stmts) => NodeKind::Block(stmts.iter().map(transform).collect()),
        ExprKind::Paren(inner) => NodeKind::Paren(transform(inner)),
        ExprKind::If {
            cond,
            then_branch,
            else_branch,
        } => NodeKind::If {
            cond: transform(cond),
            then_branch: transform(then_branch),
            else_branch: else_branch.as_deref().map(transform),
        },
        ExprKind::While { cond, body } => NodeKind::While {
            cond: transform(cond),
            body: transform(body),
        },
        ExprKind::Repeat(body) => NodeKind::Repeat(transform(body)),
        ExprKind::Break => NodeKind::Break,
        ExprKind::Next => NodeKind::Next,
        ExprKind::Binary { op, lhs, rhs } => NodeKind::Binary {
            op: *op,
            lhs: transform(lhs),
            rhs: transform(rhs),
        },
        ExprKind::Unary { op, operand } => NodeKind::Unary {
            op: *op,
            operand: transform(operand),
        },
    };
    Node::new(kind, span)
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::Null,
        Literal::Logical(b) => Value::Logical(*b),
        Literal::Int(n) => Value::Int(*n),
        Literal::Double(d) => Value::Double(*d),
        Literal::Str(s) => Value::string(s),
    }
}
