//! Rill IR - shared vocabulary between the parser and the evaluator.
//!
//! This crate holds the types that cross the parser/evaluator boundary:
//!
//! - [`Name`] / [`StringInterner`]: compact interned identifiers
//! - [`Span`]: byte-offset source locations
//! - [`ast`]: the syntax tree produced by `rill_parse` and consumed by the
//!   transformer in `rill_eval`
//!
//! Nothing in here evaluates anything.

pub mod ast;
mod interner;
mod name;
mod span;

pub use ast::{Arg, BinaryOp, Expr, ExprKind, Literal, Param, UnaryOp};
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use span::Span;
