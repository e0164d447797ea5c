//! Rill Eval - the evaluation core of the Rill language.
//!
//! Rill is a lazily evaluated, dynamically typed language in the R family.
//! This crate turns parsed syntax trees into executable nodes and runs them.
//!
//! # Architecture
//!
//! - [`Env`]: chained lexical scopes with local binding and `<<-`
//! - [`Frame`]: activations, with caller links that upgrade from a stack walk
//!   to a materialized link the first time a call site needs one
//! - [`Promise`]: lazy arguments, forced at most once, with detection of
//!   recursive forcing
//! - [`Engine`]: the explicit evaluation context; builds call targets, runs
//!   them at top level with error containment, flushes warnings, rebuilds
//!   calls from language objects
//! - [`InlineCache`]: bounded per-site caches for `eval` and promise forcing
//!   that go generic for good once they overflow
//!
//! Builtins in [`builtins`] are only the bootstrap set the engine needs.

pub mod builtins;
mod call_target;
mod closure;
pub mod config;
mod console;
pub mod deparse;
mod engine;
mod environment;
pub mod errors;
mod frame;
mod inline_cache;
mod node;
mod operators;
mod promise;
mod transform;
mod value;
mod warnings;

pub use builtins::{Builtin, BuiltinKind, BuiltinTable};
pub use call_target::CallTarget;
pub use closure::{Closure, FunctionValue};
pub use config::EngineConfig;
pub use console::{
    buffer_console, silent_console, stdout_console, BufferConsole, ConsoleImpl, SharedConsole,
    StdConsole,
};
pub use engine::{
    Engine, EngineBuilder, EngineStats, SourceOutcome, EVAL_WRAPPER, PROMISE_WRAPPER, REPL_WRAPPER,
};
pub use environment::{Env, Lookup};
pub use errors::{ControlFlow, EvalError, EvalErrorKind, EvalResult};
pub use frame::{CallerAccessState, CallerFrameAccess, CallerLink, Frame};
pub use inline_cache::{
    CacheStateKind, ExpressionCache, InlineCache, InsertionListener, PromiseCache, Specializer,
};
pub use node::{AssignScope, CallArg, CallSite, Node, NodeKind, ParamNode, ReadSite};
pub use operators::{evaluate_binary, evaluate_unary};
pub use promise::{Promise, PromiseState};
pub use transform::transform;
pub use value::{LangCall, Language, Value};
pub use warnings::Warnings;
