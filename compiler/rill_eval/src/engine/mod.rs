//! The evaluation engine.
//!
//! [`Engine`] is the explicit context every evaluation runs against. It is
//! built once by [`EngineBuilder`] and owns everything that would otherwise
//! be process-wide: the environment chain (`global -> base -> empty`), the
//! builtin table, the console, pending warnings, the auto-print visibility
//! flag, the live frame stack and performance counters.
//!
//! # Module layout
//!
//! - `builder`: engine construction and configuration
//! - `interpret`: node evaluation, variable reads, promise forcing
//! - `call`: closure and builtin calls, argument matching
//! - `caller_frame`: caller-frame recovery and site upgrades
//! - `reconstruct`: language objects back to executable nodes
//! - `top_level`: `run`, source evaluation, error and fault reporting
//! - `print`: value printing

mod builder;
mod call;
mod caller_frame;
mod interpret;
mod print;
mod reconstruct;
mod top_level;

pub use builder::EngineBuilder;
pub use top_level::SourceOutcome;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use rill_ir::{SharedInterner, StringInterner};

use crate::builtins::{self, Builtin, BuiltinTable};
use crate::call_target::CallTarget;
use crate::closure::Closure;
use crate::config::EngineConfig;
use crate::console::{ConsoleImpl, SharedConsole};
use crate::environment::Env;
use crate::errors::{no_loop_for_break_next, too_deep, EvalError, EvalResult};
use crate::frame::{CallerLink, Frame};
use crate::node::Node;
use crate::promise::Promise;
use crate::value::{Language, Value};
use crate::warnings::Warnings;

/// Name of the call target wrapping each top-level statement.
pub const REPL_WRAPPER: &str = "<repl wrapper>";
/// Name of the call target wrapping dynamically evaluated code.
pub const EVAL_WRAPPER: &str = "<eval wrapper>";
/// Name of the call target used when a promise is forced generically.
pub const PROMISE_WRAPPER: &str = "<promise wrapper>";

/// Counters describing how the adaptive machinery behaved.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Caller frames recovered by walking the frame stack.
    pub slow_caller_frame_accesses: usize,
    pub call_targets_created: usize,
    /// Promises whose code actually ran.
    pub promises_forced: usize,
    /// Internal faults re-raised from a nested `run`.
    pub nested_internal_faults: usize,
}

pub struct Engine {
    config: EngineConfig,
    interner: SharedInterner,
    console: SharedConsole,
    builtins: BuiltinTable,
    /// The `eval` builtin, resolved once at startup.
    eval_function: Option<Builtin>,
    empty_env: Env,
    base_env: Env,
    global_env: Env,
    /// Frame standing for evaluation directly in the global environment.
    global_frame: Rc<Frame>,
    frames: RefCell<Vec<Rc<Frame>>>,
    warnings: Warnings,
    visible: Cell<bool>,
    stats: Cell<EngineStats>,
    started: Instant,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn shared_interner(&self) -> SharedInterner {
        self.interner.clone()
    }

    pub fn console(&self) -> &ConsoleImpl {
        &self.console
    }

    pub fn warnings(&self) -> &Warnings {
        &self.warnings
    }

    pub fn empty_env(&self) -> &Env {
        &self.empty_env
    }

    pub fn base_env(&self) -> &Env {
        &self.base_env
    }

    pub fn global_env(&self) -> &Env {
        &self.global_env
    }

    pub fn global_frame(&self) -> &Rc<Frame> {
        &self.global_frame
    }

    /// Time since the engine was built.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn stats(&self) -> EngineStats {
        self.stats.get()
    }

    fn bump_stats(&self, update: impl FnOnce(&mut EngineStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    #[inline]
    pub fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    /// Resolve a builtin by name.
    pub fn lookup_builtin(&self, name: &str) -> Option<Value> {
        self.builtins.lookup(name).map(Value::Builtin)
    }

    /// The `eval` builtin the engine uses to label dynamic evaluation.
    pub fn eval_function(&self) -> Option<Builtin> {
        self.eval_function
    }

    /// Character rendering of a value (`paste`, `stop`, `warning`).
    pub fn as_text(&self, value: &Value) -> String {
        builtins::as_text(value, &self.interner)
    }

    // Frame stack

    /// Innermost live frame, or the global frame when nothing runs.
    pub fn current_frame(&self) -> Rc<Frame> {
        self.frames
            .borrow()
            .last()
            .map_or_else(|| Rc::clone(&self.global_frame), Rc::clone)
    }

    pub fn frame_depth(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Push `frame` for the lifetime of the returned guard.
    pub(crate) fn push_frame(&self, frame: &Rc<Frame>) -> Result<FrameGuard<'_>, EvalError> {
        let mut frames = self.frames.borrow_mut();
        if frames.len() >= self.config.max_depth {
            tracing::debug!(depth = frames.len(), "frame limit reached");
            return Err(too_deep(self.config.max_depth));
        }
        frames.push(Rc::clone(frame));
        Ok(FrameGuard { engine: self })
    }

    // Call targets and dynamic evaluation

    /// Wrap `body` as an argument-less call target. Nothing is memoized.
    pub fn make_call_target(&self, body: Rc<Node>, name: &str) -> CallTarget {
        self.bump_stats(|s| s.call_targets_created += 1);
        CallTarget::new(body, name, &self.empty_env)
    }

    /// Evaluate a language object in `env`, as `eval` does.
    pub fn eval_language(&self, lang: &Language, env: &Env) -> EvalResult {
        self.eval_language_from(lang, env, &self.current_frame())
    }

    /// Evaluate `langs` in order in `env`, returning the last value.
    pub fn eval_expression(&self, langs: &[Rc<Language>], env: &Env) -> EvalResult {
        let caller = self.current_frame();
        let mut result = Value::Null;
        for lang in langs {
            result = self.eval_language_from(lang, env, &caller)?;
        }
        Ok(result)
    }

    /// Generic `eval`: rebuild the node and run it through a fresh
    /// `<eval wrapper>` call target.
    pub(crate) fn eval_language_from(
        &self,
        lang: &Language,
        env: &Env,
        caller: &Rc<Frame>,
    ) -> EvalResult {
        let node = self.make_call_node(lang)?;
        let target = self.make_call_target(node, EVAL_WRAPPER);
        let frame = self.frame_for_env(env, caller);
        self.run_nested(&target, &frame)
    }

    /// Force `promise` without going through a call-site cache.
    pub fn eval_promise(&self, promise: &Promise, frame: &Rc<Frame>) -> EvalResult {
        let value = self.force_promise(promise, frame)?;
        self.force(value, frame)
    }

    /// Run a closure's code in its environment through a fresh call target.
    pub fn eval_closure(&self, closure: &Closure, caller: &Rc<Frame>) -> EvalResult {
        let target = closure.call_target(self, PROMISE_WRAPPER);
        let frame = self.frame_for_env(closure.env(), caller);
        self.run_nested(&target, &frame)
    }

    /// Run a node an inline cache already holds. Frames are set up exactly
    /// as the generic path would, without creating a call target.
    pub(crate) fn eval_specialized(
        &self,
        node: &Rc<Node>,
        wrapper: &'static str,
        env: &Env,
        caller: &Rc<Frame>,
    ) -> EvalResult {
        let frame = self.frame_for_env(env, caller);
        let result = self.eval_in_wrapper(node, Rc::from(wrapper), &frame);
        contain_control_flow(result)
    }

    /// Evaluate `body` in `frame`'s environment inside a new wrapper frame
    /// that answers caller-frame queries as `frame` would.
    pub(crate) fn eval_in_wrapper(
        &self,
        body: &Rc<Node>,
        name: Rc<str>,
        frame: &Rc<Frame>,
    ) -> EvalResult {
        let wrapper = Rc::new(Frame::wrapper(
            name,
            frame.env().clone(),
            CallerLink::Inherited(Rc::clone(frame)),
            self.frame_depth() + 1,
        ));
        let _guard = self.push_frame(&wrapper)?;
        self.eval(body, wrapper.env(), &wrapper)
    }

    /// The frame code evaluated in `env` runs as: the innermost live frame
    /// owning `env`, else a stand-in frame called from `caller`.
    fn frame_for_env(&self, env: &Env, caller: &Rc<Frame>) -> Rc<Frame> {
        if caller.env().ptr_eq(env) {
            return Rc::clone(caller);
        }
        let owner = self
            .frames
            .borrow()
            .iter()
            .rev()
            .find(|frame| frame.env().ptr_eq(env))
            .cloned();
        if let Some(owner) = owner {
            return owner;
        }
        if self.global_frame.env().ptr_eq(env) {
            return Rc::clone(&self.global_frame);
        }
        let name = self.eval_function.map_or(EVAL_WRAPPER, |f| f.name);
        Rc::new(Frame::wrapper(
            Rc::from(name),
            env.clone(),
            CallerLink::Materialized(Rc::clone(caller)),
            caller.depth(),
        ))
    }
}

/// Turn a `break`/`next` that escaped every loop into a language error.
pub(crate) fn contain_control_flow(result: EvalResult) -> EvalResult {
    match result {
        Err(err) if err.is_control_flow() => Err(no_loop_for_break_next()),
        other => other,
    }
}

/// Pops the frame pushed by [`Engine::push_frame`], also during unwinding.
pub(crate) struct FrameGuard<'a> {
    engine: &'a Engine,
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut frames) = self.engine.frames.try_borrow_mut() {
            frames.pop();
        }
    }
}
