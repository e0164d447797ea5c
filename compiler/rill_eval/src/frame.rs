//! Activation frames and caller links.
//!
//! Every closure call and every call-target invocation gets a [`Frame`].
//! A frame records how to reach its caller. Calls start out passing only a
//! `Pending` link (the call site they came from); the caller frame is then
//! recovered by walking the engine's live frame stack. The first time that
//! slow walk happens for a frame created at some call site, the site is
//! flagged and every later call from it passes a `Materialized` link
//! instead. The flag never goes back.
//!
//! Wrapper frames made for `eval` and promise forcing hold an `Inherited`
//! link to the frame they run as and answer caller queries for it.

use std::cell::Cell;
use std::rc::Rc;

use crate::closure::FunctionValue;
use crate::environment::Env;
use crate::node::{CallSite, Node};
use crate::value::Value;

/// How a frame reaches the frame that called it.
#[derive(Clone)]
pub enum CallerLink {
    /// The caller frame itself.
    Materialized(Rc<Frame>),
    /// Only the call site is known; the frame must be looked up.
    Pending(Rc<CallSite>),
    /// Runs on behalf of this frame and shares its caller. Used by the
    /// wrapper frames of `eval` and promise forcing.
    Inherited(Rc<Frame>),
    /// Entered from outside any evaluation.
    TopLevel,
}

/// One activation.
pub struct Frame {
    /// Called function; absent for call-target wrappers and top level.
    function: Option<Rc<FunctionValue>>,
    /// Display name (`<repl wrapper>`, `<eval wrapper>`, `<top level>`, or
    /// the called function's name).
    name: Rc<str>,
    /// Call that created the frame, used for error attribution.
    call: Option<Rc<Node>>,
    args: Vec<Value>,
    caller: CallerLink,
    env: Env,
    depth: usize,
}

impl Frame {
    /// Frame standing for evaluation directly in `env` with no caller.
    pub fn top_level(env: Env) -> Self {
        Frame {
            function: None,
            name: Rc::from("<top level>"),
            call: None,
            args: Vec::new(),
            caller: CallerLink::TopLevel,
            env,
            depth: 0,
        }
    }

    /// Frame of a call-target invocation running in `env`.
    pub fn wrapper(name: Rc<str>, env: Env, caller: CallerLink, depth: usize) -> Self {
        Frame {
            function: None,
            name,
            call: None,
            args: Vec::new(),
            caller,
            env,
            depth,
        }
    }

    /// Frame of a closure call.
    pub fn for_call(
        function: Rc<FunctionValue>,
        name: Rc<str>,
        call: Rc<Node>,
        args: Vec<Value>,
        caller: CallerLink,
        env: Env,
        depth: usize,
    ) -> Self {
        Frame {
            function: Some(function),
            name,
            call: Some(call),
            args,
            caller,
            env,
            depth,
        }
    }

    pub fn function(&self) -> Option<&Rc<FunctionValue>> {
        self.function.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self) -> Option<&Rc<Node>> {
        self.call.as_ref()
    }

    /// Supplied arguments, as promises, in call order.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn caller(&self) -> &CallerLink {
        &self.caller
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The frame this one runs on behalf of, following `Inherited` links.
    /// Wrapper frames of `eval` and promise forcing resolve to the closure
    /// call they evaluate in.
    pub fn activation(self: &Rc<Self>) -> Rc<Frame> {
        let mut frame = Rc::clone(self);
        while let CallerLink::Inherited(owner) = &frame.caller {
            let owner = Rc::clone(owner);
            frame = owner;
        }
        frame
    }
}

/// State of a caller-frame read.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CallerAccessState {
    /// Only materialized links seen so far.
    Uninitialized,
    /// A frame had to be recovered by a stack walk at least once.
    SlowPathSeen,
}

/// Per-site record of how caller frames have been obtained.
pub struct CallerFrameAccess {
    state: Cell<CallerAccessState>,
}

impl CallerFrameAccess {
    pub fn new() -> Self {
        CallerFrameAccess {
            state: Cell::new(CallerAccessState::Uninitialized),
        }
    }

    pub fn state(&self) -> CallerAccessState {
        self.state.get()
    }

    /// Record a slow-path access. Returns `true` on the first one.
    pub fn enter_slow_path(&self) -> bool {
        self.state.replace(CallerAccessState::SlowPathSeen) == CallerAccessState::Uninitialized
    }
}

impl Default for CallerFrameAccess {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
