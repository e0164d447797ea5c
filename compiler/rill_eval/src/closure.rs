//! Code paired with the environment it runs in.

use std::cell::OnceCell;
use std::rc::Rc;

use rill_ir::Name;

use crate::call_target::CallTarget;
use crate::engine::Engine;
use crate::environment::Env;
use crate::errors::EvalResult;
use crate::frame::Frame;
use crate::node::{Node, ParamNode};

/// Executable code bound to an environment.
///
/// Used as the payload of a promise: `code` is evaluated in `env` when the
/// promise is forced. Unlike a promise, a closure can be run any number of
/// times.
#[derive(Clone)]
pub struct Closure {
    code: Rc<Node>,
    env: Env,
}

impl Closure {
    pub fn new(code: Rc<Node>, env: Env) -> Self {
        Closure { code, env }
    }

    pub fn code(&self) -> &Rc<Node> {
        &self.code
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// A fresh call target running this closure's code.
    pub fn call_target(&self, engine: &Engine, name: &str) -> CallTarget {
        engine.make_call_target(Rc::clone(&self.code), name)
    }

    /// Evaluate the code in the captured environment.
    pub fn eval(&self, engine: &Engine, caller: &Rc<Frame>) -> EvalResult {
        engine.eval_closure(self, caller)
    }
}

/// A user-defined function value.
pub struct FunctionValue {
    pub params: Rc<[ParamNode]>,
    pub body: Rc<Node>,
    /// Defining environment; each call's scope is a child of it.
    pub env: Env,
    /// Name of the first variable the function was assigned to.
    name: OnceCell<Name>,
}

impl FunctionValue {
    pub fn new(params: Rc<[ParamNode]>, body: Rc<Node>, env: Env) -> Self {
        FunctionValue {
            params,
            body,
            env,
            name: OnceCell::new(),
        }
    }

    pub fn name(&self) -> Option<Name> {
        self.name.get().copied()
    }

    /// Record `name` unless the function already has one.
    pub fn set_name(&self, name: Name) {
        let _ = self.name.set(name);
    }
}
