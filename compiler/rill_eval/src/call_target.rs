//! Call targets: code wrapped as an argument-less function.

use std::rc::Rc;

use crate::engine::Engine;
use crate::environment::Env;
use crate::errors::EvalResult;
use crate::frame::Frame;
use crate::node::Node;

/// An invocable unit made from a root node.
///
/// The body runs in the environment of the frame it is invoked with. The
/// wrapper's own defining environment hangs directly off the empty
/// environment, so nothing is ever resolved lexically through the code that
/// created the target.
pub struct CallTarget {
    name: Rc<str>,
    body: Rc<Node>,
    definition_env: Env,
}

impl CallTarget {
    pub(crate) fn new(body: Rc<Node>, name: &str, empty_env: &Env) -> Self {
        CallTarget {
            name: Rc::from(name),
            body,
            definition_env: empty_env.child(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &Rc<Node> {
        &self.body
    }

    pub fn definition_env(&self) -> &Env {
        &self.definition_env
    }

    /// Run the body against `frame` inside a fresh wrapper frame.
    pub(crate) fn invoke(&self, engine: &Engine, frame: &Rc<Frame>) -> EvalResult {
        engine.eval_in_wrapper(&self.body, Rc::clone(&self.name), frame)
    }
}
