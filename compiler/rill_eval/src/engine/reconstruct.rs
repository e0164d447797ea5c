//! Rebuilding executable nodes from language objects.
//!
//! Quoted code already carries its node. A call assembled from parts
//! (`call("f", x)`, or elements spliced together at run time) is rebuilt
//! element by element:
//!
//! - a symbol becomes a variable read, re-resolved where the node runs
//! - a nested language object is rebuilt recursively
//! - a forced promise contributes its value; a pending one contributes its
//!   code, unwrapped one level only
//! - any other value is embedded as a constant
//!
//! Calls whose function is a replacement function (`names<-`) are rejected.

use std::rc::Rc;

use rill_ir::Span;

use super::Engine;
use crate::errors::{invalid_language, not_a_function, replacement_call_unsupported, EvalError};
use crate::node::{CallArg, Node};
use crate::value::{LangCall, Language, Value};

impl Engine {
    /// An executable node equivalent to `lang`.
    pub fn make_call_node(&self, lang: &Language) -> Result<Rc<Node>, EvalError> {
        match lang {
            Language::Node(node) => Ok(Rc::clone(node)),
            Language::Call(call) => self.rebuild_call(call),
        }
    }

    fn rebuild_call(&self, call: &LangCall) -> Result<Rc<Node>, EvalError> {
        let Some((head, rest)) = call.elements.split_first() else {
            return Err(invalid_language());
        };
        let args = rest
            .iter()
            .enumerate()
            .map(|(i, value)| {
                Ok(CallArg {
                    name: call.name_at(i + 1),
                    value: self.rebuild_element(value)?,
                })
            })
            .collect::<Result<Vec<_>, EvalError>>()?;

        let node = match head {
            Value::Symbol(name) => {
                let text = self.interner().lookup(*name);
                if text.ends_with("<-") {
                    return Err(replacement_call_unsupported(text));
                }
                Node::call(Rc::new(Node::read_var(*name, Span::DUMMY)), args, Span::DUMMY)
            }
            Value::Closure(_) | Value::Builtin(_) => {
                Node::static_call(head.clone(), args, Span::DUMMY)
            }
            Value::Language(_) | Value::Promise(_) => {
                Node::call(self.rebuild_element(head)?, args, Span::DUMMY)
            }
            Value::Null | Value::Missing => return Err(invalid_language()),
            _ => return Err(not_a_function()),
        };
        Ok(Rc::new(node))
    }

    fn rebuild_element(&self, value: &Value) -> Result<Rc<Node>, EvalError> {
        match value {
            Value::Symbol(name) => Ok(Rc::new(Node::read_var(*name, Span::DUMMY))),
            Value::Language(lang) => self.make_call_node(lang),
            Value::Promise(promise) => match (promise.value(), promise.closure()) {
                (Some(value), _) => Ok(Rc::new(Node::constant(value, Span::DUMMY))),
                (None, Some(closure)) => Ok(Rc::clone(closure.code())),
                (None, None) => Err(invalid_language()),
            },
            other => Ok(Rc::new(Node::constant(other.clone(), Span::DUMMY))),
        }
    }
}
