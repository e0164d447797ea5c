//! Node evaluation, variable reads and promise forcing.

use std::rc::Rc;

use rill_ir::{BinaryOp, Name};
use rill_stack::ensure_sufficient_stack;

use super::Engine;
use crate::closure::FunctionValue;
use crate::environment::{Env, Lookup};
use crate::errors::{
    argument_missing, break_signal, next_signal, not_a_function, unbound_function,
    unbound_variable, ControlFlow, EvalError, EvalResult,
};
use crate::frame::Frame;
use crate::node::{AssignScope, Node, NodeKind, ReadSite};
use crate::operators::{as_logical, evaluate_binary, evaluate_unary};
use crate::promise::Promise;
use crate::value::Value;

/// What a loop body's outcome asks the loop to do.
enum LoopStep {
    Continue,
    Exit,
}

fn loop_step(result: EvalResult) -> Result<LoopStep, EvalError> {
    match result {
        Ok(_) => Ok(LoopStep::Continue),
        Err(err) => match err.control_flow {
            Some(ControlFlow::Break) => Ok(LoopStep::Exit),
            Some(ControlFlow::Next) => Ok(LoopStep::Continue),
            None => Err(err),
        },
    }
}

impl Engine {
    /// Evaluate `node` in `env` on behalf of `frame`.
    pub fn eval(&self, node: &Rc<Node>, env: &Env, frame: &Rc<Frame>) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(node, env, frame))
            .map_err(|err| err.with_span(node.span))
    }

    #[tracing::instrument(level = "trace", skip_all)]
    fn eval_inner(&self, node: &Rc<Node>, env: &Env, frame: &Rc<Frame>) -> EvalResult {
        match &node.kind {
            NodeKind::Constant(value) => {
                self.set_visible(true);
                Ok(value.clone())
            }
            NodeKind::ReadVar { name, site } => {
                let value = self.read_var(*name, site, env, frame)?;
                self.set_visible(true);
                Ok(value)
            }
            NodeKind::Assign { name, value, scope } => {
                let value = self.eval(value, env, frame)?;
                if let Value::Closure(function) = &value {
                    function.set_name(*name);
                }
                match scope {
                    AssignScope::Local => env.bind(*name, value.clone()),
                    AssignScope::Enclosing => {
                        env.assign_enclosing(*name, value.clone(), &self.global_env);
                    }
                }
                self.set_visible(false);
                Ok(value)
            }
            NodeKind::Function { params, body } => {
                self.set_visible(true);
                Ok(Value::Closure(Rc::new(FunctionValue::new(
                    Rc::clone(params),
                    Rc::clone(body),
                    env.clone(),
                ))))
            }
            NodeKind::Call { callee, args, site } => {
                let function = self.eval_callee(callee, env, frame)?;
                self.call_function(&function, node, args, site, env, frame)
            }
            NodeKind::StaticCall {
                function,
                args,
                site,
            } => self.call_function(function, node, args, site, env, frame),
            NodeKind::Block(statements) => {
                self.set_visible(true);
                let mut result = Value::Null;
                for statement in statements {
                    result = self.eval(statement, env, frame)?;
                }
                Ok(result)
            }
            NodeKind::Paren(inner) => {
                let value = self.eval(inner, env, frame)?;
                self.set_visible(true);
                Ok(value)
            }
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_condition(cond, env, frame)? {
                    self.eval(then_branch, env, frame)
                } else if let Some(else_branch) = else_branch {
                    self.eval(else_branch, env, frame)
                } else {
                    self.set_visible(false);
                    Ok(Value::Null)
                }
            }
            NodeKind::While { cond, body } => {
                while self.eval_condition(cond, env, frame)? {
                    if let LoopStep::Exit = loop_step(self.eval(body, env, frame))? {
                        break;
                    }
                }
                self.set_visible(false);
                Ok(Value::Null)
            }
            NodeKind::Repeat(body) => {
                loop {
                    if let LoopStep::Exit = loop_step(self.eval(body, env, frame))? {
                        break;
                    }
                }
                self.set_visible(false);
                Ok(Value::Null)
            }
            NodeKind::Break => Err(break_signal()),
            NodeKind::Next => Err(next_signal()),
            NodeKind::Binary { op, lhs, rhs } => {
                let value = match op {
                    BinaryOp::AndAnd => Value::Logical(
                        self.eval_condition(lhs, env, frame)?
                            && self.eval_condition(rhs, env, frame)?,
                    ),
                    BinaryOp::OrOr => Value::Logical(
                        self.eval_condition(lhs, env, frame)?
                            || self.eval_condition(rhs, env, frame)?,
                    ),
                    _ => {
                        let left = self.eval(lhs, env, frame)?;
                        let right = self.eval(rhs, env, frame)?;
                        evaluate_binary(*op, &left, &right)?
                    }
                };
                self.set_visible(true);
                Ok(value)
            }
            NodeKind::Unary { op, operand } => {
                let operand = self.eval(operand, env, frame)?;
                let value = evaluate_unary(*op, &operand)?;
                self.set_visible(true);
                Ok(value)
            }
        }
    }

    fn eval_condition(
        &self,
        cond: &Rc<Node>,
        env: &Env,
        frame: &Rc<Frame>,
    ) -> Result<bool, EvalError> {
        let value = self.eval(cond, env, frame)?;
        as_logical(&value).map_err(|err| err.with_span(cond.span))
    }

    /// Resolve the function of a call. A bare name is looked up in function
    /// position, skipping bindings that are not functions.
    fn eval_callee(&self, callee: &Rc<Node>, env: &Env, frame: &Rc<Frame>) -> EvalResult {
        if let NodeKind::ReadVar { name, .. } = &callee.kind {
            return env
                .lookup_function(*name, |promise| self.eval_promise(promise, frame))?
                .ok_or_else(|| unbound_function(self.interner.lookup(*name)));
        }
        let value = self.eval(callee, env, frame)?;
        let value = self.force(value, frame)?;
        if value.is_function() {
            Ok(value)
        } else {
            Err(not_a_function())
        }
    }

    /// Read `name` at a variable-read site, forcing a promise through the
    /// site's promise cache.
    fn read_var(&self, name: Name, site: &ReadSite, env: &Env, frame: &Rc<Frame>) -> EvalResult {
        match env.lookup(name) {
            Lookup::Found(Value::Promise(promise)) => {
                let max_depth = self.config.max_pic_depth;
                let value = promise.force_with(|closure| {
                    self.bump_stats(|s| s.promises_forced += 1);
                    site.promise_cache(max_depth)
                        .execute(self, site, closure, closure.env(), frame)
                })?;
                self.force(value, frame)
            }
            Lookup::Found(value) => Ok(value),
            Lookup::Missing => Err(argument_missing(self.interner.lookup(name))),
            Lookup::NotFound => Err(unbound_variable(self.interner.lookup(name))),
        }
    }

    /// Read `name` with no read site, as `eval` of a bare symbol does.
    pub fn read_symbol(&self, name: Name, env: &Env, frame: &Rc<Frame>) -> EvalResult {
        let value = match env.lookup(name) {
            Lookup::Found(value) => value,
            Lookup::Missing => return Err(argument_missing(self.interner.lookup(name))),
            Lookup::NotFound => return Err(unbound_variable(self.interner.lookup(name))),
        };
        self.set_visible(true);
        self.force(value, frame)
    }

    /// Force `value` if it is a promise, transitively; other values are
    /// returned unchanged.
    pub fn force(&self, mut value: Value, frame: &Rc<Frame>) -> EvalResult {
        while let Value::Promise(promise) = value {
            value = self.force_promise(&promise, frame)?;
        }
        Ok(value)
    }

    /// One forcing step with no call-site cache.
    #[tracing::instrument(level = "debug", skip_all)]
    pub(super) fn force_promise(&self, promise: &Promise, frame: &Rc<Frame>) -> EvalResult {
        promise.force_with(|closure| {
            self.bump_stats(|s| s.promises_forced += 1);
            closure.eval(self, frame)
        })
    }
}
