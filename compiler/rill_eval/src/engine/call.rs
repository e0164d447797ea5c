//! Closure and builtin calls.

use std::rc::Rc;

use rill_ir::Name;

use super::{contain_control_flow, Engine};
use crate::builtins::{Builtin, BuiltinCall, BuiltinKind};
use crate::closure::{Closure, FunctionValue};
use crate::deparse::deparse;
use crate::environment::Env;
use crate::errors::{
    formal_matched_multiple, not_a_function, unused_argument, EvalError, EvalResult,
};
use crate::frame::{CallerLink, Frame};
use crate::node::{CallArg, CallSite, Node, NodeKind, ParamNode};
use crate::promise::Promise;
use crate::value::Value;

impl Engine {
    /// Call `function` with the arguments of `call`.
    pub(super) fn call_function(
        &self,
        function: &Value,
        call: &Rc<Node>,
        args: &[CallArg],
        site: &Rc<CallSite>,
        env: &Env,
        frame: &Rc<Frame>,
    ) -> EvalResult {
        match function {
            Value::Closure(function) => self.call_closure(function, call, args, site, env, frame),
            Value::Builtin(builtin) => self.call_builtin(*builtin, args, site, env, frame),
            _ => Err(not_a_function()),
        }
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(function = %self.function_name(function))
    )]
    fn call_closure(
        &self,
        function: &Rc<FunctionValue>,
        call: &Rc<Node>,
        args: &[CallArg],
        site: &Rc<CallSite>,
        env: &Env,
        frame: &Rc<Frame>,
    ) -> EvalResult {
        let supplied: Vec<Value> = args.iter().map(|arg| make_promise(&arg.value, env)).collect();
        let callee_env = function.env.child();
        self.bind_arguments(&function.params, args, &supplied, &callee_env)
            .map_err(|err| err.with_call_if_absent(|| deparse(call, self.interner())))?;

        let caller = if site.needs_caller_frame() {
            CallerLink::Materialized(Rc::clone(frame))
        } else {
            CallerLink::Pending(Rc::clone(site))
        };
        let callee_frame = Rc::new(Frame::for_call(
            Rc::clone(function),
            self.function_name(function),
            Rc::clone(call),
            supplied,
            caller,
            callee_env,
            self.frame_depth() + 1,
        ));

        let _guard = self.push_frame(&callee_frame)?;
        let result = self.eval(&function.body, callee_frame.env(), &callee_frame);
        contain_control_flow(result)
            .map_err(|err| err.with_call_if_absent(|| deparse(call, self.interner())))
    }

    /// Bind `supplied` to `params` in `callee_env`: exact names first, then
    /// positions. Unfilled formals get a default promise or the missing
    /// marker.
    fn bind_arguments(
        &self,
        params: &[ParamNode],
        args: &[CallArg],
        supplied: &[Value],
        callee_env: &Env,
    ) -> Result<(), EvalError> {
        let mut matched: Vec<Option<Value>> = vec![None; params.len()];
        let mut positional = Vec::new();

        for (index, (arg, value)) in args.iter().zip(supplied).enumerate() {
            let Some(name) = arg.name else {
                positional.push((index, value));
                continue;
            };
            let Some(slot) = params.iter().position(|p| p.name == name) else {
                return Err(unused_argument(&self.deparse_arg(arg)));
            };
            if matched[slot].is_some() {
                return Err(formal_matched_multiple(self.interner().lookup(name)));
            }
            matched[slot] = Some(value.clone());
        }

        let mut positional = positional.into_iter();
        for slot in matched.iter_mut().filter(|slot| slot.is_none()) {
            match positional.next() {
                Some((_, value)) => *slot = Some(value.clone()),
                None => break,
            }
        }
        if let Some((index, _)) = positional.next() {
            return Err(unused_argument(&self.deparse_arg(&args[index])));
        }

        for (param, value) in params.iter().zip(matched) {
            let value = match (value, &param.default) {
                (Some(value), _) => value,
                (None, Some(default)) => Value::Promise(Rc::new(Promise::new(Closure::new(
                    Rc::clone(default),
                    callee_env.clone(),
                )))),
                (None, None) => Value::Missing,
            };
            callee_env.bind(param.name, value);
        }
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip_all, fields(builtin = builtin.name))]
    fn call_builtin(
        &self,
        builtin: Builtin,
        args: &[CallArg],
        site: &CallSite,
        env: &Env,
        frame: &Rc<Frame>,
    ) -> EvalResult {
        let names: Vec<Option<Name>> = args.iter().map(|arg| arg.name).collect();
        let values = match builtin.kind {
            BuiltinKind::Eager => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    let value = self.eval(&arg.value, env, frame)?;
                    values.push(self.force(value, frame)?);
                }
                values
            }
            BuiltinKind::Special => Vec::new(),
        };
        self.set_visible(true);
        let call = BuiltinCall {
            args: values,
            names,
            arg_nodes: args,
            env,
            frame,
            site,
        };
        (builtin.func)(self, &call)
    }

    fn function_name(&self, function: &FunctionValue) -> Rc<str> {
        function.name().map_or_else(
            || Rc::from("<anonymous>"),
            |name| Rc::from(self.interner().lookup(name)),
        )
    }

    fn deparse_arg(&self, arg: &CallArg) -> String {
        let value = deparse(&arg.value, self.interner());
        match arg.name {
            Some(name) => format!("{} = {value}", self.interner().lookup(name)),
            None => value,
        }
    }
}

/// Argument promise for `node` evaluated in `env`. Constants need no code.
fn make_promise(node: &Rc<Node>, env: &Env) -> Value {
    let promise = match &node.kind {
        NodeKind::Constant(value) => Promise::evaluated(value.clone()),
        _ => Promise::new(Closure::new(Rc::clone(node), env.clone())),
    };
    Value::Promise(Rc::new(promise))
}
