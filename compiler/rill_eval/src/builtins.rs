//! Bootstrap builtins.
//!
//! Just enough of a library to drive the core from source text: dynamic
//! evaluation (`eval`, `quote`, `call`), promise control (`force`,
//! `missing`), frame and environment introspection (`parent.frame`,
//! `sys.function`, `nargs`, `environment`, `globalenv`, `emptyenv`), output
//! (`print`, `invisible`, `paste`) and conditions (`warning`, `stop`).
//!
//! Builtins get no frame of their own. `Eager` builtins receive their
//! arguments evaluated left to right; `Special` builtins receive the
//! argument nodes and evaluate (or don't) themselves.

use rustc_hash::FxHashMap;
use std::rc::Rc;

use rill_ir::Name;

use crate::deparse::{deparse_value, format_double};
use crate::engine::Engine;
use crate::environment::Env;
use crate::errors::{invalid_argument, unused_argument, user_error, EvalError, EvalResult};
use crate::frame::Frame;
use crate::node::{CallArg, CallSite, NodeKind};
use crate::value::{LangCall, Language, Value};

/// How a builtin receives its arguments.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BuiltinKind {
    Eager,
    Special,
}

pub type BuiltinFn = fn(&Engine, &BuiltinCall<'_>) -> EvalResult;

/// A builtin function value.
#[derive(Copy, Clone)]
pub struct Builtin {
    pub name: &'static str,
    pub kind: BuiltinKind,
    pub(crate) func: BuiltinFn,
}

/// Everything a builtin sees of its call.
pub struct BuiltinCall<'a> {
    /// Evaluated arguments; empty for `Special` builtins.
    pub args: Vec<Value>,
    pub names: Vec<Option<Name>>,
    pub arg_nodes: &'a [CallArg],
    /// Environment the call was made in.
    pub env: &'a Env,
    /// Frame of the function the call was made in.
    pub frame: &'a Rc<Frame>,
    pub site: &'a CallSite,
}

impl BuiltinCall<'_> {
    /// Match the evaluated arguments against `formals`: exact names first,
    /// then positions. Any formal named `...` collects everything left over.
    fn match_formals(
        &self,
        engine: &Engine,
        formals: &[&str],
    ) -> Result<(Vec<Option<Value>>, Vec<Value>), EvalError> {
        let interner = engine.interner();
        let mut matched: Vec<Option<Value>> = vec![None; formals.len()];
        let mut positional = Vec::new();
        for (value, name) in self.args.iter().zip(&self.names) {
            let slot = name.and_then(|n| {
                let text = interner.lookup(n);
                formals.iter().position(|f| *f == text)
            });
            match slot {
                Some(i) if matched[i].is_none() => matched[i] = Some(value.clone()),
                _ => positional.push(value.clone()),
            }
        }
        let rest_slot = formals.iter().position(|f| *f == "...");
        let mut rest = Vec::new();
        let mut positional = positional.into_iter();
        // Formals after `...` only match by name.
        let positional_formals = rest_slot.unwrap_or(formals.len());
        for slot in matched.iter_mut().take(positional_formals) {
            if slot.is_none() {
                *slot = positional.next();
            }
        }
        for value in positional {
            if rest_slot.is_some() {
                rest.push(value);
            } else {
                return Err(unused_argument(&deparse_value(&value, interner)));
            }
        }
        Ok((matched, rest))
    }

    fn single(&self, engine: &Engine, formal: &str) -> Result<Option<Value>, EvalError> {
        let (mut matched, _) = self.match_formals(engine, &[formal])?;
        Ok(matched.pop().flatten())
    }

    fn required(&self, engine: &Engine, formal: &str) -> Result<Value, EvalError> {
        self.single(engine, formal)?
            .ok_or_else(|| crate::errors::argument_missing(formal))
    }
}

/// Builtin resolution by name.
pub struct BuiltinTable {
    by_name: FxHashMap<&'static str, Builtin>,
}

impl BuiltinTable {
    pub fn new() -> Self {
        BuiltinTable {
            by_name: BUILTINS.iter().map(|b| (b.name, *b)).collect(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Builtin> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Builtin> {
        self.by_name.values()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl Default for BuiltinTable {
    fn default() -> Self {
        Self::new()
    }
}

const fn eager(name: &'static str, func: BuiltinFn) -> Builtin {
    Builtin {
        name,
        kind: BuiltinKind::Eager,
        func,
    }
}

const fn special(name: &'static str, func: BuiltinFn) -> Builtin {
    Builtin {
        name,
        kind: BuiltinKind::Special,
        func,
    }
}

const BUILTINS: &[Builtin] = &[
    eager("eval", builtin_eval),
    special("quote", builtin_quote),
    eager("call", builtin_call),
    eager("as.name", builtin_as_name),
    eager("force", builtin_identity),
    eager("identity", builtin_identity),
    eager("print", builtin_print),
    eager("invisible", builtin_invisible),
    eager("warning", builtin_warning),
    eager("stop", builtin_stop),
    eager("parent.frame", builtin_parent_frame),
    eager("sys.function", builtin_sys_function),
    eager("nargs", builtin_nargs),
    eager("environment", builtin_environment),
    special("missing", builtin_missing),
    eager("paste", builtin_paste),
    eager("globalenv", builtin_globalenv),
    eager("emptyenv", builtin_emptyenv),
];

/// `eval(expr, envir)`: evaluate a language object through the call site's
/// expression cache.
fn builtin_eval(engine: &Engine, call: &BuiltinCall<'_>) -> EvalResult {
    let (matched, _) = call.match_formals(engine, &["expr", "envir"])?;
    let mut matched = matched.into_iter();
    let expr = matched.next().flatten().unwrap_or(Value::Null);
    let env = match matched.next().flatten() {
        None => call.env.clone(),
        Some(Value::Env(env)) => env,
        Some(other) => {
            return Err(invalid_argument(format!(
                "invalid 'envir' argument of type '{}'",
                other.type_name()
            )))
        }
    };
    match expr {
        Value::Language(lang) => {
            let cache = call.site.expression_cache(engine.config().max_pic_depth);
            cache.execute(engine, call.site, &lang, &env, call.frame)
        }
        Value::Symbol(name) => engine.read_symbol(name, &env, call.frame),
        Value::Promise(promise) => engine.eval_promise(&promise, call.frame),
        other => Ok(other),
    }
}

/// `quote(expr)`: the argument as data.
fn builtin_quote(_engine: &Engine, call: &BuiltinCall<'_>) -> EvalResult {
    let [arg] = call.arg_nodes else {
        return Err(invalid_argument(format!(
            "{} arguments passed to 'quote' which requires 1",
            call.arg_nodes.len()
        )));
    };
    Ok(match &arg.value.kind {
        NodeKind::ReadVar { name, .. } => Value::Symbol(*name),
        NodeKind::Constant(value) => value.clone(),
        _ => Value::language(Language::Node(Rc::clone(&arg.value))),
    })
}

/// `call(name, ...)`: build a call in list form.
fn builtin_call(engine: &Engine, call: &BuiltinCall<'_>) -> EvalResult {
    let Some((head, rest)) = call.args.split_first() else {
        return Err(crate::errors::argument_missing("name"));
    };
    let Some(name) = head.as_str() else {
        return Err(invalid_argument("first argument must be a character string"));
    };
    let mut elements = Vec::with_capacity(call.args.len());
    elements.push(Value::Symbol(engine.interner().intern(name)));
    elements.extend(rest.iter().cloned());
    let mut names = vec![None];
    names.extend(call.names.iter().skip(1).copied());
    Ok(Value::language(Language::Call(
        LangCall::new(elements).with_names(names),
    )))
}

/// `as.name(x)`: a symbol from a string.
fn builtin_as_name(engine: &Engine, call: &BuiltinCall<'_>) -> EvalResult {
    match call.required(engine, "x")? {
        Value::Str(s) => Ok(Value::Symbol(engine.interner().intern(&s))),
        symbol @ Value::Symbol(_) => Ok(symbol),
        other => Err(invalid_argument(format!(
            "invalid type/length ({}) in vector allocation",
            other.type_name()
        ))),
    }
}

/// `force(x)` / `identity(x)`: the argument, already forced by the call.
fn builtin_identity(engine: &Engine, call: &BuiltinCall<'_>) -> EvalResult {
    call.required(engine, "x")
}

fn builtin_print(engine: &Engine, call: &BuiltinCall<'_>) -> EvalResult {
    let value = call.required(engine, "x")?;
    engine.console().println(&engine.format_value(&value));
    engine.set_visible(false);
    Ok(value)
}

fn builtin_invisible(engine: &Engine, call: &BuiltinCall<'_>) -> EvalResult {
    let value = call.single(engine, "x")?.unwrap_or(Value::Null);
    engine.set_visible(false);
    Ok(value)
}

fn builtin_warning(engine: &Engine, call: &BuiltinCall<'_>) -> EvalResult {
    let message = concat_message(engine, &call.args);
    engine.warnings().push(message.clone());
    engine.set_visible(false);
    Ok(Value::string(&message))
}

fn builtin_stop(engine: &Engine, call: &BuiltinCall<'_>) -> EvalResult {
    Err(user_error(concat_message(engine, &call.args)))
}

fn concat_message(engine: &Engine, args: &[Value]) -> String {
    args.iter().map(|v| engine.as_text(v)).collect()
}

/// `parent.frame(n = 1)`: environment of the n-th calling frame.
fn builtin_parent_frame(engine: &Engine, call: &BuiltinCall<'_>) -> EvalResult {
    let generations = match call.single(engine, "n")? {
        None => 1,
        Some(Value::Int(n)) if n >= 1 => n,
        #[allow(clippy::cast_possible_truncation, reason = "checked integral and positive")]
        Some(Value::Double(d)) if d >= 1.0 && d.fract() == 0.0 => d as i64,
        Some(_) => return Err(invalid_argument("invalid 'n' value")),
    };
    let mut frame = Rc::clone(call.frame);
    for _ in 0..generations {
        let caller = engine.caller_frame(&frame, call.site.caller_access());
        if Rc::ptr_eq(&caller, &frame) {
            break;
        }
        frame = caller;
    }
    Ok(Value::Env(frame.env().clone()))
}

/// `sys.function()`: the closure whose call is being evaluated.
fn builtin_sys_function(engine: &Engine, call: &BuiltinCall<'_>) -> EvalResult {
    call.match_formals(engine, &[])?;
    call.frame
        .activation()
        .function()
        .map(|function| Value::Closure(Rc::clone(function)))
        .ok_or_else(|| invalid_argument("not that many frames on the stack"))
}

/// `nargs()`: how many arguments the enclosing call supplied.
fn builtin_nargs(engine: &Engine, call: &BuiltinCall<'_>) -> EvalResult {
    call.match_formals(engine, &[])?;
    let supplied = call.frame.activation().args().len();
    Ok(Value::Int(i64::try_from(supplied).unwrap_or(i64::MAX)))
}

/// `environment(fun = NULL)`: the calling environment, or a closure's
/// defining environment.
fn builtin_environment(engine: &Engine, call: &BuiltinCall<'_>) -> EvalResult {
    match call.single(engine, "fun")? {
        None | Some(Value::Null) => Ok(Value::Env(call.env.clone())),
        Some(Value::Closure(function)) => Ok(Value::Env(function.env.clone())),
        Some(_) => Ok(Value::Null),
    }
}

/// `missing(x)`: whether formal `x` was supplied.
fn builtin_missing(_engine: &Engine, call: &BuiltinCall<'_>) -> EvalResult {
    let [arg] = call.arg_nodes else {
        return Err(invalid_argument("'missing' takes exactly one argument"));
    };
    let NodeKind::ReadVar { name, .. } = &arg.value.kind else {
        return Err(invalid_argument("invalid use of 'missing'"));
    };
    Ok(Value::Logical(is_missing(call.env, *name)))
}

/// A formal is missing if it is bound to the missing marker, or to an
/// unforced promise that merely reads another missing formal.
fn is_missing(env: &Env, name: Name) -> bool {
    match env.get_local(name) {
        Some(Value::Missing) => true,
        Some(Value::Promise(promise)) if !promise.is_forced() => {
            match promise.closure().map(|c| (&c.code().kind, c.env())) {
                Some((NodeKind::ReadVar { name: inner, .. }, inner_env)) => {
                    is_missing(inner_env, *inner)
                }
                _ => false,
            }
        }
        _ => false,
    }
}

/// `paste(..., sep = " ")`.
fn builtin_paste(engine: &Engine, call: &BuiltinCall<'_>) -> EvalResult {
    let (matched, rest) = call.match_formals(engine, &["...", "sep"])?;
    let sep = match matched.into_iter().nth(1).flatten() {
        None => " ".to_string(),
        Some(Value::Str(s)) => s.to_string(),
        Some(_) => return Err(invalid_argument("invalid separator")),
    };
    let parts: Vec<String> = rest
        .iter()
        .filter(|v| !matches!(v, Value::Null))
        .map(|v| engine.as_text(v))
        .collect();
    Ok(Value::string(&parts.join(&sep)))
}

fn builtin_globalenv(engine: &Engine, _call: &BuiltinCall<'_>) -> EvalResult {
    Ok(Value::Env(engine.global_env().clone()))
}

fn builtin_emptyenv(engine: &Engine, _call: &BuiltinCall<'_>) -> EvalResult {
    Ok(Value::Env(engine.empty_env().clone()))
}

/// Character rendering used by `paste`, `warning` and `stop`.
pub fn as_text(value: &Value, interner: &rill_ir::StringInterner) -> String {
    match value {
        Value::Str(s) => s.to_string(),
        Value::Double(d) => format_double(*d),
        Value::Int(n) => n.to_string(),
        Value::Logical(true) => "TRUE".to_string(),
        Value::Logical(false) => "FALSE".to_string(),
        Value::Null => String::new(),
        other => deparse_value(other, interner),
    }
}

#[cfg(test)]
mod tests;
