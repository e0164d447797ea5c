//! Runtime values.
//!
//! Scalars are stored inline; everything with identity (language objects,
//! functions, promises, environments) is reference counted so that copies of
//! a value observe the same object.

use std::fmt;
use std::rc::Rc;

use rill_ir::Name;

use crate::builtins::Builtin;
use crate::closure::FunctionValue;
use crate::environment::Env;
use crate::node::Node;
use crate::promise::Promise;

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Null,
    /// Marker bound to a formal parameter that received no argument and has
    /// no default.
    Missing,
    Logical(bool),
    Int(i64),
    Double(f64),
    Str(Rc<str>),
    Symbol(Name),
    Language(Rc<Language>),
    Closure(Rc<FunctionValue>),
    Builtin(Builtin),
    Promise(Rc<Promise>),
    Env(Env),
}

impl Value {
    pub fn string(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    pub fn language(lang: Language) -> Self {
        Value::Language(Rc::new(lang))
    }

    /// Type name as reported by `typeof`-style messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Missing => "missing",
            Value::Logical(_) => "logical",
            Value::Int(_) => "integer",
            Value::Double(_) => "double",
            Value::Str(_) => "character",
            Value::Symbol(_) => "symbol",
            Value::Language(_) => "language",
            Value::Closure(_) => "closure",
            Value::Builtin(_) => "builtin",
            Value::Promise(_) => "promise",
            Value::Env(_) => "environment",
        }
    }

    #[inline]
    pub fn is_function(&self) -> bool {
        matches!(self, Value::Closure(_) | Value::Builtin(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_env(&self) -> Option<&Env> {
        match self {
            Value::Env(env) => Some(env),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// Scalars compare by value, everything else by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Missing, Value::Missing) => true,
            (Value::Logical(a), Value::Logical(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            #[allow(clippy::float_cmp, reason = "value identity, not numeric tolerance")]
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Language(a), Value::Language(b)) => Rc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a.name == b.name,
            (Value::Promise(a), Value::Promise(b)) => Rc::ptr_eq(a, b),
            (Value::Env(a), Value::Env(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Missing => write!(f, "Missing"),
            Value::Logical(b) => write!(f, "Logical({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Double(d) => write!(f, "Double({d})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Symbol(name) => write!(f, "Symbol({name:?})"),
            Value::Language(lang) => write!(f, "Language({lang:?})"),
            Value::Closure(_) => write!(f, "<closure>"),
            Value::Builtin(b) => write!(f, "<builtin {}>", b.name),
            Value::Promise(p) => write!(f, "<promise forced={}>", p.is_forced()),
            Value::Env(_) => write!(f, "<environment>"),
        }
    }
}

/// A language object: unevaluated code as data.
///
/// Code captured by `quote` keeps its executable node. Calls assembled from
/// parts carry only the element list and are turned back into a node by
/// `Engine::make_call_node`.
pub enum Language {
    Node(Rc<Node>),
    Call(LangCall),
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Node(_) => write!(f, "Node"),
            Language::Call(call) => f
                .debug_struct("Call")
                .field("elements", &call.elements)
                .field("names", &call.names)
                .finish(),
        }
    }
}

/// A call in list form: element 0 is the function, the rest are arguments.
///
/// `names` runs parallel to `elements`; a shorter list leaves the trailing
/// elements unnamed.
pub struct LangCall {
    pub elements: Vec<Value>,
    pub names: Vec<Option<Name>>,
}

impl LangCall {
    pub fn new(elements: Vec<Value>) -> Self {
        LangCall {
            elements,
            names: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_names(mut self, names: Vec<Option<Name>>) -> Self {
        self.names = names;
        self
    }

    /// Name of the element at `index`, if any.
    pub fn name_at(&self, index: usize) -> Option<Name> {
        self.names.get(index).copied().flatten()
    }
}
