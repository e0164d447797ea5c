//! Evaluation errors.
//!
//! All errors the evaluator raises are constructed through the factory
//! functions at the bottom of this module, so the user-visible wording lives
//! in one place. `EvalErrorKind` carries the structured category; `message`
//! is the rendered text.
//!
//! `break`/`next` travel through the same `Err` channel as errors, tagged
//! with `control_flow`, and are turned into a real error only if they escape
//! every loop.

use rill_ir::Span;
use std::fmt;

use crate::value::Value;

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Loop control signals.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ControlFlow {
    Break,
    Next,
}

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Lookup
    UnboundVariable { name: String },
    UnboundFunction { name: String },
    ArgumentMissing { name: String },

    // Calls
    NotAFunction,
    UnusedArgument { text: String },
    FormalMatchedMultiple { name: String },
    TooDeep { limit: usize },
    InvalidArgument { message: String },

    // Control flow
    NoLoopForBreakNext,

    // Promises
    PromiseRecursion,

    // Language reconstruction
    ReplacementCallUnsupported { name: String },
    InvalidLanguage,

    // Operators and conditions
    NonNumericArgument,
    IntegerOverflow,
    ConditionLength,
    ConditionNotLogical,

    /// Raised by `stop()`.
    User { message: String },

    /// Implementation fault, never a property of the user's program.
    Internal { message: String },

    /// Loop control signal in flight; see [`ControlFlow`].
    Signal,
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundVariable { name } => write!(f, "object '{name}' not found"),
            Self::UnboundFunction { name } => write!(f, "could not find function \"{name}\""),
            Self::ArgumentMissing { name } => {
                write!(f, "argument \"{name}\" is missing, with no default")
            }
            Self::NotAFunction => write!(f, "attempt to apply non-function"),
            Self::UnusedArgument { text } => write!(f, "unused argument ({text})"),
            Self::FormalMatchedMultiple { name } => write!(
                f,
                "formal argument \"{name}\" matched by multiple actual arguments"
            ),
            Self::TooDeep { .. } => write!(f, "evaluation nested too deeply: infinite recursion"),
            Self::InvalidArgument { message } => write!(f, "{message}"),
            Self::NoLoopForBreakNext => write!(f, "no loop for break/next, jumping to top level"),
            Self::PromiseRecursion => write!(
                f,
                "promise already under evaluation: recursive default argument reference or earlier problems?"
            ),
            Self::ReplacementCallUnsupported { name } => write!(
                f,
                "replacement call '{name}' cannot be rebuilt from language data"
            ),
            Self::InvalidLanguage => write!(f, "invalid language object: no function to call"),
            Self::NonNumericArgument => write!(f, "non-numeric argument to binary operator"),
            Self::IntegerOverflow => write!(f, "integer overflow"),
            Self::ConditionLength => write!(f, "argument is of length zero"),
            Self::ConditionNotLogical => write!(f, "argument is not interpretable as logical"),
            Self::User { message } => write!(f, "{message}"),
            Self::Internal { message } => write!(f, "internal error: {message}"),
            Self::Signal => write!(f, "loop control signal"),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Rendered message; equals `kind.to_string()`.
    pub message: String,
    /// Source location where the error was raised, when known.
    pub span: Option<Span>,
    /// Deparsed call the error is attributed to (`Error in f(x) : ...`).
    pub call: Option<String>,
    /// Set for `break`/`next` signals.
    pub control_flow: Option<ControlFlow>,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError {
            kind,
            message,
            span: None,
            call: None,
            control_flow: None,
        }
    }

    fn signal(flow: ControlFlow) -> Self {
        EvalError {
            control_flow: Some(flow),
            ..Self::from_kind(EvalErrorKind::Signal)
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span.get_or_insert(span);
        self
    }

    /// Attribute the error to `call` unless it already names one. Signals,
    /// internal faults and the recursion limit are never attributed.
    #[must_use]
    pub fn with_call_if_absent(mut self, call: impl FnOnce() -> String) -> Self {
        let attributable = !self.is_control_flow()
            && !self.is_internal()
            && !matches!(self.kind, EvalErrorKind::TooDeep { .. });
        if self.call.is_none() && attributable {
            self.call = Some(call());
        }
        self
    }

    #[inline]
    pub fn is_control_flow(&self) -> bool {
        self.control_flow.is_some()
    }

    /// Implementation faults are reported with a diagnostic trace rather
    /// than as ordinary language errors.
    #[inline]
    pub fn is_internal(&self) -> bool {
        matches!(self.kind, EvalErrorKind::Internal { .. })
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

// Signals

pub fn break_signal() -> EvalError {
    EvalError::signal(ControlFlow::Break)
}

pub fn next_signal() -> EvalError {
    EvalError::signal(ControlFlow::Next)
}

// Lookup errors

#[cold]
pub fn unbound_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnboundVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn unbound_function(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnboundFunction {
        name: name.to_string(),
    })
}

#[cold]
pub fn argument_missing(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArgumentMissing {
        name: name.to_string(),
    })
}

// Call errors

#[cold]
pub fn not_a_function() -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotAFunction)
}

#[cold]
pub fn unused_argument(text: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnusedArgument {
        text: text.to_string(),
    })
}

#[cold]
pub fn formal_matched_multiple(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::FormalMatchedMultiple {
        name: name.to_string(),
    })
}

#[cold]
pub fn too_deep(limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TooDeep { limit })
}

#[cold]
pub fn invalid_argument(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidArgument {
        message: message.into(),
    })
}

// Control flow errors

#[cold]
pub fn no_loop_for_break_next() -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoLoopForBreakNext)
}

// Promise errors

#[cold]
pub fn promise_recursion() -> EvalError {
    EvalError::from_kind(EvalErrorKind::PromiseRecursion)
}

// Language errors

#[cold]
pub fn replacement_call_unsupported(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ReplacementCallUnsupported {
        name: name.to_string(),
    })
}

#[cold]
pub fn invalid_language() -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidLanguage)
}

// Operator errors

#[cold]
pub fn non_numeric_argument() -> EvalError {
    EvalError::from_kind(EvalErrorKind::NonNumericArgument)
}

#[cold]
pub fn integer_overflow() -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOverflow)
}

#[cold]
pub fn condition_length() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ConditionLength)
}

#[cold]
pub fn condition_not_logical() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ConditionNotLogical)
}

// User and internal errors

#[cold]
pub fn user_error(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::User {
        message: message.into(),
    })
}

#[cold]
pub fn internal_error(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Internal {
        message: message.into(),
    })
}

#[cfg(test)]
mod tests;
