//! The outermost evaluation boundary.
//!
//! Source text is parsed, each top-level statement is wrapped in a
//! `<repl wrapper>` call target, and each is run on its own. At top level
//! a user error is printed and swallowed, so the next statement still
//! runs; pending warnings are flushed after every statement. Internal
//! faults (an internal error, or a panic) are reported with a backtrace and
//! end the process when the engine is configured to crash on them.

use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use rill_parse::{ParseError, ParseErrorKind};

use super::{contain_control_flow, Engine, REPL_WRAPPER};
use crate::call_target::CallTarget;
use crate::environment::Env;
use crate::errors::{EvalError, EvalResult};
use crate::frame::Frame;
use crate::transform::transform;
use crate::value::{Language, Value};

/// Result of [`Engine::parse_and_eval`].
#[derive(Debug)]
pub enum SourceOutcome {
    /// One entry per top-level statement; `None` where it failed.
    Evaluated(Vec<Option<Value>>),
    /// Input ended mid-expression; more is needed.
    Incomplete,
    ParseFailed(ParseError),
}

impl Engine {
    /// Parse `source` into one language object per top-level expression.
    pub fn parse(&self, source: &str) -> Result<Vec<Rc<Language>>, ParseError> {
        let exprs = rill_parse::parse(source, &self.interner)?;
        Ok(exprs
            .iter()
            .map(|expr| Rc::new(Language::Node(transform(expr))))
            .collect())
    }

    /// Parse `source` and run each statement at top level in `env`.
    ///
    /// With `allow_incomplete`, input that ends mid-expression yields
    /// [`SourceOutcome::Incomplete`] and nothing runs. Otherwise a parse
    /// failure is reported on the output stream.
    #[tracing::instrument(level = "debug", skip(self, source, env))]
    pub fn parse_and_eval(
        &self,
        description: &str,
        source: &str,
        env: &Env,
        print_result: bool,
        allow_incomplete: bool,
    ) -> SourceOutcome {
        let exprs = match rill_parse::parse(source, &self.interner) {
            Ok(exprs) => exprs,
            Err(err) if err.is_incomplete() && allow_incomplete => {
                return SourceOutcome::Incomplete;
            }
            Err(err) => {
                self.report_parse_error(&err, source);
                return SourceOutcome::ParseFailed(err);
            }
        };
        let frame = if env.ptr_eq(&self.global_env) {
            Rc::clone(&self.global_frame)
        } else {
            Rc::new(Frame::top_level(env.clone()))
        };
        let results = exprs
            .iter()
            .map(|expr| {
                let target = self.make_call_target(transform(expr), REPL_WRAPPER);
                self.run_top_level(&target, &frame, print_result)
            })
            .collect();
        SourceOutcome::Evaluated(results)
    }

    /// Execute `target` against `frame`.
    ///
    /// A `break`/`next` that escapes the target becomes a language error.
    /// With `top_level`, errors are reported and `Ok(None)` is returned;
    /// otherwise they propagate unchanged, internal faults after being
    /// logged. `print_result` prints a visible
    /// result.
    #[tracing::instrument(
        level = "debug",
        skip(self, target, frame),
        fields(target = target.name())
    )]
    pub fn run(
        &self,
        target: &CallTarget,
        frame: &Rc<Frame>,
        print_result: bool,
        top_level: bool,
    ) -> Result<Option<Value>, EvalError> {
        if top_level {
            return Ok(self.run_top_level(target, frame, print_result));
        }
        let value = match self.run_nested(target, frame) {
            Ok(value) => value,
            Err(err) => {
                if err.is_internal() {
                    self.bump_stats(|s| s.nested_internal_faults += 1);
                    tracing::warn!(message = %err.message, "internal fault below top level");
                }
                return Err(err);
            }
        };
        if print_result && self.is_visible() {
            self.print_value(&value);
        }
        Ok(Some(value))
    }

    pub(crate) fn run_nested(&self, target: &CallTarget, frame: &Rc<Frame>) -> EvalResult {
        contain_control_flow(target.invoke(self, frame))
    }

    fn run_top_level(
        &self,
        target: &CallTarget,
        frame: &Rc<Frame>,
        print_result: bool,
    ) -> Option<Value> {
        self.set_visible(true);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run_nested(target, frame)));
        match outcome {
            Ok(Ok(value)) => {
                if print_result && self.is_visible() {
                    self.print_value(&value);
                }
                self.warnings.flush(&self.console, false);
                Some(value)
            }
            Ok(Err(err)) if err.is_internal() => {
                self.report_internal_fault(&err.message);
                None
            }
            Ok(Err(err)) => {
                self.report_error(&err);
                None
            }
            Err(payload) => {
                let message = format!("internal error: {}", panic_message(payload.as_ref()));
                self.report_internal_fault(&message);
                None
            }
        }
    }

    /// `Error: msg` or `Error in <call> : msg`, then any warnings.
    fn report_error(&self, err: &EvalError) {
        let text = match &err.call {
            Some(call) => {
                let call = call.lines().next().unwrap_or_default();
                format!("Error in {call} : {}", err.message)
            }
            None => format!("Error: {}", err.message),
        };
        self.console.print_errorln(&text);
        self.warnings.flush(&self.console, true);
    }

    fn report_internal_fault(&self, message: &str) {
        tracing::warn!(message, "internal fault at top level");
        let backtrace = Backtrace::force_capture();
        self.console.print_errorln(message);
        self.console.print_errorln(&backtrace.to_string());
        self.warnings.flush(&self.console, true);
        if self.config.crash_on_fatal_error {
            self.console.flush();
            std::process::exit(2);
        }
    }

    fn report_parse_error(&self, err: &ParseError, source: &str) {
        let mut text = match err.kind {
            ParseErrorKind::UnexpectedEof | ParseErrorKind::UnexpectedToken { .. } => format!(
                "Error: unexpected '{}' in \"{}\"",
                err.token_text(),
                line_prefix(err, source)
            ),
            ParseErrorKind::InvalidCharacter { .. } => {
                format!("Error: unexpected input in \"{}\"", line_prefix(err, source))
            }
        };
        if source.trim_end().lines().count() > 1 {
            text.push_str(&format!(" (line {})", err.line));
        }
        self.console.println(&text);
    }
}

/// The offending line up to and including the offending token.
fn line_prefix<'a>(err: &ParseError, source: &'a str) -> &'a str {
    let start = (err.span.start as usize).min(source.len());
    let line_start = start.saturating_sub(err.column);
    let line_end = source
        .get(line_start..)
        .and_then(|rest| rest.find('\n'))
        .map_or(source.len(), |offset| line_start + offset);
    let end = (err.span.end as usize).clamp(start, line_end.max(start));
    source.get(line_start..end).unwrap_or_default()
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "panic during evaluation"
    }
}
