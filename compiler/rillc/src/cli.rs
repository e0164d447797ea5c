//! Argument parsing for `rill`.

use std::fmt;
use std::path::PathBuf;

use rill_eval::{EngineBuilder, EngineConfig};

pub const USAGE: &str = "\
Usage: rill [options] <file.R>
       rill [options] -e <expr> [-e <expr> ...]

Options:
  -e <expr>            Evaluate <expr>; may be repeated
  --crash-on-fatal     Exit with status 2 on an internal error
  --pic-depth=<n>      Entries per eval/promise inline cache (default 4)
  --max-depth=<n>      Frame stack limit (default 5000)
  --perf-warnings      Warn on slow caller-frame access
  -h, --help           Show this help message
  --version            Show version information";

/// What the command line asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invocation {
    Help,
    Version,
    Run(RunOptions),
}

/// Where the program text comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    /// `-e` expressions, one statement per line.
    Expressions(Vec<String>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub source: Source,
    pub config: EngineConfig,
}

impl RunOptions {
    /// An engine builder carrying these options.
    pub fn engine_builder(&self) -> EngineBuilder {
        EngineBuilder::new().config(self.config.clone())
    }

    /// Name of the source used in logs.
    pub fn description(&self) -> String {
        match &self.source {
            Source::File(path) => path.display().to_string(),
            Source::Expressions(_) => "<command line>".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CliError {
    UnknownOption(String),
    MissingValue(&'static str),
    InvalidNumber { option: &'static str, value: String },
    NoSource,
    ConflictingSources,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::UnknownOption(option) => write!(f, "unknown option '{option}'"),
            CliError::MissingValue(option) => write!(f, "{option} needs a value"),
            CliError::InvalidNumber { option, value } => {
                write!(f, "{option} expects a non-negative integer, got '{value}'")
            }
            CliError::NoSource => write!(f, "no file or -e expression given"),
            CliError::ConflictingSources => {
                write!(f, "give either a file or -e expressions, not both")
            }
        }
    }
}

impl std::error::Error for CliError {}

/// Parse arguments, not including the program name.
pub fn parse_args(args: &[String]) -> Result<Invocation, CliError> {
    let mut config = EngineConfig::default();
    let mut file: Option<PathBuf> = None;
    let mut exprs = Vec::new();

    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Invocation::Help),
            "--version" => return Ok(Invocation::Version),
            "-e" => {
                let expr = args.next().ok_or(CliError::MissingValue("-e"))?;
                exprs.push(expr.clone());
            }
            "--crash-on-fatal" => config.crash_on_fatal_error = true,
            "--perf-warnings" => config.performance_warnings = true,
            other => {
                if let Some(value) = other.strip_prefix("--pic-depth=") {
                    config.max_pic_depth = parse_count("--pic-depth", value)?;
                } else if let Some(value) = other.strip_prefix("--max-depth=") {
                    config.max_depth = parse_count("--max-depth", value)?;
                } else if other.starts_with('-') {
                    return Err(CliError::UnknownOption(other.to_string()));
                } else if file.is_none() {
                    file = Some(PathBuf::from(other));
                } else {
                    return Err(CliError::ConflictingSources);
                }
            }
        }
    }

    let source = match (file, exprs.is_empty()) {
        (Some(_), false) => return Err(CliError::ConflictingSources),
        (Some(path), true) => Source::File(path),
        (None, false) => Source::Expressions(exprs),
        (None, true) => return Err(CliError::NoSource),
    };
    Ok(Invocation::Run(RunOptions { source, config }))
}

fn parse_count(option: &'static str, value: &str) -> Result<usize, CliError> {
    value.parse().map_err(|_| CliError::InvalidNumber {
        option,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests;
