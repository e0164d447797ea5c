//! Parse errors.

use rill_ir::Span;
use std::fmt;

/// What went wrong.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A token that cannot appear here.
    UnexpectedToken { text: String },
    /// Input ended in the middle of an expression.
    UnexpectedEof,
    /// Input the lexer does not recognize at all.
    InvalidCharacter { text: String },
}

/// A parse failure with its location.
///
/// The evaluator distinguishes two situations: genuinely malformed input,
/// which is reported and discarded, and input that is merely incomplete
/// ([`ParseError::is_incomplete`]), which an interactive front-end answers by
/// reading a continuation line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    /// 1-based line of the offending token.
    pub line: usize,
    /// 0-based column of the offending token.
    pub column: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, source: &str) -> Self {
        let (line, column) = span.line_col(source);
        ParseError {
            kind,
            span,
            line,
            column,
        }
    }

    /// True when parsing failed exactly at the end of input.
    pub fn is_incomplete(&self) -> bool {
        matches!(self.kind, ParseErrorKind::UnexpectedEof)
    }

    /// Text of the offending token as shown to users.
    pub fn token_text(&self) -> &str {
        match &self.kind {
            ParseErrorKind::UnexpectedToken { text } | ParseErrorKind::InvalidCharacter { text } => {
                text
            }
            ParseErrorKind::UnexpectedEof => "end of input",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParseErrorKind::UnexpectedToken { text } => {
                write!(f, "unexpected '{text}' at line {}", self.line)
            }
            ParseErrorKind::UnexpectedEof => write!(f, "unexpected end of input"),
            ParseErrorKind::InvalidCharacter { text } => {
                write!(f, "unexpected input '{text}' at line {}", self.line)
            }
        }
    }
}

impl std::error::Error for ParseError {}
