//! Rill parser.
//!
//! Turns source text into a sequence of top-level [`Expr`]s. This is the
//! narrow interface the evaluator consumes: [`parse`] in, syntax trees or a
//! [`ParseError`] out. The evaluator never looks at tokens.

mod error;
mod lexer;
mod parser;

pub use error::{ParseError, ParseErrorKind};
pub use lexer::{tokenize, Spanned, Token};

use rill_ir::{Expr, StringInterner};

/// Parse `source` into its top-level expressions.
///
/// Identifiers are interned into `interner`; the evaluator must use the same
/// interner to look them up.
pub fn parse(source: &str, interner: &StringInterner) -> Result<Vec<Expr>, ParseError> {
    let tokens = tokenize(source)?;
    parser::Parser::new(source, tokens, interner).parse_program()
}
