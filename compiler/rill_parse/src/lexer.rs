//! Tokenizer built on `logos`.
//!
//! Newlines are significant (they end statements), so only spaces, tabs and
//! carriage returns are skipped. Whether a newline actually ends anything is
//! decided by the parser, which knows if it is inside parentheses.

use logos::Logos;
use rill_ir::Span;

use crate::error::{ParseError, ParseErrorKind};

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
pub enum Token {
    #[regex(r"#[^\n]*", logos::skip)]
    Comment,

    #[token("\n")]
    Newline,

    // Keywords
    #[token("function")]
    Function,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("repeat")]
    Repeat,
    #[token("break")]
    Break,
    #[token("next")]
    Next,
    #[token("TRUE")]
    True,
    #[token("FALSE")]
    False,
    #[token("NULL")]
    Null,

    // Assignment
    #[token("<-")]
    LeftAssign,
    #[token("<<-")]
    SuperAssign,
    #[token("=")]
    Eq,

    // Comparison
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,

    // Arithmetic and logic
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("!")]
    Bang,
    #[token("&")]
    Amp,
    #[token("&&")]
    AmpAmp,
    #[token("|")]
    Pipe,
    #[token("||")]
    PipePipe,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,

    // Literals
    #[regex(r"[0-9]+L", |lex| {
        let s = lex.slice();
        s[..s.len() - 1].parse::<i64>().ok()
    })]
    Int(i64),

    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Double(f64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    #[regex(r"'([^'\\]|\\.)*'", |lex| unescape(lex.slice()))]
    Str(String),

    #[regex(r"[a-zA-Z.][a-zA-Z0-9._]*", |lex| lex.slice().to_string())]
    Ident(String),

    /// Synthesized after the last real token.
    Eof,
}

impl Token {
    /// Human-readable text used in "unexpected ..." diagnostics.
    pub fn describe(&self, slice: &str) -> String {
        match self {
            Token::Eof => "end of input".to_string(),
            Token::Newline => "newline".to_string(),
            _ => slice.to_string(),
        }
    }
}

/// A token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: Span,
}

/// Strip the surrounding quotes and resolve escapes.
fn unescape(quoted: &str) -> Option<String> {
    let inner = quoted.get(1..quoted.len().checked_sub(1)?)?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            other => out.push(other),
        }
    }
    Some(out)
}

/// Tokenize `source`, appending a trailing [`Token::Eof`].
///
/// An unterminated string literal is reported as end-of-input so interactive
/// front-ends can ask for a continuation line.
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        match result {
            Ok(token) => tokens.push(Spanned {
                token,
                span: Span::from_range(range),
            }),
            Err(()) => {
                let text = &source[range.clone()];
                let span = Span::from_range(range.clone());
                let opens_string = text.starts_with('"') || text.starts_with('\'');
                let kind = if opens_string && unterminated_string(&source[range.start..]) {
                    ParseErrorKind::UnexpectedEof
                } else {
                    ParseErrorKind::InvalidCharacter {
                        text: text.to_string(),
                    }
                };
                return Err(ParseError::new(kind, span, source));
            }
        }
    }

    let end = Span::from_range(source.len()..source.len());
    tokens.push(Spanned {
        token: Token::Eof,
        span: end,
    });
    Ok(tokens)
}

/// True when the string literal starting at `rest` never closes.
fn unterminated_string(rest: &str) -> bool {
    let mut chars = rest.chars();
    let Some(quote) = chars.next() else {
        return false;
    };
    let mut escaped = false;
    for c in chars {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests;
