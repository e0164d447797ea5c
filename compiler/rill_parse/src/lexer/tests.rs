#![allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn kinds(source: &str) -> Vec<Token> {
    tokenize(source)
        .unwrap()
        .into_iter()
        .map(|s| s.token)
        .collect()
}

#[test]
fn assignment_and_call() {
    assert_eq!(
        kinds("x <- f(1L, 'a')"),
        vec![
            Token::Ident("x".into()),
            Token::LeftAssign,
            Token::Ident("f".into()),
            Token::LParen,
            Token::Int(1),
            Token::Comma,
            Token::Str("a".into()),
            Token::RParen,
            Token::Eof,
        ]
    );
}

#[test]
fn keywords_win_over_identifiers() {
    assert_eq!(
        kinds("function functional TRUE"),
        vec![
            Token::Function,
            Token::Ident("functional".into()),
            Token::True,
            Token::Eof,
        ]
    );
}

#[test]
fn dotted_identifiers() {
    assert_eq!(
        kinds("parent.frame()"),
        vec![
            Token::Ident("parent.frame".into()),
            Token::LParen,
            Token::RParen,
            Token::Eof,
        ]
    );
}

#[test]
fn comments_are_skipped_but_newlines_kept() {
    assert_eq!(
        kinds("1 # one\n2"),
        vec![
            Token::Double(1.0),
            Token::Newline,
            Token::Double(2.0),
            Token::Eof
        ]
    );
}

#[test]
fn super_assignment_is_one_token() {
    assert_eq!(
        kinds("a <<- 2"),
        vec![
            Token::Ident("a".into()),
            Token::SuperAssign,
            Token::Double(2.0),
            Token::Eof
        ]
    );
}

#[test]
fn string_escapes() {
    assert_eq!(
        kinds(r#""a\n\"b\"""#),
        vec![Token::Str("a\n\"b\"".into()), Token::Eof]
    );
}

#[test]
fn unterminated_string_is_incomplete() {
    let err = tokenize("x <- \"abc").unwrap_err();
    assert!(err.is_incomplete());
}

#[test]
fn stray_character_is_malformed() {
    let err = tokenize("x $ y").unwrap_err();
    assert!(!err.is_incomplete());
    assert_eq!(err.token_text(), "$");
}

proptest! {
    #[test]
    fn identifiers_roundtrip(name in "[a-z][a-z0-9._]{0,12}") {
        prop_assume!(!matches!(
            name.as_str(),
            "if" | "else" | "while" | "repeat" | "break" | "next" | "function"
        ));
        let tokens = kinds(&name);
        prop_assert_eq!(tokens, vec![Token::Ident(name.clone()), Token::Eof]);
    }

    #[test]
    fn integers_lex_as_doubles_or_ints(n in 0u32..1_000_000) {
        prop_assert_eq!(kinds(&n.to_string()), vec![Token::Double(f64::from(n)), Token::Eof]);
        prop_assert_eq!(kinds(&format!("{n}L")), vec![Token::Int(i64::from(n)), Token::Eof]);
    }
}
