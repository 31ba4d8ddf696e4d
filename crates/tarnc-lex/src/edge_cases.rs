//! Edge case tests for tarnc-lex

use crate::{tokenize, Token};
use proptest::prelude::*;
use tarnc_util::Handler;

#[test]
fn test_edge_empty_input() {
    let handler = Handler::new();
    let tokens = tokenize("", &handler);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].0, Token::Eof);
    assert!(!handler.has_errors());
}

#[test]
fn test_edge_whitespace_only() {
    let handler = Handler::new();
    let tokens = tokenize("  \n\t  \n", &handler);
    assert_eq!(tokens[0].0, Token::Eof);
}

#[test]
fn test_edge_comment_only() {
    let handler = Handler::new();
    let tokens = tokenize("// nothing here\n# or here", &handler);
    assert_eq!(tokens[0].0, Token::Eof);
    assert!(!handler.has_errors());
}

#[test]
fn test_edge_illegal_character() {
    let handler = Handler::new();
    let tokens = tokenize("int @ x;", &handler);
    // '@' is reported and skipped; the rest lexes normally
    let kinds: Vec<_> = tokens.into_iter().map(|(t, _)| t).collect();
    assert_eq!(
        kinds,
        vec![
            Token::Int,
            Token::Ident("x".into()),
            Token::Semicolon,
            Token::Eof
        ]
    );
    assert_eq!(handler.error_count(), 1);
    assert_eq!(
        handler.diagnostics()[0].message,
        "illegal character ignored: @"
    );
}

#[test]
fn test_edge_lone_ampersand_is_illegal() {
    let handler = Handler::new();
    let tokens = tokenize("a & b", &handler);
    let kinds: Vec<_> = tokens.into_iter().map(|(t, _)| t).collect();
    assert_eq!(
        kinds,
        vec![
            Token::Ident("a".into()),
            Token::Ident("b".into()),
            Token::Eof
        ]
    );
    assert_eq!(handler.error_count(), 1);
}

#[test]
fn test_edge_unterminated_string() {
    let handler = Handler::new();
    let tokens = tokenize("print << \"oops\nint x;", &handler);
    assert_eq!(handler.error_count(), 1);
    assert_eq!(
        handler.diagnostics()[0].message,
        "unterminated string literal ignored"
    );
    // the literal is dropped; lexing resumes on the next line
    let kinds: Vec<_> = tokens.into_iter().map(|(t, _)| t).collect();
    assert_eq!(
        kinds,
        vec![
            Token::Print,
            Token::Write,
            Token::Int,
            Token::Ident("x".into()),
            Token::Semicolon,
            Token::Eof
        ]
    );
}

#[test]
fn test_edge_bad_escape() {
    let handler = Handler::new();
    let tokens = tokenize(r#""a\zb" ;"#, &handler);
    assert_eq!(handler.error_count(), 1);
    assert_eq!(
        handler.diagnostics()[0].message,
        "string literal with bad escaped character ignored"
    );
    let kinds: Vec<_> = tokens.into_iter().map(|(t, _)| t).collect();
    assert_eq!(kinds, vec![Token::Semicolon, Token::Eof]);
}

#[test]
fn test_edge_unterminated_with_bad_escape() {
    let handler = Handler::new();
    tokenize("\"a\\z\n", &handler);
    assert_eq!(
        handler.diagnostics()[0].message,
        "unterminated string literal with bad escaped character ignored"
    );
}

#[test]
fn test_edge_int_literal_overflow() {
    let handler = Handler::new();
    let tokens = tokenize("99999999999999999999", &handler);
    assert_eq!(tokens[0].0, Token::IntLit(i32::MAX));
    // a warning, not an error: compilation may proceed
    assert!(!handler.has_errors());
    assert_eq!(handler.warning_count(), 1);
    assert_eq!(
        handler.diagnostics()[0].message,
        "integer literal too large; using max value"
    );
}

#[test]
fn test_edge_eof_inside_string() {
    let handler = Handler::new();
    tokenize("\"never closed", &handler);
    assert_eq!(
        handler.diagnostics()[0].message,
        "unterminated string literal ignored"
    );
}

const RESERVED: &[&str] = &[
    "int", "bool", "void", "struct", "tru", "fls", "receive", "print", "if", "else", "while",
    "repeat", "return",
];

proptest! {
    #[test]
    fn prop_identifiers_lex_as_single_ident(name in "[a-z_][a-z0-9_]{0,12}") {
        prop_assume!(!RESERVED.contains(&name.as_str()));

        let handler = Handler::new();
        let tokens = tokenize(&name, &handler);
        prop_assert_eq!(tokens.len(), 2);
        prop_assert_eq!(&tokens[0].0, &Token::Ident(name.clone()));
        prop_assert!(!handler.has_errors());
    }

    #[test]
    fn prop_small_numbers_roundtrip(n in 0i32..1_000_000) {
        let handler = Handler::new();
        let tokens = tokenize(&n.to_string(), &handler);
        prop_assert_eq!(&tokens[0].0, &Token::IntLit(n));
    }

    #[test]
    fn prop_lexing_never_panics(source in "\\PC{0,64}") {
        let handler = Handler::new();
        let tokens = tokenize(&source, &handler);
        prop_assert_eq!(&tokens.last().unwrap().0, &Token::Eof);
    }
}
