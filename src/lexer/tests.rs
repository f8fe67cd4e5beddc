use super::token::TokenKind::*;
use super::tokenize;
use crate::error::CmmError;

fn kinds(src: &str) -> Vec<super::token::TokenKind> {
    tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
}

#[test]
fn identifier_only() {
    assert_eq!(kinds("abc"), vec![Id("abc".into()), Eof]);
}

#[test]
fn keywords_vs_identifiers() {
    assert_eq!(
        kinds("int x void foo"),
        vec![KwInt, Id("x".into()), KwVoid, Id("foo".into()), Eof]
    );
}

#[test]
fn two_char_operators() {
    assert_eq!(kinds("<= >= == != < > ="), vec![Le, Ge, Eq, Ne, Lt, Gt, Assign, Eof]);
}

#[test]
fn non_nesting_comment_first_close_wins() {
    // "/* nested /* */ */" — the first "*/" closes the comment; the trailing
    // "*/" is then lexed as two stray tokens in source.
    let toks = kinds("/* nested /* */ */");
    // After the comment closes, "*/" remains: '*' then '/'.
    assert_eq!(toks, vec![Star, Slash, Eof]);
}

#[test]
fn newline_inside_comment_increments_line() {
    let toks = tokenize("/* line1\nline2 */ x").unwrap();
    let x = toks.iter().find(|t| matches!(t.kind, Id(_))).unwrap();
    assert_eq!(x.line, 2);
}

#[test]
fn invalid_char_is_fatal() {
    let err = tokenize("int x = 1 @ 2;").unwrap_err();
    assert!(matches!(err, CmmError::InvalidChar { ch: '@', .. }));
}

#[test]
fn bare_bang_is_lexical_error() {
    let err = tokenize("x ! y").unwrap_err();
    assert!(matches!(err, CmmError::InvalidChar { ch: '!', .. }));
}

#[test]
fn numbers_and_punctuation() {
    assert_eq!(
        kinds("a[3] = 10;"),
        vec![Id("a".into()), LBracket, Number(3), RBracket, Assign, Number(10), Semi, Eof]
    );
}
