//! CMM lexer.
//!
//! Tokenizes CMM source into a flat token stream terminated by `Eof`.
//! Whitespace and `/* … */` comments (non-nesting: the first `*/` closes
//! the comment that opened it) are skipped; line numbers advance on every
//! `\n`, including inside comments.
//!
//! Identifiers are alpha-only (no digits, no underscore) — frozen by
//! design, not an oversight; see the module-level discussion in
//! `SPEC_FULL.md` §4.1.
//!
//! Unlike a typical diagnostics-accumulating lexer, CMM has no error
//! recovery: the first invalid character aborts the whole pass.

pub mod cursor;
pub mod token;

#[cfg(test)]
mod tests;

use crate::error::{CmmError, Result};
use cursor::Cursor;
use token::{Token, TokenKind};

pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut cursor = Cursor::new(source);
    let mut tokens = Vec::new();

    loop {
        skip_whitespace_and_comments(&mut cursor)?;

        let line = cursor.line();
        let Some(ch) = cursor.peek() else {
            tokens.push(Token { kind: TokenKind::Eof, line });
            break;
        };

        let kind = match ch {
            c if c.is_ascii_alphabetic() => lex_id(&mut cursor),
            c if c.is_ascii_digit() => lex_number(&mut cursor),
            '+' => single(&mut cursor, TokenKind::Plus),
            '-' => single(&mut cursor, TokenKind::Minus),
            '*' => single(&mut cursor, TokenKind::Star),
            '/' => single(&mut cursor, TokenKind::Slash),
            ';' => single(&mut cursor, TokenKind::Semi),
            ',' => single(&mut cursor, TokenKind::Comma),
            '(' => single(&mut cursor, TokenKind::LParen),
            ')' => single(&mut cursor, TokenKind::RParen),
            '[' => single(&mut cursor, TokenKind::LBracket),
            ']' => single(&mut cursor, TokenKind::RBracket),
            '{' => single(&mut cursor, TokenKind::LBrace),
            '}' => single(&mut cursor, TokenKind::RBrace),
            '<' => two_char(&mut cursor, TokenKind::Lt, TokenKind::Le),
            '>' => two_char(&mut cursor, TokenKind::Gt, TokenKind::Ge),
            '=' => two_char(&mut cursor, TokenKind::Assign, TokenKind::Eq),
            '!' => {
                cursor.advance();
                if cursor.peek() == Some('=') {
                    cursor.advance();
                    TokenKind::Ne
                } else {
                    return Err(CmmError::InvalidChar { ch: '!', line });
                }
            }
            other => {
                cursor.advance();
                return Err(CmmError::InvalidChar { ch: other, line });
            }
        };

        tokens.push(Token { kind, line });
    }

    Ok(tokens)
}

/// `/` either opens a comment (`/*`) or is the division operator. Comments
/// are consumed here rather than treated as a token so the main loop never
/// sees them.
fn skip_whitespace_and_comments(cursor: &mut Cursor) -> Result<()> {
    loop {
        match cursor.peek() {
            Some(c) if c.is_whitespace() => {
                cursor.advance();
            }
            Some('/') if cursor.peek_at(1) == Some('*') => {
                cursor.advance();
                cursor.advance();
                skip_comment_body(cursor)?;
            }
            _ => return Ok(()),
        }
    }
}

fn skip_comment_body(cursor: &mut Cursor) -> Result<()> {
    loop {
        match cursor.peek() {
            None => return Ok(()), // unterminated comment silently ends at EOF
            Some('*') => {
                cursor.advance();
                // EndComment: '/' closes, '*' stays, anything else goes back to InComment.
                loop {
                    match cursor.peek() {
                        Some('/') => {
                            cursor.advance();
                            return Ok(());
                        }
                        Some('*') => {
                            cursor.advance();
                        }
                        _ => break,
                    }
                }
            }
            Some(_) => {
                cursor.advance();
            }
        }
    }
}

fn single(cursor: &mut Cursor, kind: TokenKind) -> TokenKind {
    cursor.advance();
    kind
}

/// Handles the `InLess`/`InGreater`/`InAssign` states: a bare symbol unless
/// immediately followed by `=`, in which case the two-char token wins.
fn two_char(cursor: &mut Cursor, one: TokenKind, two: TokenKind) -> TokenKind {
    cursor.advance();
    if cursor.peek() == Some('=') {
        cursor.advance();
        two
    } else {
        one
    }
}

fn lex_id(cursor: &mut Cursor) -> TokenKind {
    let mut word = String::new();
    while matches!(cursor.peek(), Some(c) if c.is_ascii_alphabetic()) {
        word.push(cursor.advance().unwrap());
    }
    TokenKind::keyword(&word).unwrap_or(TokenKind::Id(word))
}

fn lex_number(cursor: &mut Cursor) -> TokenKind {
    // Accumulate digit-by-digit in i32 arithmetic so a literal longer than
    // i32 can represent wraps the way the source language's own undefined
    // overflow behavior permits, rather than saturating to an unrelated value.
    let mut value: i32 = 0;
    while let Some(c) = cursor.peek().filter(|c| c.is_ascii_digit()) {
        cursor.advance();
        let digit = c.to_digit(10).unwrap() as i32;
        value = value.wrapping_mul(10).wrapping_add(digit);
    }
    TokenKind::Number(value)
}
