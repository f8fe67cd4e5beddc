//! Diagnostic types shared across every pipeline stage.
//!
//! CMM's error model is deliberately thin: the language specifies exactly
//! two fatal conditions (an unrecognized character, a token that does not
//! match the current production) and no recovery. `CmmError`'s `Display`
//! impl produces the exact diagnostic text a conforming implementation must
//! emit; nothing downstream should reformat it.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CmmError {
    #[error("Invalid char: {ch} in line: {line}")]
    InvalidChar { ch: char, line: usize },

    #[error("Invalid token: {lexeme} in line {line}")]
    InvalidToken { lexeme: String, line: usize },
}

pub type Result<T> = std::result::Result<T, CmmError>;
