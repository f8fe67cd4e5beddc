//! Token types for CMM source.
//!
//! Identifiers and integer literals carry their lexeme; every other token
//! kind is a fixed symbol and needs no payload.

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Id(String),
    Number(i32),

    KwVoid,
    KwInt,
    KwIf,
    KwElse,
    KwWhile,
    KwReturn,

    Plus,
    Minus,
    Star,
    Slash,
    Semi,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    Assign,

    Eof,
}

impl TokenKind {
    /// The literal source text this token was lexed from, for diagnostics.
    pub fn lexeme(&self) -> String {
        match self {
            TokenKind::Id(s) => s.clone(),
            TokenKind::Number(n) => n.to_string(),
            TokenKind::KwVoid => "void".into(),
            TokenKind::KwInt => "int".into(),
            TokenKind::KwIf => "if".into(),
            TokenKind::KwElse => "else".into(),
            TokenKind::KwWhile => "while".into(),
            TokenKind::KwReturn => "return".into(),
            TokenKind::Plus => "+".into(),
            TokenKind::Minus => "-".into(),
            TokenKind::Star => "*".into(),
            TokenKind::Slash => "/".into(),
            TokenKind::Semi => ";".into(),
            TokenKind::Comma => ",".into(),
            TokenKind::LParen => "(".into(),
            TokenKind::RParen => ")".into(),
            TokenKind::LBracket => "[".into(),
            TokenKind::RBracket => "]".into(),
            TokenKind::LBrace => "{".into(),
            TokenKind::RBrace => "}".into(),
            TokenKind::Lt => "<".into(),
            TokenKind::Le => "<=".into(),
            TokenKind::Gt => ">".into(),
            TokenKind::Ge => ">=".into(),
            TokenKind::Eq => "==".into(),
            TokenKind::Ne => "!=".into(),
            TokenKind::Assign => "=".into(),
            TokenKind::Eof => "<eof>".into(),
        }
    }

    pub fn keyword(word: &str) -> Option<TokenKind> {
        Some(match word {
            "void" => TokenKind::KwVoid,
            "int" => TokenKind::KwInt,
            "if" => TokenKind::KwIf,
            "else" => TokenKind::KwElse,
            "while" => TokenKind::KwWhile,
            "return" => TokenKind::KwReturn,
            _ => return None,
        })
    }
}
