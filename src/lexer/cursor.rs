//! Byte-by-byte navigation through CMM source with line tracking.
//!
//! CMM source is restricted to identifiers, digits, and a fixed ASCII
//! punctuation/operator set, so the cursor walks a byte slice rather than
//! `Vec<char>` — `pos` doubles as the character index.

pub struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
        }
    }

    pub fn peek(&self) -> Option<char> {
        self.bytes.get(self.pos).map(|&b| b as char)
    }

    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.bytes.get(self.pos + offset).map(|&b| b as char)
    }

    /// Advance one byte, tracking the line counter on `\n`.
    pub fn advance(&mut self) -> Option<char> {
        let b = *self.bytes.get(self.pos)?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
        }
        Some(b as char)
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn line(&self) -> usize {
        self.line
    }
}
