//! The CMM instruction set: opcodes, the textual encoding the serializer
//! and the VM agree on, and the round-trip between the two.
//!
//! Every instruction is a `(Opcode, operand)` pair. Most opcodes ignore
//! their operand (it is written/read as `0`); the table in each `Opcode`'s
//! doc comment follows §6 of the instruction table exactly.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `AX ← N`
    Ldc,
    /// `AX ← SS[BP − AX]`
    Ld,
    /// `AX ← SS[AX]`
    Ald,
    /// `SS[BP − AX] ← SS.top()`
    St,
    /// `SS[AX] ← SS.top()`
    Ast,
    /// `SS.push(AX)`
    Push,
    /// `SS.pop()`
    Pop,
    /// `IP ← IP + N − 1`
    Jmp,
    /// if `AX == 0`: `IP ← IP + N − 1`
    Jz,
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    /// read a decimal integer from stdin into `AX`
    In,
    /// print `AX` as decimal followed by a newline
    Out,
    /// `AX ← |SS| − N`
    Addr,
    /// `SS.push(BP); BP ← |SS| − 2; SS.push(IP); IP ← IP + N − 1`
    Call,
    /// `IP ← SS.pop(); BP ← SS.pop()`
    Ret,
}

impl Opcode {
    /// Whether this opcode's textual form carries an operand.
    pub fn has_operand(self) -> bool {
        matches!(
            self,
            Opcode::Ldc | Opcode::Jmp | Opcode::Jz | Opcode::Addr | Opcode::Call
        )
    }

    fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Ldc => "LDC",
            Opcode::Ld => "LD",
            Opcode::Ald => "ALD",
            Opcode::St => "ST",
            Opcode::Ast => "AST",
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::Jmp => "JMP",
            Opcode::Jz => "JZ",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Lt => "LT",
            Opcode::Le => "LE",
            Opcode::Gt => "GT",
            Opcode::Ge => "GE",
            Opcode::Eq => "EQ",
            Opcode::Ne => "NE",
            Opcode::In => "IN",
            Opcode::Out => "OUT",
            Opcode::Addr => "ADDR",
            Opcode::Call => "CALL",
            Opcode::Ret => "RET",
        }
    }

    fn from_mnemonic(s: &str) -> Option<Opcode> {
        Some(match s {
            "LDC" => Opcode::Ldc,
            "LD" => Opcode::Ld,
            "ALD" => Opcode::Ald,
            "ST" => Opcode::St,
            "AST" => Opcode::Ast,
            "PUSH" => Opcode::Push,
            "POP" => Opcode::Pop,
            "JMP" => Opcode::Jmp,
            "JZ" => Opcode::Jz,
            "ADD" => Opcode::Add,
            "SUB" => Opcode::Sub,
            "MUL" => Opcode::Mul,
            "DIV" => Opcode::Div,
            "LT" => Opcode::Lt,
            "LE" => Opcode::Le,
            "GT" => Opcode::Gt,
            "GE" => Opcode::Ge,
            "EQ" => Opcode::Eq,
            "NE" => Opcode::Ne,
            "IN" => Opcode::In,
            "OUT" => Opcode::Out,
            "ADDR" => Opcode::Addr,
            "CALL" => Opcode::Call,
            "RET" => Opcode::Ret,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operand: i32,
}

impl Instruction {
    pub fn new(opcode: Opcode, operand: i32) -> Self {
        Self { opcode, operand }
    }

    /// Instructions that carry no operand are constructed with `operand: 0`
    /// by convention — the textual form omits it either way.
    pub fn bare(opcode: Opcode) -> Self {
        Self { opcode, operand: 0 }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.opcode.has_operand() {
            write!(f, "{} {}", self.opcode.mnemonic(), self.operand)
        } else {
            write!(f, "{}", self.opcode.mnemonic())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed instruction line: {0:?}")]
pub struct ParseInstructionError(pub String);

impl FromStr for Instruction {
    type Err = ParseInstructionError;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let mnemonic = parts
            .next()
            .ok_or_else(|| ParseInstructionError(line.to_string()))?;
        let opcode =
            Opcode::from_mnemonic(mnemonic).ok_or_else(|| ParseInstructionError(line.to_string()))?;

        let operand_tok = parts.next();
        if parts.next().is_some() {
            return Err(ParseInstructionError(line.to_string()));
        }

        let operand = match (opcode.has_operand(), operand_tok) {
            (true, Some(tok)) => tok
                .parse::<i32>()
                .map_err(|_| ParseInstructionError(line.to_string()))?,
            (false, None) => 0,
            _ => return Err(ParseInstructionError(line.to_string())),
        };

        Ok(Instruction { opcode, operand })
    }
}

/// Serialize a full instruction list to its one-instruction-per-line text form.
pub fn serialize(program: &[Instruction]) -> String {
    let mut out = String::new();
    for instr in program {
        out.push_str(&instr.to_string());
        out.push('\n');
    }
    out
}

/// Parse a textual instruction stream back into an instruction list.
pub fn deserialize(text: &str) -> std::result::Result<Vec<Instruction>, ParseInstructionError> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_bare_and_operand_forms() {
        let program = vec![
            Instruction::new(Opcode::Ldc, 42),
            Instruction::bare(Opcode::Push),
            Instruction::new(Opcode::Call, -3),
            Instruction::bare(Opcode::Ret),
        ];
        let text = serialize(&program);
        assert_eq!(text, "LDC 42\nPUSH\nCALL -3\nRET\n");
        let parsed = deserialize(&text).unwrap();
        assert_eq!(parsed, program);
    }

    #[test]
    fn rejects_garbage() {
        assert!(deserialize("NOTANOP\n").is_err());
        assert!(deserialize("LDC\n").is_err());
    }
}
