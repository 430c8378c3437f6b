//! Bytecode Instruction Representation
//!
//! Decoded view of one instruction inside an instruction buffer.
//! This layer contains no execution semantics.

use std::fmt;

use super::opcode::OpCode;
use super::Word;

/// A single decoded instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    pub address: usize,
    /// Raw opcode word as it appears in the buffer
    pub word: Word,
    /// `None` when `word` is not a known opcode
    pub opcode: Option<OpCode>,
    /// Operand words, clamped to the end of the buffer
    pub operands: &'a [Word],
}

impl Instruction<'_> {
    pub fn name(&self) -> &'static str {
        self.opcode.map_or("???", OpCode::name)
    }

    /// True when the buffer ends before all declared operands
    pub fn is_truncated(&self) -> bool {
        self.opcode
            .is_some_and(|op| self.operands.len() < op.arity())
    }

    /// Number of buffer words this instruction spans
    pub fn width(&self) -> usize {
        1 + self.operands.len()
    }
}

impl fmt::Display for Instruction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opcode {
            Some(_) => f.write_str(self.name())?,
            None => write!(f, "??? ({})", self.word)?,
        }
        for operand in self.operands {
            write!(f, " {}", operand)?;
        }
        if self.is_truncated() {
            f.write_str(" <truncated>")?;
        }
        Ok(())
    }
}

/// Decode the instruction starting at `address`.
///
/// Returns `None` when `address` is past the end of `code`. Unknown opcode
/// words decode with no operands.
pub fn decode_at(code: &[Word], address: usize) -> Option<Instruction<'_>> {
    let word = *code.get(address)?;
    let opcode = OpCode::from_word(word);
    let arity = opcode.map_or(0, OpCode::arity);
    let start = address + 1;
    let end = (start + arity).min(code.len());

    Some(Instruction {
        address,
        word,
        opcode,
        operands: &code[start..end],
    })
}

/// Disassemble an instruction buffer, one instruction per line.
///
/// # Format
/// ```text
/// 0000  push 2
/// 0002  push 3
/// 0004  add
/// 0005  halt
/// ```
pub fn disassemble(code: &[Word]) -> String {
    let mut output = String::new();
    let mut address = 0;

    while let Some(instruction) = decode_at(code, address) {
        output.push_str(&format!("{:04}  {}\n", address, instruction));
        address += instruction.width();
    }

    output
}
