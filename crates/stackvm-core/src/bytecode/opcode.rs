//! Bytecode Opcode Definitions
//!
//! Defines the opcode set and the static `(name, arity)` table.
//! This file contains no execution semantics.

use super::Word;

/// Bytecode opcodes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    Push  = 0,
    Add   = 1,
    Print = 2,
    Halt  = 3,
    JmpLt = 4,
    Sub   = 5,
}

/// Static description of an opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpInfo {
    pub opcode: OpCode,
    pub name: &'static str,
    /// Immediate operand words following the opcode
    pub arity: usize,
}

/// Opcode table, indexed by encoding.
pub static OPCODES: [OpInfo; 6] = [
    OpInfo { opcode: OpCode::Push,  name: "push",  arity: 1 },
    OpInfo { opcode: OpCode::Add,   name: "add",   arity: 0 },
    OpInfo { opcode: OpCode::Print, name: "print", arity: 0 },
    OpInfo { opcode: OpCode::Halt,  name: "halt",  arity: 0 },
    OpInfo { opcode: OpCode::JmpLt, name: "jmplt", arity: 2 },
    OpInfo { opcode: OpCode::Sub,   name: "sub",   arity: 0 },
];

impl OpCode {
    /// Convert an instruction word to an opcode
    pub fn from_word(word: Word) -> Option<Self> {
        usize::try_from(word)
            .ok()
            .and_then(|index| OPCODES.get(index))
            .map(|info| info.opcode)
    }

    pub fn info(self) -> &'static OpInfo {
        &OPCODES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn arity(self) -> usize {
        self.info().arity
    }

    /// Encoding of this opcode as an instruction word
    pub fn word(self) -> Word {
        self as Word
    }
}
