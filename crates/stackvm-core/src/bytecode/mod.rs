pub mod instruction;
pub mod opcode;

/// Instruction words and stack values share one signed integer type.
pub type Word = i64;

pub use instruction::{decode_at, disassemble, Instruction};
pub use opcode::{OpCode, OpInfo, OPCODES};
