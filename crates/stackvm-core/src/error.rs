//! VM Error Types
//!
//! Defines every fault the interpreter can surface to its caller.
//! All faults are terminal for the run that produced them.

use std::io;

use thiserror::Error;

use crate::bytecode::Word;
use crate::vm::vm::VmState;

#[derive(Debug, Error)]
pub enum VmError {
    // Stack errors
    #[error("stack underflow")]
    StackUnderflow,

    // Instruction stream errors
    #[error("program counter {pc} is out of bounds (program length {len})")]
    OutOfBounds { pc: usize, len: usize },

    #[error("invalid opcode {word} at address {address:04}")]
    InvalidOpcode { word: Word, address: usize },

    #[error("invalid jump target: {0}")]
    InvalidJumpTarget(Word),

    // Runtime limits
    #[error("step limit of {0} exceeded")]
    StepLimitExceeded(u64),

    #[error("machine is not ready (state: {0:?})")]
    NotReady(VmState),

    // IO boundary
    #[error("output error: {0}")]
    Io(#[from] io::Error),
}

pub type VmResult<T> = Result<T, VmError>;
