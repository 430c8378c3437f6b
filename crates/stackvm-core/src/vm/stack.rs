//! VM Stack Implementation
//!
//! Evaluation stack for VM execution.
//! No execution semantics.

use crate::bytecode::Word;
use crate::error::{VmError, VmResult};

/// VM evaluation stack
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack {
    values: Vec<Word>,
}

impl Stack {
    /// Create an empty stack
    pub fn new() -> Self {
        Stack { values: Vec::new() }
    }

    /// Push value onto stack
    pub fn push(&mut self, value: Word) {
        self.values.push(value);
    }

    /// Pop value from stack
    pub fn pop(&mut self) -> VmResult<Word> {
        self.values.pop().ok_or(VmError::StackUnderflow)
    }

    /// Peek at top of stack without removing
    pub fn peek(&self) -> VmResult<Word> {
        self.values.last().copied().ok_or(VmError::StackUnderflow)
    }

    /// Get current stack size
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if stack is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Contents from bottom to top
    pub fn as_slice(&self) -> &[Word] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<Word> {
        self.values
    }
}
