//! stackvm - Core Library
//!
//! A stack-based bytecode interpreter. Programs are flat `Word` buffers of
//! `(opcode, operand...)` tuples executed against a single evaluation stack.

pub mod error;
pub mod config;
pub mod bytecode;
pub mod vm;

// Re-export commonly used types
pub use error::{VmError, VmResult};
pub use config::VmConfig;
pub use bytecode::{OpCode, Word};
pub use vm::{run, run_with_host, CaptureHost, Host, StdioHost, VirtualMachine, VmState};
