//! VM Configuration
//!
//! Defines per-run options for the interpreter.
//! Configuration specifies constraints only; enforcement is handled by the VM.

/// VM Configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmConfig {
    /// Hand a trace line to the host before every instruction
    pub trace: bool,

    /// Maximum number of instructions a run may execute (`None` = unbounded)
    pub max_steps: Option<u64>,
}

impl VmConfig {
    /// Create a new configuration with default options
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
}
