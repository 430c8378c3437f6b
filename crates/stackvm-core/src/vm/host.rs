//! VM Host Boundary
//!
//! The host receives everything a run emits: PRINT values on the output
//! channel and, when tracing is enabled, one trace line per instruction on
//! the diagnostic channel. The VM never writes to stdout or stderr itself.

use std::fmt;
use std::io::{self, Write};

use crate::bytecode::{Instruction, Word};

/// Snapshot of the machine taken before an instruction executes
#[derive(Debug, Clone, Copy)]
pub struct TraceLine<'a> {
    pub instruction: Instruction<'a>,
    /// Stack contents, bottom to top
    pub stack: &'a [Word],
}

impl fmt::Display for TraceLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}: {} {:?}\t{:?}",
            self.instruction.address,
            self.instruction.name(),
            self.instruction.operands,
            self.stack
        )
    }
}

/// Output and diagnostic channels for a run
pub trait Host {
    /// Emit a value produced by PRINT
    fn print(&mut self, value: Word) -> io::Result<()>;

    /// Emit a trace line; only called when tracing is enabled
    fn trace(&mut self, line: &TraceLine<'_>) -> io::Result<()>;
}

/// Host writing PRINT values to one writer and trace lines to another
#[derive(Debug)]
pub struct WriterHost<O, D> {
    out: O,
    diag: D,
}

/// Host bound to the process's stdout and stderr
pub type StdioHost = WriterHost<io::Stdout, io::Stderr>;

impl<O: Write, D: Write> WriterHost<O, D> {
    pub fn new(out: O, diag: D) -> Self {
        WriterHost { out, diag }
    }

    pub fn into_inner(self) -> (O, D) {
        (self.out, self.diag)
    }
}

impl StdioHost {
    pub fn stdio() -> Self {
        WriterHost::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, D: Write> Host for WriterHost<O, D> {
    fn print(&mut self, value: Word) -> io::Result<()> {
        writeln!(self.out, "{}", value)
    }

    fn trace(&mut self, line: &TraceLine<'_>) -> io::Result<()> {
        writeln!(self.diag, "{}", line)
    }
}

/// Host that records everything in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureHost {
    pub printed: Vec<Word>,
    pub trace: Vec<String>,
}

impl CaptureHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Host for CaptureHost {
    fn print(&mut self, value: Word) -> io::Result<()> {
        self.printed.push(value);
        Ok(())
    }

    fn trace(&mut self, line: &TraceLine<'_>) -> io::Result<()> {
        self.trace.push(line.to_string());
        Ok(())
    }
}
