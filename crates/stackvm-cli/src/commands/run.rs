//! Run command - execute instruction buffers

use anyhow::{Context, Result};
use stackvm_core::{run_with_host, OpCode, StdioHost, VmConfig, Word};
use tracing::info;

/// Sample program: prints 5, then 3.
pub fn sample_program() -> Vec<Word> {
    vec![
        OpCode::Push.word(), 2,
        OpCode::Push.word(), 3,
        OpCode::Add.word(),
        OpCode::Print.word(),
        OpCode::Push.word(), 2,
        OpCode::Sub.word(),
        OpCode::Print.word(),
        OpCode::Halt.word(),
    ]
}

/// Execute `words` with stdout/stderr as the host
pub fn run(words: &[Word], trace: bool, max_steps: Option<u64>) -> Result<()> {
    let mut config = VmConfig::new().with_trace(trace);
    config.max_steps = max_steps;

    let stack = run_with_host(words, config, &mut StdioHost::stdio())
        .context("program faulted")?;

    info!(depth = stack.len(), "program halted");
    Ok(())
}

pub fn demo(trace: bool) -> Result<()> {
    run(&sample_program(), trace, None)
}
