//! Disasm command - list instructions

use anyhow::Result;
use stackvm_core::bytecode::disassemble;
use stackvm_core::Word;

pub fn run(words: &[Word]) -> Result<()> {
    print!("{}", disassemble(words));
    Ok(())
}
