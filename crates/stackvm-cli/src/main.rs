//! stackvm - CLI
//!
//! Command-line interface to execute instruction buffers given as words.

use anyhow::Result;
use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};
use stackvm_core::Word;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

/// Stack-based bytecode interpreter.
///
/// Programs are given as a flat list of integer words: each opcode is
/// followed by its operand words.
///
/// OPCODES:
///     0 push <v>    1 add    2 print    3 halt    4 jmplt <t> <addr>    5 sub
///
/// EXAMPLES:
///     stackvm run 0 2 0 3 1 2 3        Print 5
///     stackvm run --trace 0 7 2 3      Trace each step to stderr
///     stackvm disasm 0 2 0 3 1 2 3     List instructions
///     stackvm demo                     Run the built-in sample program
///
/// ENVIRONMENT VARIABLES:
///     STACKVM_TRACE      Set to 1/true/yes/on to trace by default
///     STACKVM_MAX_STEPS  Default step budget for `run`
///     RUST_LOG           Log filter (default: warn)
#[derive(Parser)]
#[command(name = "stackvm")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute an instruction buffer
    ///
    /// PRINT values go to stdout; trace lines go to stderr. Exits non-zero
    /// when the program faults.
    #[command(visible_alias = "r")]
    Run {
        /// Instruction words
        #[arg(required = true, allow_negative_numbers = true)]
        words: Vec<Word>,
        /// Print a trace line before each instruction
        #[arg(long, short = 't', env = "STACKVM_TRACE", value_parser = BoolishValueParser::new())]
        trace: bool,
        /// Fault after executing this many instructions
        #[arg(long, env = "STACKVM_MAX_STEPS")]
        max_steps: Option<u64>,
    },

    /// Run the built-in sample program (traced unless --no-trace)
    Demo {
        /// Disable the per-step trace
        #[arg(long)]
        no_trace: bool,
    },

    /// Print a listing of an instruction buffer
    #[command(visible_alias = "d")]
    Disasm {
        /// Instruction words
        #[arg(required = true, allow_negative_numbers = true)]
        words: Vec<Word>,
    },
}

/// Initialize logging, honouring `RUST_LOG` and defaulting to `warn`.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            words,
            trace,
            max_steps,
        } => commands::run::run(&words, trace, max_steps),
        Commands::Demo { no_trace } => commands::run::demo(!no_trace),
        Commands::Disasm { words } => commands::disasm::run(&words),
    }
}
