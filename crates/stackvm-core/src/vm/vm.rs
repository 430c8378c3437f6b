//! Virtual Machine Core
//!
//! Defines the virtual machine structure and its fetch-decode-execute loop.
//! Arithmetic is wrapping two's-complement on `Word`.

use tracing::{debug, trace};

use crate::bytecode::{decode_at, OpCode, Word};
use crate::config::VmConfig;
use crate::error::{VmError, VmResult};

use super::host::{Host, StdioHost, TraceLine};
use super::stack::Stack;

/// Execution state of a machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmState {
    /// Program counter valid, more instructions to run
    Ready,
    /// A HALT instruction executed
    Halted,
    /// An instruction failed; the run cannot be resumed
    Faulted,
}

/// Stack-based virtual machine
///
/// Borrows its instruction buffer for the duration of the run and owns the
/// evaluation stack and program counter exclusively.
#[derive(Debug)]
pub struct VirtualMachine<'a> {
    config: VmConfig,
    code: &'a [Word],
    stack: Stack,
    pc: usize,
    steps: u64,
    state: VmState,
}

impl<'a> VirtualMachine<'a> {
    /// Create a new VM instance, ready at address 0
    pub fn new(config: VmConfig, code: &'a [Word]) -> Self {
        VirtualMachine {
            config,
            code,
            stack: Stack::new(),
            pc: 0,
            steps: 0,
            state: VmState::Ready,
        }
    }

    /// Execute instructions until halt or fault
    pub fn execute<H: Host + ?Sized>(&mut self, host: &mut H) -> VmResult<()> {
        if self.state != VmState::Ready {
            return Err(VmError::NotReady(self.state));
        }

        debug!(len = self.code.len(), trace = self.config.trace, "run started");

        while self.state == VmState::Ready {
            if let Err(err) = self.step(host) {
                self.state = VmState::Faulted;
                debug!(pc = self.pc, steps = self.steps, error = %err, "run faulted");
                return Err(err);
            }
        }

        debug!(steps = self.steps, depth = self.stack.len(), "run halted");
        Ok(())
    }

    pub fn state(&self) -> VmState {
        self.state
    }

    /// Address of the next instruction to fetch
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Instructions executed so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn into_stack(self) -> Stack {
        self.stack
    }

    /// Execute a single instruction
    fn step<H: Host + ?Sized>(&mut self, host: &mut H) -> VmResult<()> {
        if let Some(limit) = self.config.max_steps {
            if self.steps >= limit {
                return Err(VmError::StepLimitExceeded(limit));
            }
        }

        if self.config.trace {
            if let Some(instruction) = decode_at(self.code, self.pc) {
                host.trace(&TraceLine {
                    instruction,
                    stack: self.stack.as_slice(),
                })?;
            }
        }

        // Fetch
        let address = self.pc;
        let word = self.read_word()?;
        let opcode = OpCode::from_word(word)
            .ok_or(VmError::InvalidOpcode { word, address })?;
        self.steps += 1;

        trace!(address, op = opcode.name(), "dispatch");

        // Decode / execute
        match opcode {
            OpCode::Push => {
                let value = self.read_word()?;
                self.stack.push(value);
            }

            // Right operand was pushed last
            OpCode::Add => {
                let right = self.stack.pop()?;
                let left = self.stack.pop()?;
                self.stack.push(left.wrapping_add(right));
            }
            OpCode::Sub => {
                let right = self.stack.pop()?;
                let left = self.stack.pop()?;
                self.stack.push(left.wrapping_sub(right));
            }

            OpCode::Print => {
                let value = self.stack.peek()?;
                host.print(value)?;
            }

            OpCode::JmpLt => {
                let threshold = self.read_word()?;
                let target = self.read_word()?;
                let value = self.stack.pop()?;
                if value < threshold {
                    self.pc = self.jump_target(target)?;
                }
            }

            OpCode::Halt => self.state = VmState::Halted,
        }

        Ok(())
    }

    /// Read the word at the program counter and advance past it
    fn read_word(&mut self) -> VmResult<Word> {
        let word = *self.code.get(self.pc).ok_or(VmError::OutOfBounds {
            pc: self.pc,
            len: self.code.len(),
        })?;
        self.pc += 1;
        Ok(word)
    }

    fn jump_target(&self, target: Word) -> VmResult<usize> {
        usize::try_from(target)
            .ok()
            .filter(|&addr| addr < self.code.len())
            .ok_or(VmError::InvalidJumpTarget(target))
    }
}

/// Run `code` to completion on a fresh machine, printing to stdout and
/// tracing to stderr. Returns the final stack, bottom to top.
pub fn run(code: &[Word], trace: bool) -> VmResult<Vec<Word>> {
    let config = VmConfig::new().with_trace(trace);
    run_with_host(code, config, &mut StdioHost::stdio())
}

/// Run `code` to completion on a fresh machine with the given host.
pub fn run_with_host<H: Host + ?Sized>(
    code: &[Word],
    config: VmConfig,
    host: &mut H,
) -> VmResult<Vec<Word>> {
    let mut vm = VirtualMachine::new(config, code);
    vm.execute(host)?;
    Ok(vm.into_stack().into_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::host::CaptureHost;
    use std::io;

    /// Host whose channels are closed
    struct BrokenPipeHost;

    impl Host for BrokenPipeHost {
        fn print(&mut self, _value: Word) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "output closed"))
        }

        fn trace(&mut self, _line: &TraceLine<'_>) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "diagnostics closed"))
        }
    }

    const PUSH: Word = OpCode::Push as Word;
    const ADD: Word = OpCode::Add as Word;
    const PRINT: Word = OpCode::Print as Word;
    const HALT: Word = OpCode::Halt as Word;
    const JMPLT: Word = OpCode::JmpLt as Word;
    const SUB: Word = OpCode::Sub as Word;

    #[test]
    fn halts_and_reports_state() {
        let code = [PUSH, 2, PUSH, 3, ADD, PRINT, HALT];
        let mut host = CaptureHost::new();
        let mut vm = VirtualMachine::new(VmConfig::new(), &code);
        vm.execute(&mut host).expect("execution failed");

        assert_eq!(vm.state(), VmState::Halted);
        assert_eq!(vm.pc(), code.len());
        assert_eq!(vm.steps(), 5);
        assert_eq!(vm.stack().as_slice(), &[5]);
        assert_eq!(host.printed, vec![5]);
    }

    #[test]
    fn fault_is_terminal() {
        let code = [ADD, HALT];
        let mut host = CaptureHost::new();
        let mut vm = VirtualMachine::new(VmConfig::new(), &code);

        assert!(matches!(vm.execute(&mut host), Err(VmError::StackUnderflow)));
        assert_eq!(vm.state(), VmState::Faulted);
        assert!(matches!(
            vm.execute(&mut host),
            Err(VmError::NotReady(VmState::Faulted))
        ));
    }

    #[test]
    fn halted_machine_does_not_rerun() {
        let code = [PUSH, 1, PRINT, HALT];
        let mut host = CaptureHost::new();
        let mut vm = VirtualMachine::new(VmConfig::new(), &code);
        vm.execute(&mut host).unwrap();

        assert!(matches!(
            vm.execute(&mut host),
            Err(VmError::NotReady(VmState::Halted))
        ));
        assert_eq!(host.printed, vec![1]);
    }

    #[test]
    fn arithmetic_wraps() {
        let code = [PUSH, Word::MAX, PUSH, 1, ADD, PUSH, 1, SUB, HALT];
        let stack = run_with_host(&code, VmConfig::new(), &mut CaptureHost::new()).unwrap();
        assert_eq!(stack, vec![Word::MAX]);
    }

    #[test]
    fn missing_push_operand_is_out_of_bounds() {
        let code = [PUSH];
        let err = run_with_host(&code, VmConfig::new(), &mut CaptureHost::new()).unwrap_err();
        assert!(matches!(err, VmError::OutOfBounds { pc: 1, len: 1 }));
    }

    #[test]
    fn jmplt_branches_when_less() {
        let code = [
            PUSH, 1,          // 0
            JMPLT, 5, 8,      // 2
            PUSH, 100,        // 5
            PRINT,            // 7
            PUSH, 7,          // 8
            PRINT,            // 10
            HALT,             // 11
        ];
        let mut host = CaptureHost::new();
        let stack = run_with_host(&code, VmConfig::new(), &mut host).unwrap();
        assert_eq!(host.printed, vec![7]);
        assert_eq!(stack, vec![7]);
    }

    #[test]
    fn jmplt_falls_through_when_not_less() {
        let code = [PUSH, 5, JMPLT, 5, 0, PUSH, 9, HALT];
        let stack = run_with_host(&code, VmConfig::new(), &mut CaptureHost::new()).unwrap();
        assert_eq!(stack, vec![9]);
    }

    #[test]
    fn jmplt_rejects_targets_outside_program() {
        let code = [PUSH, 0, JMPLT, 1, 99, HALT];
        let err = run_with_host(&code, VmConfig::new(), &mut CaptureHost::new()).unwrap_err();
        assert!(matches!(err, VmError::InvalidJumpTarget(99)));

        let code = [PUSH, 0, JMPLT, 1, -1, HALT];
        let err = run_with_host(&code, VmConfig::new(), &mut CaptureHost::new()).unwrap_err();
        assert!(matches!(err, VmError::InvalidJumpTarget(-1)));
    }

    #[test]
    fn step_budget_stops_infinite_loop() {
        // jumps back to 0 forever
        let code = [PUSH, 0, JMPLT, 1, 0];
        let config = VmConfig::new().with_max_steps(100);
        let mut vm = VirtualMachine::new(config, &code);
        let err = vm.execute(&mut CaptureHost::new()).unwrap_err();

        assert!(matches!(err, VmError::StepLimitExceeded(100)));
        assert_eq!(vm.steps(), 100);
        assert_eq!(vm.state(), VmState::Faulted);
    }

    #[test]
    fn step_budget_allows_exact_fit() {
        let code = [PUSH, 1, HALT];
        let config = VmConfig::new().with_max_steps(2);
        assert!(run_with_host(&code, config, &mut CaptureHost::new()).is_ok());
    }

    #[test]
    fn trace_is_only_emitted_when_enabled() {
        let code = [PUSH, 2, HALT];

        let mut quiet = CaptureHost::new();
        run_with_host(&code, VmConfig::new(), &mut quiet).unwrap();
        assert!(quiet.trace.is_empty());

        let mut traced = CaptureHost::new();
        run_with_host(&code, VmConfig::new().with_trace(true), &mut traced).unwrap();
        assert_eq!(traced.trace, vec!["0000: push [2]\t[]", "0002: halt []\t[2]"]);
    }

    #[test]
    fn print_failure_faults_with_io() {
        let code = [PUSH, 1, PRINT, HALT];
        let mut vm = VirtualMachine::new(VmConfig::new(), &code);
        let err = vm.execute(&mut BrokenPipeHost).unwrap_err();

        assert!(matches!(err, VmError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
        assert_eq!(vm.state(), VmState::Faulted);
        assert_eq!(vm.stack().as_slice(), &[1]);
    }

    #[test]
    fn trace_failure_faults_before_fetch() {
        let code = [PUSH, 1, HALT];
        let mut vm = VirtualMachine::new(VmConfig::new().with_trace(true), &code);
        let err = vm.execute(&mut BrokenPipeHost).unwrap_err();

        assert!(matches!(err, VmError::Io(_)));
        assert_eq!(vm.state(), VmState::Faulted);
        assert_eq!(vm.pc(), 0);
        assert_eq!(vm.steps(), 0);
    }

    #[test]
    fn run_returns_final_stack() {
        let code = [PUSH, 4, PUSH, 6, ADD, HALT];
        assert_eq!(run(&code, false).unwrap(), vec![10]);
        assert!(matches!(run(&[SUB, HALT], false), Err(VmError::StackUnderflow)));
    }

    #[test]
    fn trace_covers_invalid_opcode_before_fault() {
        let code = [PUSH, 1, 77];
        let mut host = CaptureHost::new();
        let err = run_with_host(&code, VmConfig::new().with_trace(true), &mut host).unwrap_err();

        assert!(matches!(err, VmError::InvalidOpcode { word: 77, address: 2 }));
        assert_eq!(host.trace.last().map(String::as_str), Some("0002: ??? []\t[1]"));
    }
}
