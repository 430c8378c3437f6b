pub mod host;
pub mod stack;
pub mod vm;

pub use host::{CaptureHost, Host, StdioHost, TraceLine, WriterHost};
pub use stack::Stack;
pub use vm::{run, run_with_host, VirtualMachine, VmState};
