//! Process execution with line-streamed output.

pub mod command;

pub use command::{
    execute_quiet, execute_streaming, CommandResult, Invocation, OutputLine, ProcessRunner,
    SystemRunner,
};
