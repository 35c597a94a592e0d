//! Command-line interface for prereqs.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{installation_id, AssessArgs, Cli, Commands, RunArgs, StatusArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
