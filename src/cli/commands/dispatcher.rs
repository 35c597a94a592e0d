//! Command dispatching.
//!
//! Subcommands implement [`Command`] and report a [`CommandResult`]; the
//! [`CommandDispatcher`] owns the resolved configuration and routes to them.

use crate::cli::args::{Cli, Commands};
use crate::config::Config;
use crate::error::Result;
use crate::ui::ConsoleReporter;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command, printing through `console`.
    fn execute(&self, console: &ConsoleReporter) -> Result<CommandResult>;
}

/// Result of command execution. Errors are reported separately, as `Err`.
#[derive(Debug)]
pub struct CommandResult {
    /// Process exit code.
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success() -> Self {
        Self { exit_code: 0 }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    config: Config,
}

impl CommandDispatcher {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Route the CLI subcommand to its implementation and execute it.
    pub fn dispatch(&self, cli: &Cli, console: &ConsoleReporter) -> Result<CommandResult> {
        match &cli.command {
            Commands::Run(args) => {
                super::run::RunCommand::new(&self.config, args.clone()).execute(console)
            }
            Commands::Assess(args) => {
                super::assess::AssessCommand::new(&self.config, args.clone()).execute(console)
            }
            Commands::Status(args) => {
                super::status::StatusCommand::new(&self.config, args.clone()).execute(console)
            }
        }
    }
}
