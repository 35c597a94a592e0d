//! Status command implementation.
//!
//! The `prereqs status` command prints what the ledger records for an
//! installation.

use crate::cli::args::{installation_id, StatusArgs};
use crate::config::Config;
use crate::error::Result;
use crate::state::{InstallationId, LedgerStore};
use crate::ui::ConsoleReporter;

use super::dispatcher::{Command, CommandResult};

/// The status command implementation.
pub struct StatusCommand<'a> {
    config: &'a Config,
    args: StatusArgs,
}

impl<'a> StatusCommand<'a> {
    pub fn new(config: &'a Config, args: StatusArgs) -> Self {
        Self { config, args }
    }
}

impl Command for StatusCommand<'_> {
    fn execute(&self, console: &ConsoleReporter) -> Result<CommandResult> {
        let id = installation_id(&self.args.install_dir, self.args.id.as_deref())?;
        let store = LedgerStore::new(&self.config.resolved_state_dir(), InstallationId::new(id));
        let ledger = store.load()?;

        console.field("Installation:", store.id().as_str());
        console.field("Ledger:", &store.path().display().to_string());
        console.field(
            "Engine prerequisite:",
            if ledger.installed_ue4_prereq {
                "installed"
            } else {
                "not installed"
            },
        );

        let satisfied = ledger.satisfied();
        if satisfied.is_empty() {
            console.message("No prerequisites recorded");
        } else {
            console.message("Prerequisites:");
            for name in satisfied {
                console.message(&format!("  {}", name));
            }
        }

        Ok(CommandResult::success())
    }
}
