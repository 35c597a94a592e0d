//! Run command implementation.
//!
//! The `prereqs run` command performs one prerequisite pass for a game
//! installation.

use crate::catalog::CatalogClient;
use crate::cli::args::{installation_id, RunArgs};
use crate::config::Config;
use crate::error::Result;
use crate::manifest::ManagedInstallation;
use crate::requirements::SystemProbe;
use crate::runner::{Orchestrator, PassOutcome};
use crate::shell::SystemRunner;
use crate::staging::SevenZipExtractor;
use crate::ui::ConsoleReporter;

use super::dispatcher::{Command, CommandResult};

/// The run command implementation.
pub struct RunCommand<'a> {
    config: &'a Config,
    args: RunArgs,
}

impl<'a> RunCommand<'a> {
    pub fn new(config: &'a Config, args: RunArgs) -> Self {
        Self { config, args }
    }
}

impl Command for RunCommand<'_> {
    fn execute(&self, console: &ConsoleReporter) -> Result<CommandResult> {
        let id = installation_id(&self.args.install_dir, self.args.id.as_deref())?;
        let installation = ManagedInstallation::from_dir(id, &self.args.install_dir)?
            .with_prereqs(self.args.prereqs.iter().cloned());

        let catalog = CatalogClient::new(&self.config.catalog_url, self.config.http_timeout())?;
        let host = SystemProbe::from_config(self.config);
        let extractor = SevenZipExtractor::new(&self.config.seven_zip);
        let runner = SystemRunner;

        let orchestrator =
            Orchestrator::new(self.config, &catalog, &host, &extractor, &runner, console);
        let report = orchestrator.run_pass(&installation)?;

        match report.outcome {
            PassOutcome::NothingPending => {
                console.message("No prerequisites pending");
            }
            PassOutcome::NothingRemaining => {
                console.message(&format!(
                    "All prerequisites already installed ({})",
                    report.already_satisfied.join(", ")
                ));
            }
            PassOutcome::Installed => {
                console.message(&format!(
                    "Installed {} prerequisite(s): {}",
                    report.installed.len(),
                    report.installed.join(", ")
                ));
            }
        }

        Ok(CommandResult::success())
    }
}
