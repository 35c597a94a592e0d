//! Assess command implementation.
//!
//! The `prereqs assess` command fetches descriptors and probes the host, then
//! prints a verdict per prerequisite. It never writes the ledger.

use crate::catalog::CatalogClient;
use crate::cli::args::AssessArgs;
use crate::config::Config;
use crate::error::Result;
use crate::manifest::{read_manifest, ManagedInstallation};
use crate::requirements::{Assessor, SystemProbe};
use crate::ui::ConsoleReporter;

use super::dispatcher::{Command, CommandResult};

/// The assess command implementation.
pub struct AssessCommand<'a> {
    config: &'a Config,
    args: AssessArgs,
}

impl<'a> AssessCommand<'a> {
    pub fn new(config: &'a Config, args: AssessArgs) -> Self {
        Self { config, args }
    }
}

impl Command for AssessCommand<'_> {
    fn execute(&self, console: &ConsoleReporter) -> Result<CommandResult> {
        let install_dir = &self.args.install_dir;
        let installation = ManagedInstallation::new(install_dir.to_string_lossy(), install_dir)
            .with_prereqs(read_manifest(install_dir)?.into_iter().map(|r| r.name))
            .with_prereqs(self.args.prereqs.iter().cloned());

        if installation.prereqs.is_empty() {
            console.message("No prerequisites declared");
            return Ok(CommandResult::success());
        }

        let catalog = CatalogClient::new(&self.config.catalog_url, self.config.http_timeout())?;
        let host = SystemProbe::from_config(self.config);

        for result in Assessor::new(&catalog, &host).assess_all(&installation.prereqs)? {
            let verdict = if result.already_satisfied {
                "installed"
            } else {
                "missing"
            };
            console.field(
                &format!("{}: {}", result.name(), verdict),
                &format!(
                    "({} {}, {})",
                    result.descriptor.full_name, result.descriptor.version, result.descriptor.arch
                ),
            );
        }

        Ok(CommandResult::success())
    }
}
