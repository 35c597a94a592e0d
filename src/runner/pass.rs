//! Prerequisite pass orchestration.
//!
//! A pass brings one managed installation up to date:
//!
//! 1. Run the bundled engine prerequisite installer if not done yet
//!    (best effort, failures are logged).
//! 2. Work out which declared prerequisites the ledger has not recorded.
//! 3. Assess them against the catalog and the host.
//! 4. Record the ones already present before downloading anything.
//! 5. Stage the rest concurrently, then install them one at a time in
//!    declaration order, recording each success as soon as it happens.
//!
//! The first failure ends the pass. The scratch workspace is removed on
//! every exit path.

use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::CatalogClient;
use crate::config::Config;
use crate::error::Result;
use crate::manifest::ManagedInstallation;
use crate::requirements::{partition, AssessmentResult, Assessor, HostProbe, InstallerRunner};
use crate::shell::ProcessRunner;
use crate::staging::{Extractor, ScratchWorkspace, Stager};
use crate::state::{InstallationId, LedgerStore};
use crate::ui::{Reporter, StatusEvent};

use super::engine::EngineHandler;

/// How a pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The ledger already covered every declared prerequisite.
    NothingPending,
    /// Everything pending turned out to be present on the host.
    NothingRemaining,
    /// At least one prerequisite was installed.
    Installed,
}

/// Summary of a successful pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub outcome: PassOutcome,
    /// Found present on the host and recorded without installing.
    pub already_satisfied: Vec<String>,
    /// Installed during this pass, in installation order.
    pub installed: Vec<String>,
}

impl PassReport {
    fn new(outcome: PassOutcome) -> Self {
        Self {
            outcome,
            already_satisfied: Vec::new(),
            installed: Vec::new(),
        }
    }
}

/// Drives prerequisite passes.
pub struct Orchestrator<'a> {
    catalog: &'a CatalogClient,
    host: &'a dyn HostProbe,
    extractor: &'a dyn Extractor,
    runner: &'a dyn ProcessRunner,
    reporter: &'a dyn Reporter,
    state_dir: PathBuf,
    elevate_helper: String,
    installer_timeout: Option<Duration>,
    scratch_root: Option<PathBuf>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &Config,
        catalog: &'a CatalogClient,
        host: &'a dyn HostProbe,
        extractor: &'a dyn Extractor,
        runner: &'a dyn ProcessRunner,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            catalog,
            host,
            extractor,
            runner,
            reporter,
            state_dir: config.resolved_state_dir(),
            elevate_helper: config.elevate_helper.clone(),
            installer_timeout: config.installer_timeout(),
            scratch_root: None,
        }
    }

    /// Create scratch workspaces inside `dir` instead of the system temp
    /// directory.
    pub fn with_scratch_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(dir.into());
        self
    }

    /// Ledger store for an installation.
    pub fn ledger(&self, installation_id: &str) -> LedgerStore {
        LedgerStore::new(&self.state_dir, InstallationId::new(installation_id))
    }

    /// Run one pass for `installation`.
    ///
    /// # Errors
    ///
    /// - `LedgerBusy` if another pass for the same installation is running
    /// - `Remote`, `Integrity`, `Extraction` or `Installer` from the first
    ///   prerequisite that fails; later prerequisites are not attempted
    pub fn run_pass(&self, installation: &ManagedInstallation) -> Result<PassReport> {
        let ledger = self.ledger(&installation.id);
        let _lock = ledger.lock()?;

        self.check_engine(installation, &ledger);

        let pending = ledger.pending(&installation.prereqs)?;
        if pending.is_empty() {
            tracing::info!("No prerequisites pending for {}", installation.id);
            return Ok(PassReport::new(PassOutcome::NothingPending));
        }

        self.reporter.status(&StatusEvent::Assessing {
            names: pending.iter().map(|r| r.name.clone()).collect(),
        });
        let assessments = Assessor::new(self.catalog, self.host).assess_all(&pending)?;
        let (satisfied, remaining) = partition(assessments);

        let mut report = PassReport::new(PassOutcome::NothingRemaining);
        if !satisfied.is_empty() {
            for assessment in &satisfied {
                self.reporter.status(&StatusEvent::AlreadyInstalled {
                    name: assessment.descriptor.full_name.clone(),
                });
            }
            report.already_satisfied = satisfied.iter().map(|a| a.name().to_string()).collect();
            ledger.record_satisfied(report.already_satisfied.iter().cloned())?;
        }

        if remaining.is_empty() {
            tracing::info!("All pending prerequisites were already installed");
            return Ok(report);
        }

        let workspace = self.workspace()?;
        report.installed = self.install(&remaining, &workspace, &ledger)?;
        report.outcome = PassOutcome::Installed;

        if let Err(e) = workspace.close() {
            tracing::warn!("Could not remove scratch workspace: {}", e);
        }
        Ok(report)
    }

    fn check_engine(&self, installation: &ManagedInstallation, ledger: &LedgerStore) {
        match ledger.is_engine_handled() {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!("Skipping engine prerequisite check: {}", e);
                return;
            }
        }

        let handler =
            EngineHandler::new(self.runner, self.reporter).with_timeout(self.installer_timeout);
        if let Err(e) = handler.handle(installation, ledger) {
            tracing::warn!("{}", e);
        }
    }

    fn workspace(&self) -> Result<ScratchWorkspace> {
        match &self.scratch_root {
            Some(root) => ScratchWorkspace::new_in(root),
            None => ScratchWorkspace::new(),
        }
    }

    fn install(
        &self,
        remaining: &[AssessmentResult],
        workspace: &ScratchWorkspace,
        ledger: &LedgerStore,
    ) -> Result<Vec<String>> {
        let staged = Stager::new(self.catalog, self.extractor, self.reporter)
            .stage_all(remaining, workspace)?;

        let installer = InstallerRunner::new(self.runner, self.reporter, &self.elevate_helper)
            .with_timeout(self.installer_timeout);

        let mut installed = Vec::with_capacity(remaining.len());
        for (assessment, dir) in remaining.iter().zip(&staged) {
            installer.install(assessment.name(), &assessment.descriptor, dir)?;
            ledger.record_satisfied([assessment.name()])?;
            self.reporter.status(&StatusEvent::Installed {
                name: assessment.descriptor.full_name.clone(),
            });
            installed.push(assessment.name().to_string());
        }
        Ok(installed)
    }
}
