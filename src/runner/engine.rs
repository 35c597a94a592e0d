//! Engine prerequisite handling.
//!
//! Unreal Engine 4 games ship their own prerequisite installer
//! (`UE4PrereqSetup.exe` or `UE4PrereqSetup_x64.exe`). It is run once per
//! installation, before any catalog prerequisite, and the ledger remembers
//! that it succeeded.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use crate::error::{PrereqError, Result};
use crate::manifest::ManagedInstallation;
use crate::shell::{Invocation, ProcessRunner};
use crate::state::LedgerStore;
use crate::ui::{Reporter, StatusEvent};

/// Matches the bundled UE4 prerequisite installer.
static ENGINE_INSTALLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)UE4PrereqSetup(_x64)?\.exe").expect("ENGINE_INSTALLER must compile")
});

const ENGINE_INSTALLER_ARGS: [&str; 2] = ["/quiet", "/norestart"];

/// What the engine handler did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOutcome {
    /// The installation bundles no engine prerequisite installer.
    NotBundled,
    /// The bundled installer ran and exited with 0.
    Installed { path: PathBuf },
}

/// First executable that is a UE4 prerequisite installer.
pub fn find_engine_installer(executables: &[PathBuf]) -> Option<&Path> {
    executables
        .iter()
        .find(|exe| ENGINE_INSTALLER.is_match(&exe.to_string_lossy()))
        .map(PathBuf::as_path)
}

/// Runs the bundled engine prerequisite installer.
pub struct EngineHandler<'a> {
    runner: &'a dyn ProcessRunner,
    reporter: &'a dyn Reporter,
    timeout: Option<Duration>,
}

impl<'a> EngineHandler<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, reporter: &'a dyn Reporter) -> Self {
        Self {
            runner,
            reporter,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the engine installer if the installation bundles one.
    ///
    /// The ledger is marked only when the installer exits with 0.
    ///
    /// # Errors
    ///
    /// Every failure is an `EngineHandler` error.
    pub fn handle(
        &self,
        installation: &ManagedInstallation,
        ledger: &LedgerStore,
    ) -> Result<EngineOutcome> {
        let Some(relative) = find_engine_installer(&installation.executables) else {
            tracing::debug!("No engine prerequisite installer in {}", installation.id);
            return Ok(EngineOutcome::NotBundled);
        };

        let path = installation.install_dir.join(relative);
        self.reporter.status(&StatusEvent::EngineSetup {
            path: relative.display().to_string(),
        });

        let mut invocation = Invocation::new(path.to_string_lossy(), ENGINE_INSTALLER_ARGS)
            .with_timeout(self.timeout);
        if let Some(dir) = path.parent() {
            invocation = invocation.in_dir(dir);
        }
        tracing::info!("Running engine prerequisite installer {}", invocation.display());

        let result = self
            .runner
            .run(&invocation, &mut |line| self.reporter.output("ue4-prereq", &line))
            .map_err(|e| PrereqError::EngineHandler {
                message: e.to_string(),
            })?;

        if !result.success() {
            return Err(PrereqError::EngineHandler {
                message: match result.exit_code {
                    Some(code) => format!("{} exited with code {}", relative.display(), code),
                    None if result.timed_out => format!("{} timed out", relative.display()),
                    None => format!("{} was terminated", relative.display()),
                },
            });
        }

        ledger
            .mark_engine_handled()
            .map_err(|e| PrereqError::EngineHandler {
                message: format!("could not record engine prerequisite: {}", e),
            })?;

        Ok(EngineOutcome::Installed { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::{CommandResult, OutputLine};
    use crate::state::InstallationId;
    use crate::ui::MockReporter;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct FixedExit {
        code: i32,
        seen: Mutex<Vec<Invocation>>,
    }

    impl FixedExit {
        fn new(code: i32) -> Self {
            Self {
                code,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl ProcessRunner for FixedExit {
        fn run(
            &self,
            invocation: &Invocation,
            on_line: &mut dyn FnMut(OutputLine),
        ) -> Result<CommandResult> {
            self.seen.lock().unwrap().push(invocation.clone());
            on_line(OutputLine::Stdout("Installing UE4 prerequisites".into()));
            Ok(CommandResult {
                exit_code: Some(self.code),
                duration: Duration::from_millis(1),
                timed_out: false,
            })
        }
    }

    fn installation(dir: &Path, executables: &[&str]) -> ManagedInstallation {
        ManagedInstallation::new("cave-ue4", dir).with_executables(executables.iter().copied())
    }

    #[test]
    fn finds_installer_case_insensitively() {
        let executables = vec![
            PathBuf::from("Game.exe"),
            PathBuf::from("Engine/Extras/Redist/en-us/ue4prereqsetup_X64.EXE"),
        ];
        assert_eq!(
            find_engine_installer(&executables),
            Some(Path::new("Engine/Extras/Redist/en-us/ue4prereqsetup_X64.EXE"))
        );
    }

    #[test]
    fn ignores_other_executables() {
        let executables = vec![PathBuf::from("Game.exe"), PathBuf::from("UE4Editor.exe")];
        assert_eq!(find_engine_installer(&executables), None);
    }

    #[test]
    fn not_bundled_leaves_ledger_untouched() {
        let temp = TempDir::new().unwrap();
        let store = LedgerStore::new(temp.path(), InstallationId::new("cave-ue4"));
        let runner = FixedExit::new(0);
        let reporter = MockReporter::new();

        let outcome = EngineHandler::new(&runner, &reporter)
            .handle(&installation(temp.path(), &["Game.exe"]), &store)
            .unwrap();

        assert_eq!(outcome, EngineOutcome::NotBundled);
        assert!(runner.seen.lock().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn success_marks_ledger() {
        let temp = TempDir::new().unwrap();
        let store = LedgerStore::new(temp.path(), InstallationId::new("cave-ue4"));
        let runner = FixedExit::new(0);
        let reporter = MockReporter::new();

        let outcome = EngineHandler::new(&runner, &reporter)
            .handle(
                &installation(temp.path(), &["Redist/UE4PrereqSetup_x64.exe"]),
                &store,
            )
            .unwrap();

        assert!(matches!(outcome, EngineOutcome::Installed { .. }));
        assert!(store.is_engine_handled().unwrap());

        let seen = runner.seen.lock().unwrap();
        assert_eq!(
            seen[0].program,
            temp.path()
                .join("Redist/UE4PrereqSetup_x64.exe")
                .to_string_lossy()
        );
        assert_eq!(seen[0].args, vec!["/quiet", "/norestart"]);
        assert!(reporter.has_output("ue4-prereq", "Installing UE4 prerequisites"));
    }

    #[test]
    fn failure_is_engine_error_and_leaves_ledger_untouched() {
        let temp = TempDir::new().unwrap();
        let store = LedgerStore::new(temp.path(), InstallationId::new("cave-ue4"));
        let runner = FixedExit::new(1);
        let reporter = MockReporter::new();

        let err = EngineHandler::new(&runner, &reporter)
            .handle(&installation(temp.path(), &["UE4PrereqSetup.exe"]), &store)
            .unwrap_err();

        assert!(matches!(err, PrereqError::EngineHandler { .. }));
        assert!(!store.is_engine_handled().unwrap());
    }
}
