//! Installer execution.
//!
//! Launches an extracted installer and decides, from its exit code and the
//! descriptor's exit-code table, whether the installation succeeded.

use crate::catalog::PrerequisiteDescriptor;
use crate::error::{PrereqError, Result};
use crate::shell::{Invocation, ProcessRunner};
use crate::ui::Reporter;
use std::path::Path;
use std::time::Duration;

/// Message used when a failing exit code has no description.
pub const UNKNOWN_EXIT_CODE: &str = "Unknown error code";

/// Exit code reported for a process that ended without one.
const NO_EXIT_CODE: i32 = -1;

/// Result of running one installer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Success,
    Failure { code: i32, message: String },
}

impl InstallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InstallOutcome::Success)
    }
}

/// Interpret an installer's exit code.
///
/// Zero is success. Any other code is looked up in the descriptor's table,
/// first match wins; an entry flagged `success` turns the nonzero code into a
/// success (installers commonly use these for "already installed" or
/// "reboot suppressed").
pub fn interpret_exit_code(descriptor: &PrerequisiteDescriptor, code: i32) -> InstallOutcome {
    if code == 0 {
        return InstallOutcome::Success;
    }

    match descriptor.exit_code(code) {
        Some(entry) if entry.success => InstallOutcome::Success,
        Some(entry) => InstallOutcome::Failure {
            code,
            message: entry
                .message
                .clone()
                .unwrap_or_else(|| UNKNOWN_EXIT_CODE.to_string()),
        },
        None => InstallOutcome::Failure {
            code,
            message: UNKNOWN_EXIT_CODE.to_string(),
        },
    }
}

/// Build the command line for an installer staged in `staged`.
///
/// With `elevate`, the elevation helper becomes the program and receives the
/// original command and arguments as its own arguments.
pub fn build_invocation(
    descriptor: &PrerequisiteDescriptor,
    staged: &Path,
    elevate_helper: &str,
) -> Invocation {
    let invocation = if descriptor.elevate {
        let mut args = Vec::with_capacity(descriptor.args.len() + 1);
        args.push(descriptor.command.clone());
        args.extend(descriptor.args.iter().cloned());
        Invocation::new(elevate_helper, args)
    } else {
        Invocation::new(
            resolve_command(&descriptor.command, staged),
            descriptor.args.iter().cloned(),
        )
    };

    invocation.in_dir(staged)
}

/// Point a relative command at the extracted file when it exists.
fn resolve_command(command: &str, staged: &Path) -> String {
    let candidate = staged.join(command);
    if Path::new(command).is_relative() && candidate.is_file() {
        candidate.to_string_lossy().to_string()
    } else {
        command.to_string()
    }
}

/// Runs installers and reports their output.
pub struct InstallerRunner<'a> {
    runner: &'a dyn ProcessRunner,
    reporter: &'a dyn Reporter,
    elevate_helper: String,
    timeout: Option<Duration>,
}

impl<'a> InstallerRunner<'a> {
    pub fn new(
        runner: &'a dyn ProcessRunner,
        reporter: &'a dyn Reporter,
        elevate_helper: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            reporter,
            elevate_helper: elevate_helper.into(),
            timeout: None,
        }
    }

    /// Kill installers that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the installer for `name` and interpret its exit code.
    ///
    /// # Errors
    ///
    /// Returns `CommandFailed` if the process cannot be spawned.
    pub fn run(
        &self,
        name: &str,
        descriptor: &PrerequisiteDescriptor,
        staged: &Path,
    ) -> Result<InstallOutcome> {
        let invocation =
            build_invocation(descriptor, staged, &self.elevate_helper).with_timeout(self.timeout);
        tracing::info!(
            "Launching {} with args {}",
            descriptor.command,
            descriptor.args.join(" ")
        );

        let result = self
            .runner
            .run(&invocation, &mut |line| self.reporter.output(name, &line))?;

        if result.timed_out {
            return Ok(InstallOutcome::Failure {
                code: NO_EXIT_CODE,
                message: format!(
                    "timed out after {}s",
                    self.timeout.map(|t| t.as_secs()).unwrap_or_default()
                ),
            });
        }

        let code = result.exit_code.unwrap_or(NO_EXIT_CODE);
        let outcome = interpret_exit_code(descriptor, code);
        if outcome.is_success() && code != 0 {
            tracing::info!(
                "{} exited with {}: {}. Success!",
                name,
                code,
                descriptor
                    .exit_code(code)
                    .and_then(|e| e.message.as_deref())
                    .unwrap_or("no description")
            );
        }
        Ok(outcome)
    }

    /// Run the installer and turn a failed outcome into an error.
    ///
    /// # Errors
    ///
    /// Returns `Installer` with the exit code and its meaning on failure.
    pub fn install(
        &self,
        name: &str,
        descriptor: &PrerequisiteDescriptor,
        staged: &Path,
    ) -> Result<()> {
        match self.run(name, descriptor, staged)? {
            InstallOutcome::Success => {
                tracing::info!("Installed {} successfully!", descriptor.full_name);
                Ok(())
            }
            InstallOutcome::Failure { code, message } => Err(PrereqError::Installer {
                name: descriptor.full_name.clone(),
                code,
                message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Arch, ExitCodeEntry};
    use crate::shell::{CommandResult, OutputLine};
    use crate::ui::MockReporter;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct ScriptedRunner {
        exit_code: Option<i32>,
        timed_out: bool,
        seen: Mutex<Vec<Invocation>>,
    }

    impl ScriptedRunner {
        fn exiting(code: i32) -> Self {
            Self {
                exit_code: Some(code),
                timed_out: false,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl ProcessRunner for ScriptedRunner {
        fn run(
            &self,
            invocation: &Invocation,
            on_line: &mut dyn FnMut(OutputLine),
        ) -> Result<CommandResult> {
            self.seen.lock().unwrap().push(invocation.clone());
            on_line(OutputLine::Stdout("Installing...".into()));
            on_line(OutputLine::Stderr("minor warning".into()));
            Ok(CommandResult {
                exit_code: self.exit_code,
                duration: Duration::from_millis(1),
                timed_out: self.timed_out,
            })
        }
    }

    fn descriptor(elevate: bool, exit_codes: Vec<ExitCodeEntry>) -> PrerequisiteDescriptor {
        PrerequisiteDescriptor {
            full_name: "Microsoft Visual C++ 2010 Redistributable".into(),
            version: "10.0".into(),
            arch: Arch::X86,
            command: "vcredist_x86.exe".into(),
            args: vec!["/q".into(), "/norestart".into()],
            elevate,
            registry_keys: Vec::new(),
            dlls: Vec::new(),
            exit_codes,
        }
    }

    fn entry(code: i32, success: bool, message: Option<&str>) -> ExitCodeEntry {
        ExitCodeEntry {
            code,
            success,
            message: message.map(String::from),
        }
    }

    #[test]
    fn zero_is_success() {
        assert_eq!(
            interpret_exit_code(&descriptor(false, Vec::new()), 0),
            InstallOutcome::Success
        );
    }

    #[test]
    fn flagged_nonzero_code_is_success() {
        let d = descriptor(false, vec![entry(3010, true, Some("Reboot required"))]);
        assert_eq!(interpret_exit_code(&d, 3010), InstallOutcome::Success);
    }

    #[test]
    fn unknown_nonzero_code_is_generic_failure() {
        let d = descriptor(false, vec![entry(3010, true, None)]);
        assert_eq!(
            interpret_exit_code(&d, 1),
            InstallOutcome::Failure {
                code: 1,
                message: UNKNOWN_EXIT_CODE.into()
            }
        );
    }

    #[test]
    fn known_failing_code_uses_its_message() {
        let d = descriptor(false, vec![entry(1603, false, Some("Fatal error"))]);
        assert_eq!(
            interpret_exit_code(&d, 1603),
            InstallOutcome::Failure {
                code: 1603,
                message: "Fatal error".into()
            }
        );
    }

    #[test]
    fn first_matching_entry_wins() {
        let d = descriptor(
            false,
            vec![
                entry(5100, false, Some("Requirements not met")),
                entry(5100, true, Some("never reached")),
            ],
        );
        assert!(!interpret_exit_code(&d, 5100).is_success());
    }

    #[test]
    fn elevation_wraps_original_command() {
        let temp = TempDir::new().unwrap();
        let invocation = build_invocation(&descriptor(true, Vec::new()), temp.path(), "elevate.exe");

        assert_eq!(invocation.program, "elevate.exe");
        assert_eq!(invocation.args, vec!["vcredist_x86.exe", "/q", "/norestart"]);
        assert_eq!(invocation.cwd.as_deref(), Some(temp.path()));
    }

    #[test]
    fn plain_invocation_resolves_extracted_command() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("vcredist_x86.exe"), "").unwrap();

        let invocation =
            build_invocation(&descriptor(false, Vec::new()), temp.path(), "elevate.exe");

        assert_eq!(
            invocation.program,
            temp.path().join("vcredist_x86.exe").to_string_lossy()
        );
        assert_eq!(invocation.args, vec!["/q", "/norestart"]);
    }

    #[test]
    fn plain_invocation_keeps_command_not_in_archive() {
        let temp = TempDir::new().unwrap();
        let invocation =
            build_invocation(&descriptor(false, Vec::new()), temp.path(), "elevate.exe");
        assert_eq!(invocation.program, "vcredist_x86.exe");
    }

    #[test]
    fn run_streams_output_to_reporter() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::exiting(0);
        let reporter = MockReporter::new();
        let installer = InstallerRunner::new(&runner, &reporter, "elevate.exe");

        let outcome = installer
            .run("vcredist2010", &descriptor(false, Vec::new()), temp.path())
            .unwrap();

        assert!(outcome.is_success());
        assert!(reporter.has_output("vcredist2010", "Installing..."));
        assert!(reporter.has_output("vcredist2010", "minor warning"));
    }

    #[test]
    fn install_maps_failure_to_installer_error() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::exiting(1603);
        let reporter = MockReporter::new();
        let installer = InstallerRunner::new(&runner, &reporter, "elevate.exe");
        let d = descriptor(false, vec![entry(1603, false, Some("Fatal error"))]);

        let err = installer.install("vcredist2010", &d, temp.path()).unwrap_err();
        match err {
            PrereqError::Installer { code, message, .. } => {
                assert_eq!(code, 1603);
                assert_eq!(message, "Fatal error");
            }
            other => panic!("expected installer error, got {other:?}"),
        }
    }

    #[test]
    fn timed_out_run_is_failure() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner {
            exit_code: None,
            timed_out: true,
            seen: Mutex::new(Vec::new()),
        };
        let reporter = MockReporter::new();
        let installer = InstallerRunner::new(&runner, &reporter, "elevate.exe")
            .with_timeout(Some(Duration::from_secs(60)));

        let outcome = installer
            .run("vcredist2010", &descriptor(false, Vec::new()), temp.path())
            .unwrap();

        assert_eq!(
            outcome,
            InstallOutcome::Failure {
                code: -1,
                message: "timed out after 60s".into()
            }
        );
        assert_eq!(
            runner.seen.lock().unwrap()[0].timeout,
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn killed_process_without_code_is_failure() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner {
            exit_code: None,
            timed_out: false,
            seen: Mutex::new(Vec::new()),
        };
        let reporter = MockReporter::new();
        let installer = InstallerRunner::new(&runner, &reporter, "elevate.exe");

        let outcome = installer
            .run("vcredist2010", &descriptor(false, Vec::new()), temp.path())
            .unwrap();
        assert_eq!(
            outcome,
            InstallOutcome::Failure {
                code: -1,
                message: UNKNOWN_EXIT_CODE.into()
            }
        );
    }
}
