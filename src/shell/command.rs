//! Process execution.
//!
//! Installers and probe tools are spawned directly (no intermediate shell) so
//! that argument lists reach the program verbatim.

use crate::error::{PrereqError, Result};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A program to launch, with its arguments and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to execute.
    pub program: String,

    /// Arguments, passed as-is.
    pub args: Vec<String>,

    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Kill the process after this long (None = no timeout).
    pub timeout: Option<Duration>,
}

impl Invocation {
    /// Create an invocation of `program` with `args`.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            timeout: None,
        }
    }

    /// Set the working directory.
    pub fn in_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set a timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Render as a single command line, for logs and error messages.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Result of executing a process.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal or timeout).
    pub exit_code: Option<i32>,

    /// Execution duration.
    pub duration: Duration,

    /// Whether the process was killed because it ran past its timeout.
    pub timed_out: bool,
}

impl CommandResult {
    /// Whether the process exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Output line from process execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

impl OutputLine {
    /// The text of the line, whichever stream it came from.
    pub fn text(&self) -> &str {
        match self {
            OutputLine::Stdout(s) | OutputLine::Stderr(s) => s,
        }
    }
}

/// Spawns processes on behalf of the pipeline.
///
/// Implemented by [`SystemRunner`] in production and by fakes in tests.
pub trait ProcessRunner: Send + Sync {
    /// Run an invocation to completion, delivering output lines as they arrive.
    fn run(
        &self,
        invocation: &Invocation,
        on_line: &mut dyn FnMut(OutputLine),
    ) -> Result<CommandResult>;
}

/// Runs processes on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(
        &self,
        invocation: &Invocation,
        on_line: &mut dyn FnMut(OutputLine),
    ) -> Result<CommandResult> {
        execute_streaming(invocation, on_line)
    }
}

/// Execute a process with streaming output.
pub fn execute_streaming(
    invocation: &Invocation,
    on_line: &mut dyn FnMut(OutputLine),
) -> Result<CommandResult> {
    let start = Instant::now();

    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args);
    if let Some(cwd) = &invocation.cwd {
        cmd.current_dir(cwd);
    }
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| {
        tracing::debug!("Failed to spawn {}: {}", invocation.program, e);
        PrereqError::CommandFailed {
            command: invocation.display(),
            code: None,
        }
    })?;

    let (tx, rx) = mpsc::channel();

    if let Some(stdout) = child.stdout.take() {
        let tx = tx.clone();
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines().map_while(std::result::Result::ok) {
                let _ = tx.send(OutputLine::Stdout(line));
            }
        });
    }

    if let Some(stderr) = child.stderr.take() {
        let tx = tx.clone();
        thread::spawn(move || {
            let reader = BufReader::new(stderr);
            for line in reader.lines().map_while(std::result::Result::ok) {
                let _ = tx.send(OutputLine::Stderr(line));
            }
        });
    }
    drop(tx);

    let deadline = invocation.timeout.map(|t| start + t);
    let mut timed_out = false;

    loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(line) => on_line(line),
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    tracing::warn!(
                        "{} ran past its timeout, killing it",
                        invocation.program
                    );
                    confirm_killed(invocation, child.kill())?;
                    timed_out = true;
                    break;
                }
            }
        }
    }

    let status = child.wait().map_err(|_| PrereqError::CommandFailed {
        command: invocation.display(),
        code: None,
    })?;

    Ok(CommandResult {
        exit_code: if timed_out { None } else { status.code() },
        duration: start.elapsed(),
        timed_out,
    })
}

/// A failed kill leaves the process running, so waiting on it would block
/// past the deadline.
fn confirm_killed(invocation: &Invocation, outcome: std::io::Result<()>) -> Result<()> {
    outcome.map_err(|e| {
        tracing::warn!("Could not kill {}: {}", invocation.program, e);
        PrereqError::CommandFailed {
            command: invocation.display(),
            code: None,
        }
    })
}

/// Execute a process, discarding its output.
pub fn execute_quiet(invocation: &Invocation) -> Result<CommandResult> {
    execute_streaming(invocation, &mut |_| {})
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Invocation {
        Invocation::new("sh", ["-c", script])
    }

    #[test]
    fn execute_successful_command() {
        let result = execute_quiet(&sh("exit 0")).unwrap();
        assert!(result.success());
        assert_eq!(result.exit_code, Some(0));
        assert!(!result.timed_out);
    }

    #[test]
    fn execute_failing_command_reports_code() {
        let result = execute_quiet(&sh("exit 3")).unwrap();
        assert!(!result.success());
        assert_eq!(result.exit_code, Some(3));
    }

    #[test]
    fn missing_program_is_command_failed() {
        let result = execute_quiet(&Invocation::new("definitely-not-a-real-program-xyz", [""; 0]));
        assert!(matches!(result, Err(PrereqError::CommandFailed { .. })));
    }

    #[test]
    fn streaming_captures_stdout_and_stderr_in_order() {
        let mut lines = Vec::new();
        let result = execute_streaming(
            &sh("echo line1; echo line2; echo oops >&2"),
            &mut |line| lines.push(line),
        )
        .unwrap();

        assert!(result.success());
        let stdout: Vec<_> = lines
            .iter()
            .filter_map(|l| match l {
                OutputLine::Stdout(s) => Some(s.as_str()),
                OutputLine::Stderr(_) => None,
            })
            .collect();
        assert_eq!(stdout, vec!["line1", "line2"]);
        assert!(lines.contains(&OutputLine::Stderr("oops".to_string())));
    }

    #[test]
    fn runs_in_working_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker.txt"), "here").unwrap();

        let mut lines = Vec::new();
        let result = execute_streaming(&sh("cat marker.txt").in_dir(temp.path()), &mut |l| {
            lines.push(l)
        })
        .unwrap();

        assert!(result.success());
        assert_eq!(lines, vec![OutputLine::Stdout("here".to_string())]);
    }

    #[test]
    fn timeout_kills_long_running_process() {
        let invocation = sh("sleep 5").with_timeout(Some(Duration::from_millis(200)));
        let result = execute_quiet(&invocation).unwrap();

        assert!(result.timed_out);
        assert_eq!(result.exit_code, None);
        assert!(result.duration < Duration::from_secs(5));
    }

    #[test]
    fn failed_kill_is_command_failed() {
        let invocation = Invocation::new("dxsetup.exe", ["/silent"]);
        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");

        let err = confirm_killed(&invocation, Err(denied)).unwrap_err();
        assert!(matches!(
            err,
            PrereqError::CommandFailed { ref command, code: None } if command == "dxsetup.exe /silent"
        ));
        assert!(confirm_killed(&invocation, Ok(())).is_ok());
    }

    #[test]
    fn display_joins_program_and_args() {
        let invocation = Invocation::new("vcredist_x86.exe", ["/q", "/norestart"]);
        assert_eq!(invocation.display(), "vcredist_x86.exe /q /norestart");
        assert_eq!(Invocation::new("setup.exe", [""; 0]).display(), "setup.exe");
    }
}
