//! Status reporting.
//!
//! A pass never talks to a UI directly. It emits [`StatusEvent`]s and installer
//! output to a [`Reporter`] handed in by the caller:
//! - [`LogReporter`] sends everything to `tracing`
//! - [`ConsoleReporter`] prints status lines to the terminal
//! - [`MockReporter`] records everything for assertions
//!
//! # Example
//!
//! ```
//! use prereqs::ui::{MockReporter, Reporter, StatusEvent};
//!
//! let reporter = MockReporter::new();
//! reporter.status(&StatusEvent::Installing {
//!     name: "DirectX 9.0c".to_string(),
//!     version: "9.29.1974".to_string(),
//! });
//! assert!(reporter.has_status("installing dependency DirectX 9.0c version 9.29.1974"));
//! ```

pub mod mock;
pub mod terminal;

pub use mock::MockReporter;
pub use terminal::ConsoleReporter;

use crate::shell::OutputLine;
use std::fmt;

/// Progress notification emitted during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// Running the game's bundled engine prerequisite installer.
    EngineSetup { path: String },

    /// Checking which prerequisites are already present.
    Assessing { names: Vec<String> },

    /// A prerequisite was found on the host and will be skipped.
    AlreadyInstalled { name: String },

    /// A prerequisite is being downloaded and installed.
    Installing { name: String, version: String },

    /// A prerequisite was installed successfully.
    Installed { name: String },
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::EngineSetup { path } => {
                write!(f, "running engine prerequisite setup {}", path)
            }
            StatusEvent::Assessing { names } => {
                write!(f, "assessing prerequisites {}", names.join(", "))
            }
            StatusEvent::AlreadyInstalled { name } => write!(f, "{} is already installed", name),
            StatusEvent::Installing { name, version } => {
                write!(f, "installing dependency {} version {}", name, version)
            }
            StatusEvent::Installed { name } => write!(f, "installed {}", name),
        }
    }
}

/// Receives status events and installer output.
///
/// Shared between staging threads, hence `Send + Sync` and `&self` methods.
pub trait Reporter: Send + Sync {
    /// One-way progress notification.
    fn status(&self, event: &StatusEvent);

    /// A line printed by a process launched on behalf of `source`.
    fn output(&self, source: &str, line: &OutputLine) {
        match line {
            OutputLine::Stdout(text) => tracing::info!("[{} out] {}", source, text),
            OutputLine::Stderr(text) => tracing::info!("[{} err] {}", source, text),
        }
    }
}

/// Reports everything through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn status(&self, event: &StatusEvent) {
        tracing::info!("{}", event);
    }
}
