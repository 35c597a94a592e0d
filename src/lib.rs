//! prereqs - Detect and silently install game prerequisites.
//!
//! Before a game is launched, prereqs works out which native redistributables
//! (VC++ runtimes, DirectX, engine prerequisites) it declares but the host is
//! missing, downloads and verifies them from a remote catalog, and runs their
//! installers unattended. A per-installation ledger records what is done so
//! later launches skip straight past.
//!
//! # Modules
//!
//! - [`catalog`] - Remote catalog access: descriptors, checksums, archives
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading
//! - [`error`] - Error types and result aliases
//! - [`manifest`] - Managed installations and their declared prerequisites
//! - [`requirements`] - Host probing, assessment and installer execution
//! - [`runner`] - Pass orchestration and the engine prerequisite handler
//! - [`shell`] - Process execution with streamed output
//! - [`staging`] - Scratch workspace, download verification and extraction
//! - [`state`] - Installation ledger persistence
//! - [`ui`] - Status reporting
//!
//! # Example
//!
//! ```
//! use prereqs::manifest::PrerequisiteRequest;
//! use prereqs::state::InstallationLedger;
//!
//! let mut ledger = InstallationLedger::default();
//! ledger.merge(["vcredist-2010-x86"]);
//!
//! let requests = vec![
//!     PrerequisiteRequest::new("vcredist-2010-x86"),
//!     PrerequisiteRequest::new("dx-june-2010"),
//! ];
//! let pending = ledger.pending(&requests);
//! assert_eq!(pending, vec![PrerequisiteRequest::new("dx-june-2010")]);
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;
pub mod requirements;
pub mod runner;
pub mod shell;
pub mod staging;
pub mod state;
pub mod ui;

pub use error::{PrereqError, Result};
