//! Prerequisite detection and installation.
//!
//! # Modules
//!
//! - [`probe`] - Registry and DLL checks deciding whether a prerequisite is present
//! - [`checker`] - Assessment of requested prerequisites against the catalog and host
//! - [`status`] - Assessment results
//! - [`installer`] - Running installers and interpreting their exit codes

pub mod checker;
pub mod installer;
pub mod probe;
pub mod status;

pub use checker::Assessor;
pub use installer::{
    build_invocation, interpret_exit_code, InstallOutcome, InstallerRunner, UNKNOWN_EXIT_CODE,
};
pub use probe::{probe, HostProbe, SystemProbe};
pub use status::{partition, AssessmentResult};
