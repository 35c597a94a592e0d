//! Remote catalog of prerequisites.
//!
//! - [`descriptor`] - Strict model of a prerequisite's `info.json`
//! - [`client`] - HTTP access to descriptors, checksum manifests and archives
//! - [`checksum`] - SHA-256 manifests and file verification

pub mod checksum;
pub mod client;
pub mod descriptor;

pub use checksum::{sha256_file, verify_file, ChecksumManifest, CHECKSUM_MANIFEST};
pub use client::CatalogClient;
pub use descriptor::{Arch, ExitCodeEntry, PrerequisiteDescriptor};
