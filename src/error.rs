//! Error types for prerequisite operations.
//!
//! This module defines [`PrereqError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Probe failures never leave the prober: they are logged and read as
//!   "not installed".
//! - Remote, integrity, extraction and installer failures abort the pass.
//! - Use `anyhow::Error` (via `PrereqError::Other`) for unexpected errors.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for prerequisite operations.
#[derive(Debug, Error)]
pub enum PrereqError {
    /// The catalog answered with a non-success status, could not be reached,
    /// or returned a payload that does not validate.
    #[error("Remote error for {url}: {message}")]
    Remote { url: String, message: String },

    /// A downloaded file does not match the digest recorded by the catalog.
    #[error("Integrity check failed for {file}: expected {expected}, got {actual}")]
    Integrity {
        file: PathBuf,
        expected: String,
        actual: String,
    },

    /// A registry or DLL check could not be carried out.
    #[error("Probe '{check}' failed: {message}")]
    Probe { check: String, message: String },

    /// An installer exited with a code that is not flagged successful.
    #[error("Installer for {name} exited with code {code}: {message}")]
    Installer {
        name: String,
        code: i32,
        message: String,
    },

    /// The engine prerequisite could not be installed.
    #[error("Engine prerequisite failed: {message}")]
    EngineHandler { message: String },

    /// An archive could not be extracted.
    #[error("Failed to extract {archive}: {message}")]
    Extraction { archive: PathBuf, message: String },

    /// The persisted ledger could not be parsed.
    #[error("Failed to parse ledger at {path}: {message}")]
    LedgerParse { path: PathBuf, message: String },

    /// Another pass currently holds the installation's lock.
    #[error("Another prerequisite pass is already running for '{id}'")]
    LedgerBusy { id: String },

    /// Failed to load the configuration file.
    #[error("Invalid configuration at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Failed to read a game manifest.
    #[error("Invalid manifest at {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    /// A process could not be spawned or waited on.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PrereqError {
    /// Build a remote error from a URL and anything displayable.
    pub fn remote(url: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Remote {
            url: url.into(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for prerequisite operations.
pub type Result<T> = std::result::Result<T, PrereqError>;
