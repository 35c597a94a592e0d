//! Managed installations and their declared prerequisites.
//!
//! Games declare prerequisites in an `.itch.toml` manifest at the root of
//! their install directory:
//!
//! ```toml
//! [[prereqs]]
//! name = "vcredist-2010-x86"
//!
//! [[prereqs]]
//! name = "dx-june-2010"
//! ```

use crate::error::{PrereqError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest file name, relative to the install directory.
pub const MANIFEST_FILE: &str = ".itch.toml";

/// A prerequisite declared by a game's manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrerequisiteRequest {
    pub name: String,
}

impl PrerequisiteRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Whether `name` can be used as a catalog path segment and a directory
    /// name: ASCII letters, digits, `.`, `_` and `-`, and not `.` or `..`.
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && name != "."
            && name != ".."
            && name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
    }
}

#[derive(Debug, Default, Deserialize)]
struct GameManifest {
    #[serde(default)]
    prereqs: Vec<PrerequisiteRequest>,
}

/// A game installation whose prerequisites are being managed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedInstallation {
    /// Stable identifier; the ledger is keyed on it.
    pub id: String,

    pub install_dir: PathBuf,

    /// Executables inside the install, relative to `install_dir`.
    pub executables: Vec<PathBuf>,

    /// Prerequisites declared for this installation, in manifest order.
    pub prereqs: Vec<PrerequisiteRequest>,
}

impl ManagedInstallation {
    /// An installation with no known executables or prerequisites.
    pub fn new(id: impl Into<String>, install_dir: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            install_dir: install_dir.into(),
            executables: Vec::new(),
            prereqs: Vec::new(),
        }
    }

    /// Describe the installation living in `dir`: read its manifest and list
    /// its executables.
    pub fn from_dir(id: impl Into<String>, dir: &Path) -> Result<Self> {
        Ok(Self {
            id: id.into(),
            install_dir: dir.to_path_buf(),
            executables: scan_executables(dir)?,
            prereqs: read_manifest(dir)?,
        })
    }

    /// Add prerequisites not already declared.
    pub fn with_prereqs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let request = PrerequisiteRequest::new(name);
            if !self.prereqs.contains(&request) {
                self.prereqs.push(request);
            }
        }
        self
    }

    /// Replace the executable list.
    pub fn with_executables<I, P>(mut self, executables: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.executables = executables.into_iter().map(Into::into).collect();
        self
    }
}

/// Read the prerequisites declared in `dir`'s manifest.
///
/// A missing manifest declares nothing.
pub fn read_manifest(dir: &Path) -> Result<Vec<PrerequisiteRequest>> {
    let path = dir.join(MANIFEST_FILE);
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&path)?;
    let manifest: GameManifest = toml::from_str(&content).map_err(|e| PrereqError::Manifest {
        path: path.clone(),
        message: e.to_string(),
    })?;

    if let Some(bad) = manifest
        .prereqs
        .iter()
        .find(|r| !PrerequisiteRequest::is_valid_name(&r.name))
    {
        return Err(PrereqError::Manifest {
            path,
            message: format!("invalid prerequisite name '{}'", bad.name),
        });
    }

    Ok(manifest.prereqs)
}

/// List `.exe` files below `dir`, relative to it, sorted.
pub fn scan_executables(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    walk(dir, dir, &mut found)?;
    found.sort();
    Ok(found)
}

fn walk(root: &Path, dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();

        if file_type.is_dir() {
            walk(root, &path, found)?;
        } else if file_type.is_file() && is_exe(&path) {
            if let Ok(relative) = path.strip_prefix(root) {
                found.push(relative.to_path_buf());
            }
        }
    }
    Ok(())
}

fn is_exe(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("exe"))
}
