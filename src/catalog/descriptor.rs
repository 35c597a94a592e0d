//! Prerequisite descriptors.
//!
//! A descriptor is the `info.json` document the catalog publishes for each
//! prerequisite. It is deserialized into a strict structure at the network
//! boundary: a payload missing any required field is rejected outright.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Architecture a prerequisite targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arch {
    #[serde(rename = "i386")]
    X86,
    #[serde(rename = "amd64")]
    X64,
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arch::X86 => write!(f, "x86"),
            Arch::X64 => write!(f, "x64"),
        }
    }
}

/// Meaning of one installer exit code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitCodeEntry {
    pub code: i32,

    /// Whether this code means the installation went fine.
    #[serde(default)]
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Remote metadata describing how to detect, fetch and install one prerequisite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrerequisiteDescriptor {
    /// Human-friendly name, e.g. "Microsoft Visual C++ 2010 Redistributable".
    pub full_name: String,

    /// The exact version provided.
    pub version: String,

    pub arch: Arch,

    /// Executable to launch, relative to the extracted archive.
    pub command: String,

    /// Arguments for an unattended, reboot-free install.
    pub args: Vec<String>,

    /// Whether the installer needs administrator rights.
    #[serde(default)]
    pub elevate: bool,

    /// Registry keys whose presence hints at a prior install. Any one is enough.
    #[serde(default)]
    pub registry_keys: Vec<String>,

    /// DLLs that must all be loadable for the install to count as healthy.
    #[serde(default)]
    pub dlls: Vec<String>,

    /// Known exit codes, matched in declaration order.
    #[serde(default)]
    pub exit_codes: Vec<ExitCodeEntry>,
}

impl PrerequisiteDescriptor {
    /// Parse and validate an `info.json` payload.
    pub fn from_json(payload: &str) -> Result<Self, String> {
        let descriptor: Self = serde_json::from_str(payload).map_err(|e| e.to_string())?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Reject descriptors that deserialize but cannot be acted upon.
    pub fn validate(&self) -> Result<(), String> {
        if self.full_name.trim().is_empty() {
            return Err("fullName must not be empty".to_string());
        }
        if self.command.trim().is_empty() {
            return Err("command must not be empty".to_string());
        }
        Ok(())
    }

    /// First exit-code entry matching `code`.
    pub fn exit_code(&self, code: i32) -> Option<&ExitCodeEntry> {
        self.exit_codes.iter().find(|entry| entry.code == code)
    }
}
