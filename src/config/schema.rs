//! Configuration schema definitions.
//!
//! This module contains the struct that maps to the YAML configuration
//! file format.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default location of the redistributables catalog.
pub const DEFAULT_CATALOG_URL: &str = "https://dl.itch.ovh/itch-redists";

/// Root configuration structure for `config.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the remote catalog; each prerequisite lives under
    /// `<catalog_url>/<name>/`.
    pub catalog_url: String,

    /// Where ledgers are persisted (defaults to `~/.prereqs`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,

    /// Helper used to run installers that need administrator rights.
    pub elevate_helper: String,

    /// 7-Zip executable used to unpack archives.
    pub seven_zip: String,

    /// Registry query tool.
    pub reg_command: String,

    /// DLL assertion tool for 32-bit libraries.
    pub dll_assert_32: String,

    /// DLL assertion tool for 64-bit libraries.
    pub dll_assert_64: String,

    /// Timeout for each HTTP request, in seconds.
    pub http_timeout_secs: u64,

    /// Timeout for each installer run, in seconds (unset = wait forever).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installer_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            state_dir: None,
            elevate_helper: "elevate.exe".to_string(),
            seven_zip: "7z".to_string(),
            reg_command: "reg".to_string(),
            dll_assert_32: "dllassert32".to_string(),
            dll_assert_64: "dllassert64".to_string(),
            http_timeout_secs: 300,
            installer_timeout_secs: None,
        }
    }
}

impl Config {
    /// HTTP request timeout.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Installer timeout, if any.
    pub fn installer_timeout(&self) -> Option<Duration> {
        self.installer_timeout_secs.map(Duration::from_secs)
    }

    /// Directory holding persisted state.
    pub fn resolved_state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".prereqs")
        })
    }
}
