//! Configuration file discovery and loading.

use crate::config::schema::Config;
use crate::error::{PrereqError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Find the user's global config at `~/.prereqs/config.yml`.
pub fn find_user_config() -> Option<PathBuf> {
    let path = dirs::home_dir()?.join(".prereqs").join("config.yml");
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

/// Load configuration.
///
/// An explicit path must exist. Without one, the user's global config is used
/// when present and built-in defaults otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => load_config_file(path),
        None => match find_user_config() {
            Some(path) => load_config_file(&path),
            None => Ok(Config::default()),
        },
    }
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `Config` if the file is missing or the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| PrereqError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into a [`Config`].
pub fn parse_config(content: &str, source_path: &Path) -> Result<Config> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(content).map_err(|e| PrereqError::Config {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}
