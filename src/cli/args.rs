//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{load_config, Config};
use crate::error::Result;

/// prereqs - Detect and install game prerequisites.
#[derive(Debug, Parser)]
#[command(name = "prereqs")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides ~/.prereqs/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the redistributables catalog
    #[arg(long, global = true, env = "PREREQS_CATALOG_URL")]
    pub catalog_url: Option<String>,

    /// Directory holding installation ledgers
    #[arg(long, global = true, env = "PREREQS_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Echo installer output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Load the configuration and apply command-line overrides.
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(url) = &self.catalog_url {
            config.catalog_url = url.clone();
        }
        if let Some(dir) = &self.state_dir {
            config.state_dir = Some(dir.clone());
        }
        Ok(config)
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install missing prerequisites for a game installation
    Run(RunArgs),

    /// Report which prerequisites are present without installing anything
    Assess(AssessArgs),

    /// Show what the ledger records for a game installation
    Status(StatusArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Game installation directory
    pub install_dir: PathBuf,

    /// Installation id (defaults to the canonical install directory path)
    #[arg(long)]
    pub id: Option<String>,

    /// Extra prerequisite to require, in addition to the game manifest
    #[arg(long = "prereq", value_name = "NAME")]
    pub prereqs: Vec<String>,
}

/// Arguments for the `assess` command.
#[derive(Debug, Clone, Args)]
pub struct AssessArgs {
    /// Game installation directory
    pub install_dir: PathBuf,

    /// Extra prerequisite to assess, in addition to the game manifest
    #[arg(long = "prereq", value_name = "NAME")]
    pub prereqs: Vec<String>,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Args)]
pub struct StatusArgs {
    /// Game installation directory
    pub install_dir: PathBuf,

    /// Installation id (defaults to the canonical install directory path)
    #[arg(long)]
    pub id: Option<String>,
}

/// Resolve the installation id: explicit, or the canonical install path.
pub fn installation_id(install_dir: &Path, explicit: Option<&str>) -> Result<String> {
    match explicit {
        Some(id) => Ok(id.to_string()),
        None => Ok(install_dir.canonicalize()?.to_string_lossy().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_run_with_prereqs() {
        let cli = Cli::parse_from([
            "prereqs",
            "run",
            "C:/Games/Foo",
            "--id",
            "cave-1",
            "--prereq",
            "vcredist-2010-x86",
            "--prereq",
            "dx-june-2010",
        ]);

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.install_dir, PathBuf::from("C:/Games/Foo"));
                assert_eq!(args.id.as_deref(), Some("cave-1"));
                assert_eq!(args.prereqs, vec!["vcredist-2010-x86", "dx-june-2010"]);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "prereqs",
            "status",
            "game",
            "--state-dir",
            "/tmp/state",
            "--debug",
        ]);
        assert!(cli.debug);
        assert_eq!(cli.state_dir, Some(PathBuf::from("/tmp/state")));
    }

    #[test]
    fn overrides_apply_to_config() {
        let temp = tempfile::TempDir::new().unwrap();
        let config_path = temp.path().join("config.yml");
        std::fs::write(&config_path, "http_timeout_secs: 7\n").unwrap();

        let cli = Cli::parse_from([
            "prereqs",
            "--config",
            config_path.to_str().unwrap(),
            "--catalog-url",
            "http://localhost:1234",
            "assess",
            "game",
        ]);
        let config = cli.resolve_config().unwrap();

        assert_eq!(config.catalog_url, "http://localhost:1234");
        assert_eq!(config.http_timeout_secs, 7);
    }

    #[test]
    fn explicit_id_wins() {
        assert_eq!(
            installation_id(Path::new("/does/not/exist"), Some("cave-9")).unwrap(),
            "cave-9"
        );
    }

    #[test]
    fn default_id_is_canonical_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let id = installation_id(temp.path(), None).unwrap();
        assert_eq!(
            id,
            temp.path().canonicalize().unwrap().to_string_lossy()
        );
    }
}
