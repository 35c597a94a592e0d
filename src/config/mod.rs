//! Configuration loading.
//!
//! Settings come from `~/.prereqs/config.yml` (or an explicit `--config`
//! path), with individual fields overridable from the command line.
//!
//! # Example
//!
//! ```
//! use prereqs::config::{parse_config, DEFAULT_CATALOG_URL};
//! use std::path::Path;
//!
//! let config = parse_config("seven_zip: 7za\n", Path::new("config.yml")).unwrap();
//! assert_eq!(config.seven_zip, "7za");
//! assert_eq!(config.catalog_url, DEFAULT_CATALOG_URL);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{find_user_config, load_config, load_config_file, parse_config};
pub use schema::{Config, DEFAULT_CATALOG_URL};
