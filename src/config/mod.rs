//! Optional YAML configuration.
//!
//! - Schema definitions in [`schema`]
//! - File loading in [`loader`]
//!
//! # Example
//!
//! ```
//! use libcheck::config::load_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("libcheck.yml");
//! fs::write(&path, "system_prefixes: [Newtonsoft]\nextensions: [dll, exe]\n").unwrap();
//!
//! let config = load_config(Some(&path)).unwrap();
//! assert!(config.system_prefix_set().is_system("Newtonsoft.Json"));
//! assert_eq!(config.extensions, ["dll", "exe"]);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_file, parse_config};
pub use schema::CheckConfig;
