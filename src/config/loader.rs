//! Configuration file loading.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::schema::CheckConfig;
use crate::error::{LibcheckError, Result};

/// Load a configuration file from a path.
pub fn load_config_file(path: &Path) -> Result<CheckConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LibcheckError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            LibcheckError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse configuration from YAML content.
pub fn parse_config(content: &str, source_path: &Path) -> Result<CheckConfig> {
    // An empty file deserializes to unit, not a mapping.
    if content.trim().is_empty() {
        return Ok(CheckConfig::default());
    }

    serde_yaml::from_str(content).map_err(|e| LibcheckError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load the configuration, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<CheckConfig> {
    match path {
        Some(path) => {
            debug!("Loading config from {}", path.display());
            load_config_file(path)
        }
        None => Ok(CheckConfig::default()),
    }
}
