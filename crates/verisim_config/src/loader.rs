//! Configuration file discovery, loading and validation.

use crate::error::ConfigError;
use crate::types::{VerisimConfig, MIN_COLUMNS};
use std::path::Path;

/// File name looked up in a directory.
pub const CONFIG_FILE_NAME: &str = "verisim.toml";

/// Loads and validates a configuration file.
///
/// `path` may name the file itself or a directory containing
/// `verisim.toml`.
pub fn load_config(path: &Path) -> Result<VerisimConfig, ConfigError> {
    let file = if path.is_dir() {
        path.join(CONFIG_FILE_NAME)
    } else {
        path.to_path_buf()
    };
    let content = std::fs::read_to_string(&file)
        .map_err(|source| ConfigError::IoError { path: file.clone(), source })?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<VerisimConfig, ConfigError> {
    let config: VerisimConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Resolves the configuration for a run.
///
/// An explicit path must exist. Otherwise `<dir>/verisim.toml` is used when
/// present, and built-in defaults when not.
pub fn find_config(explicit: Option<&Path>, dir: &Path) -> Result<VerisimConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    let candidate = dir.join(CONFIG_FILE_NAME);
    if candidate.is_file() {
        load_config(&candidate)
    } else {
        Ok(VerisimConfig::default())
    }
}

/// Checks value ranges serde cannot express.
fn validate_config(config: &VerisimConfig) -> Result<(), ConfigError> {
    if config.render.columns < MIN_COLUMNS {
        return Err(ConfigError::ValidationError(format!(
            "render.columns must be at least {MIN_COLUMNS}, got {}",
            config.render.columns
        )));
    }
    if let Some(pos) = config.view.signals.iter().position(|s| s.trim().is_empty()) {
        return Err(ConfigError::ValidationError(format!(
            "view.signals[{pos}] is empty"
        )));
    }
    Ok(())
}
