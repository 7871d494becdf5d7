//! Error types for configuration loading and validation.

use std::path::PathBuf;

/// Errors that can occur when loading or validating a `verisim.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    IoError {
        /// The file that was opened.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// The TOML is malformed, has the wrong types, or has unknown keys.
    #[error("invalid verisim.toml: {0}")]
    ParseError(String),

    /// A value is well-typed but out of range.
    #[error("invalid setting: {0}")]
    ValidationError(String),
}
