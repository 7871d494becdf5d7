//! Parsing and validation of `verisim.toml` configuration files.
//!
//! This crate reads the optional configuration file and produces a
//! strongly-typed [`VerisimConfig`] with parser, render, export and view
//! defaults. Command-line flags override whatever it contains.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{find_config, load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
