//! Configuration types deserialized from `verisim.toml`.

use serde::Deserialize;
use verisim_common::Radix;

/// Default text render width in columns.
pub const DEFAULT_COLUMNS: u16 = 80;

/// Narrowest text render the waveform view accepts.
pub const MIN_COLUMNS: u16 = 8;

/// The top-level configuration parsed from `verisim.toml`.
///
/// Every section is optional; a missing file or section means defaults.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct VerisimConfig {
    /// Dump parser settings.
    #[serde(default)]
    pub parser: ParserConfig,
    /// Waveform render settings.
    #[serde(default)]
    pub render: RenderConfig,
    /// Change-table export settings.
    #[serde(default)]
    pub export: ExportConfig,
    /// Default signal selection.
    #[serde(default)]
    pub view: ViewConfig,
}

/// `[parser]` section.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ParserConfig {
    /// Left-extend vectors shorter than their declared width.
    #[serde(default)]
    pub extend_short_vectors: bool,
}

/// `[render]` section.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Number base for bus labels.
    #[serde(default)]
    pub radix: Radix,
    /// Total width of a text render, names included.
    #[serde(default = "default_columns")]
    pub columns: u16,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            radix: Radix::default(),
            columns: DEFAULT_COLUMNS,
        }
    }
}

fn default_columns() -> u16 {
    DEFAULT_COLUMNS
}

/// `[export]` section.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Output format.
    #[serde(default)]
    pub format: ExportFormat,
    /// Number base for exported values; falls back to `render.radix`.
    #[serde(default)]
    pub radix: Option<Radix>,
}

/// Change-table output format.
#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// `time,signal,value` rows (default).
    #[default]
    Csv,
    /// A JSON document of time steps.
    Json,
}

/// `[view]` section.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ViewConfig {
    /// Signals shown or exported when none are named on the command line.
    /// Empty means every signal.
    #[serde(default)]
    pub signals: Vec<String>,
}
