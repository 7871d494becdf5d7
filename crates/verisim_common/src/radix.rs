//! Number bases used when a multi-bit value is shown as text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The base used for bus labels and exported values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Radix {
    /// Lowercase hexadecimal with `X`/`Z` digits (default).
    #[default]
    Hex,
    /// One symbol per bit, most significant first.
    Binary,
    /// Unsigned decimal; undefined or over-wide values fall back to
    /// `h`-prefixed hex.
    Decimal,
}

impl fmt::Display for Radix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Radix::Hex => write!(f, "hex"),
            Radix::Binary => write!(f, "binary"),
            Radix::Decimal => write!(f, "decimal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_hex() {
        assert_eq!(Radix::default(), Radix::Hex);
    }

    #[test]
    fn serde_lowercase_names() {
        assert_eq!(serde_json::to_string(&Radix::Binary).unwrap(), "\"binary\"");
        let r: Radix = serde_json::from_str("\"decimal\"").unwrap();
        assert_eq!(r, Radix::Decimal);
    }

    #[test]
    fn display_matches_serde() {
        assert_eq!(Radix::Hex.to_string(), "hex");
        assert_eq!(Radix::Decimal.to_string(), "decimal");
    }
}
