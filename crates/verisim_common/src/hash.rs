//! Dump fingerprints.
//!
//! The lexer feeds every byte it reads into a [`ContentHasher`], so a built
//! trace carries the XXH3-128 of the exact input it came from. Two traces
//! with equal fingerprints were built from identical bytes.

use std::fmt;

use serde::{Serialize, Serializer};
use xxhash_rust::xxh3::{xxh3_128, Xxh3};

/// XXH3-128 fingerprint of a dump's bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ContentHash(u128);

impl ContentHash {
    /// Fingerprints a complete buffer.
    pub fn of(data: &[u8]) -> Self {
        Self(xxh3_128(data))
    }
}

/// Lower-case hex, always 32 digits.
impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Streaming counterpart of [`ContentHash::of`].
///
/// Any chunking of the same bytes gives the same fingerprint.
#[derive(Clone, Default)]
pub struct ContentHasher(Xxh3);

impl ContentHasher {
    /// Creates a hasher with no input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends bytes.
    pub fn update(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    /// Fingerprint of everything fed so far.
    pub fn finish(&self) -> ContentHash {
        ContentHash(self.0.digest128())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &[u8] = b"$timescale 1ns $end\n$enddefinitions $end\n#0\n";

    #[test]
    fn equal_bytes_equal_fingerprint() {
        assert_eq!(ContentHash::of(DUMP), ContentHash::of(DUMP));
        assert_ne!(ContentHash::of(DUMP), ContentHash::of(b"#0\n"));
    }

    #[test]
    fn chunking_does_not_matter() {
        let mut whole = ContentHasher::new();
        whole.update(DUMP);
        let mut lines = ContentHasher::new();
        for line in DUMP.split_inclusive(|&b| b == b'\n') {
            lines.update(line);
        }
        assert_eq!(whole.finish(), lines.finish());
        assert_eq!(lines.finish(), ContentHash::of(DUMP));
    }

    #[test]
    fn empty_input() {
        assert_eq!(ContentHasher::new().finish(), ContentHash::of(b""));
    }

    #[test]
    fn hex_display_is_fixed_width() {
        let s = ContentHash::of(DUMP).to_string();
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(format!("{}", ContentHash(1)), format!("{}1", "0".repeat(31)));
    }

    #[test]
    fn serializes_as_hex_string() {
        let h = ContentHash::of(DUMP);
        let json = serde_json::to_value(h).unwrap();
        assert_eq!(json, serde_json::Value::String(h.to_string()));
    }
}
