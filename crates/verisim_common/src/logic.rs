//! The four value symbols a dump can carry for one bit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One bit of a dumped value.
///
/// `X` is what every signal holds before its first recorded change; `Z` is
/// an undriven net. Neither is ever treated as a `0`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum Logic {
    /// Driven low.
    Zero = 0,
    /// Driven high.
    One = 1,
    /// Unknown.
    X = 2,
    /// High impedance.
    Z = 3,
}

impl Logic {
    /// Parses a value-change symbol. Case is ignored for `x` and `z`.
    pub fn from_char(c: char) -> Option<Self> {
        if c.is_ascii() {
            Self::from_symbol(c as u8)
        } else {
            None
        }
    }

    /// Byte form of [`Logic::from_char`], used on raw dump text.
    pub fn from_symbol(b: u8) -> Option<Self> {
        Some(match b {
            b'0' => Logic::Zero,
            b'1' => Logic::One,
            b'x' | b'X' => Logic::X,
            b'z' | b'Z' => Logic::Z,
            _ => return None,
        })
    }

    /// The canonical upper-case symbol.
    pub fn symbol(self) -> char {
        ['0', '1', 'X', 'Z'][self as usize]
    }

    /// Returns true for a driven `0` or `1`.
    pub fn is_defined(self) -> bool {
        matches!(self, Logic::Zero | Logic::One)
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
