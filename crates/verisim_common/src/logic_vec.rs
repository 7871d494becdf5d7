//! Packed vectors of 4-state logic values for signal values in a trace.

use crate::logic::Logic;
use crate::radix::Radix;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A vector of 4-state [`Logic`] values packed for efficient storage.
///
/// Each logic value occupies 2 bits (encoding 4 states), with 32 values packed
/// per `u64` word. Index 0 is the least significant bit; text forms are
/// written most significant bit first, as in a value-change dump.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicVec {
    width: u32,
    /// Packed storage: 2 bits per logic value, 32 values per u64.
    data: Vec<u64>,
}

/// Number of logic values packed per u64 word.
const VALUES_PER_WORD: u32 = 32;

/// Lowercase hex digits indexed by nibble value.
const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

impl LogicVec {
    /// Creates a new `LogicVec` of the given width, initialized to all `Zero`.
    pub fn new(width: u32) -> Self {
        let num_words = word_count(width);
        Self {
            width,
            data: vec![0; num_words],
        }
    }

    /// Creates a `LogicVec` with every position set to `value`.
    pub fn filled(width: u32, value: Logic) -> Self {
        // 0b01 repeated 32 times, scaled by the 2-bit encoding of `value`.
        let pattern = (value as u64) * 0x5555_5555_5555_5555;
        let mut data = vec![pattern; word_count(width)];
        let used = width % VALUES_PER_WORD;
        if used != 0 {
            if let Some(last) = data.last_mut() {
                *last &= (1u64 << (used * 2)) - 1;
            }
        }
        Self { width, data }
    }

    /// Creates an all-`X` vector, the value of a signal nothing has driven yet.
    pub fn undefined(width: u32) -> Self {
        Self::filled(width, Logic::X)
    }

    /// Returns the number of logic values in this vector.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Gets the logic value at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> Logic {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word_idx = (index / VALUES_PER_WORD) as usize;
        let bit_offset = (index % VALUES_PER_WORD) * 2;
        let bits = (self.data[word_idx] >> bit_offset) & 0b11;
        match bits {
            0 => Logic::Zero,
            1 => Logic::One,
            2 => Logic::X,
            3 => Logic::Z,
            _ => unreachable!(),
        }
    }

    /// Sets the logic value at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32, value: Logic) {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word_idx = (index / VALUES_PER_WORD) as usize;
        let bit_offset = (index % VALUES_PER_WORD) * 2;
        let mask = !(0b11u64 << bit_offset);
        self.data[word_idx] = (self.data[word_idx] & mask) | ((value as u64) << bit_offset);
    }

    /// Converts the `LogicVec` to a `u128`, if all bits are definite and the
    /// width is at most 128 bits.
    pub fn to_u128(&self) -> Option<u128> {
        if self.width > 128 {
            return None;
        }
        let mut result = 0u128;
        for i in 0..self.width {
            match self.get(i) {
                Logic::Zero => {}
                Logic::One => result |= 1 << i,
                Logic::X | Logic::Z => return None,
            }
        }
        Some(result)
    }

    /// Returns true if every position is a driven `0` or `1`.
    pub fn is_fully_defined(&self) -> bool {
        (0..self.width).all(|i| self.get(i).is_defined())
    }

    /// Parses a binary string like `"10XZ"` into a `LogicVec`.
    ///
    /// The leftmost character is the most significant bit (highest index).
    /// Returns `None` if the string is empty or contains invalid characters.
    pub fn from_binary_str(s: &str) -> Option<Self> {
        if s.is_empty() {
            return None;
        }
        let width = s.len() as u32;
        let mut v = Self::new(width);
        for (i, &b) in s.as_bytes().iter().rev().enumerate() {
            v.set(i as u32, Logic::from_symbol(b)?);
        }
        Some(v)
    }

    /// Widens the vector to `width` following IEEE 1364 left-extension.
    ///
    /// New positions take `X` or `Z` when the current most significant bit
    /// is `X` or `Z`, and `0` otherwise. Returns a clone when `width` is not
    /// larger than the current width.
    pub fn left_extend(&self, width: u32) -> Self {
        if width <= self.width {
            return self.clone();
        }
        let fill = match self.width.checked_sub(1).map(|msb| self.get(msb)) {
            Some(Logic::X) => Logic::X,
            Some(Logic::Z) => Logic::Z,
            _ => Logic::Zero,
        };
        let mut v = Self::filled(width, fill);
        for i in 0..self.width {
            v.set(i, self.get(i));
        }
        v
    }

    /// Formats the value as lowercase hex, most significant digit first.
    ///
    /// A digit whose bits are all `Z` prints as `Z`; a digit with any other
    /// mix of `X`/`Z` bits prints as `X`.
    pub fn to_hex_string(&self) -> String {
        let digits = self.width.div_ceil(4);
        let mut s = String::with_capacity(digits as usize);
        for d in (0..digits).rev() {
            let lo = d * 4;
            let hi = (lo + 4).min(self.width);
            let mut nibble = 0usize;
            let mut unknown = 0;
            let mut floating = 0;
            for i in lo..hi {
                match self.get(i) {
                    Logic::Zero => {}
                    Logic::One => nibble |= 1 << (i - lo),
                    Logic::X => unknown += 1,
                    Logic::Z => floating += 1,
                }
            }
            let ch = if floating == hi - lo {
                'Z'
            } else if unknown + floating > 0 {
                'X'
            } else {
                HEX_DIGITS[nibble] as char
            };
            s.push(ch);
        }
        s
    }

    /// Formats the value in the given radix.
    ///
    /// Decimal needs a fully defined value of at most 128 bits; anything else
    /// falls back to the hex form behind an `h` marker, e.g. `h1X`.
    pub fn format_radix(&self, radix: Radix) -> String {
        match radix {
            Radix::Hex => self.to_hex_string(),
            Radix::Binary => self.to_string(),
            Radix::Decimal => match self.to_u128() {
                Some(v) => v.to_string(),
                None => format!("h{}", self.to_hex_string()),
            },
        }
    }
}

impl fmt::Display for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", self.get(i))?;
        }
        Ok(())
    }
}

impl fmt::Debug for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicVec({self})")
    }
}

/// Returns the number of u64 words needed to store `width` logic values.
fn word_count(width: u32) -> usize {
    width.div_ceil(VALUES_PER_WORD) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> LogicVec {
        LogicVec::from_binary_str(s).unwrap()
    }

    #[test]
    fn new_and_width() {
        let v = LogicVec::new(8);
        assert_eq!(v.width(), 8);
    }

    #[test]
    fn set_get_roundtrip() {
        let mut v = LogicVec::new(4);
        v.set(0, Logic::Zero);
        v.set(1, Logic::One);
        v.set(2, Logic::X);
        v.set(3, Logic::Z);
        assert_eq!(v.get(0), Logic::Zero);
        assert_eq!(v.get(1), Logic::One);
        assert_eq!(v.get(2), Logic::X);
        assert_eq!(v.get(3), Logic::Z);
    }

    #[test]
    fn undefined_is_all_x() {
        let v = LogicVec::undefined(4);
        assert_eq!(format!("{v}"), "XXXX");
        assert!(!v.is_fully_defined());
    }

    #[test]
    fn filled_matches_per_bit_set() {
        // Spans two words with a partial last word.
        let filled = LogicVec::filled(40, Logic::Z);
        let mut manual = LogicVec::new(40);
        for i in 0..40 {
            manual.set(i, Logic::Z);
        }
        assert_eq!(filled, manual);
    }

    #[test]
    fn from_binary_str() {
        let v = LogicVec::from_binary_str("10XZ").unwrap();
        assert_eq!(v.width(), 4);
        assert_eq!(v.get(3), Logic::One); // MSB
        assert_eq!(v.get(2), Logic::Zero);
        assert_eq!(v.get(1), Logic::X);
        assert_eq!(v.get(0), Logic::Z); // LSB
    }

    #[test]
    fn from_binary_str_invalid() {
        assert!(LogicVec::from_binary_str("10A1").is_none());
        assert!(LogicVec::from_binary_str("").is_none());
    }

    #[test]
    fn to_u128_defined_only() {
        assert_eq!(bits("10100101").to_u128(), Some(0xA5));
        assert_eq!(bits("1x").to_u128(), None);
        assert_eq!(LogicVec::filled(129, Logic::Zero).to_u128(), None);
    }

    #[test]
    fn left_extend_zero_fill() {
        let v = LogicVec::from_binary_str("101").unwrap().left_extend(8);
        assert_eq!(format!("{v}"), "00000101");
    }

    #[test]
    fn left_extend_x_and_z_fill() {
        let v = LogicVec::from_binary_str("x1").unwrap().left_extend(4);
        assert_eq!(format!("{v}"), "XXX1");
        let v = LogicVec::from_binary_str("z0").unwrap().left_extend(4);
        assert_eq!(format!("{v}"), "ZZZ0");
    }

    #[test]
    fn hex_defined() {
        assert_eq!(bits("10100101").to_hex_string(), "a5");
        assert_eq!(bits("0001").to_hex_string(), "1");
        // 5 bits needs two digits
        assert_eq!(bits("11111").to_hex_string(), "1f");
    }

    #[test]
    fn hex_symbolic_digits() {
        assert_eq!(LogicVec::undefined(4).to_hex_string(), "X");
        assert_eq!(
            LogicVec::from_binary_str("ZZZZ0001").unwrap().to_hex_string(),
            "Z1"
        );
        assert_eq!(LogicVec::from_binary_str("10XZ").unwrap().to_hex_string(), "X");
        assert_eq!(LogicVec::from_binary_str("0Z").unwrap().to_hex_string(), "X");
    }

    #[test]
    fn format_radix_variants() {
        let v = bits("1010");
        assert_eq!(v.format_radix(Radix::Hex), "a");
        assert_eq!(v.format_radix(Radix::Binary), "1010");
        assert_eq!(v.format_radix(Radix::Decimal), "10");
    }

    #[test]
    fn decimal_falls_back_to_hex_when_undefined() {
        let v = LogicVec::from_binary_str("0001XXXX").unwrap();
        assert_eq!(v.format_radix(Radix::Decimal), "h1X");
        // wider than 128 bits, fully defined
        let wide = LogicVec::filled(130, Logic::One);
        assert!(wide.format_radix(Radix::Decimal).starts_with("h3ff"));
    }

    #[test]
    fn display() {
        let v = LogicVec::from_binary_str("10xz").unwrap();
        assert_eq!(format!("{v}"), "10XZ");
    }

    #[test]
    fn large_width_spanning_words() {
        let mut v = LogicVec::new(100);
        v.set(0, Logic::One);
        v.set(50, Logic::X);
        v.set(99, Logic::Z);
        assert_eq!(v.get(0), Logic::One);
        assert_eq!(v.get(50), Logic::X);
        assert_eq!(v.get(99), Logic::Z);
        assert_eq!(v.get(1), Logic::Zero);
    }

    #[test]
    fn serde_roundtrip() {
        let v = LogicVec::from_binary_str("10XZ1010").unwrap();
        let json = serde_json::to_string(&v).unwrap();
        let back: LogicVec = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
