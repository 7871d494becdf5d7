//! Dump time scales and conversion between ticks and physical time.
//!
//! A dump's body timestamps are integer ticks; the `$timescale` declaration
//! says how long one tick is. [`Timescale`] keeps the declared magnitude and
//! unit and converts both ways through femtoseconds.

use serde::Serialize;
use std::fmt;

/// Femtoseconds per picosecond.
pub const FS_PER_PS: u64 = 1_000;
/// Femtoseconds per nanosecond.
pub const FS_PER_NS: u64 = 1_000_000;
/// Femtoseconds per microsecond.
pub const FS_PER_US: u64 = 1_000_000_000;
/// Femtoseconds per millisecond.
pub const FS_PER_MS: u64 = 1_000_000_000_000;
/// Femtoseconds per second.
pub const FS_PER_S: u64 = 1_000_000_000_000_000;

/// A physical time unit accepted by `$timescale`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Seconds.
    S,
    /// Milliseconds.
    Ms,
    /// Microseconds.
    Us,
    /// Nanoseconds.
    Ns,
    /// Picoseconds.
    Ps,
    /// Femtoseconds.
    Fs,
}

impl TimeUnit {
    /// Parses a unit suffix such as `ns` (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "s" => Some(TimeUnit::S),
            "ms" => Some(TimeUnit::Ms),
            "us" => Some(TimeUnit::Us),
            "ns" => Some(TimeUnit::Ns),
            "ps" => Some(TimeUnit::Ps),
            "fs" => Some(TimeUnit::Fs),
            _ => None,
        }
    }

    /// Returns the number of femtoseconds in one of this unit.
    pub fn fs(self) -> u64 {
        match self {
            TimeUnit::S => FS_PER_S,
            TimeUnit::Ms => FS_PER_MS,
            TimeUnit::Us => FS_PER_US,
            TimeUnit::Ns => FS_PER_NS,
            TimeUnit::Ps => FS_PER_PS,
            TimeUnit::Fs => 1,
        }
    }

    /// Returns the unit's suffix.
    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::S => "s",
            TimeUnit::Ms => "ms",
            TimeUnit::Us => "us",
            TimeUnit::Ns => "ns",
            TimeUnit::Ps => "ps",
            TimeUnit::Fs => "fs",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The duration of one dump tick: a magnitude of 1, 10 or 100 times a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Timescale {
    /// 1, 10 or 100.
    pub magnitude: u32,
    /// The physical unit.
    pub unit: TimeUnit,
}

impl Default for Timescale {
    fn default() -> Self {
        Self {
            magnitude: 1,
            unit: TimeUnit::Fs,
        }
    }
}

impl Timescale {
    /// Parses the text of a `$timescale` declaration, e.g. `1ns`, `10 ps`.
    ///
    /// Returns `None` for a magnitude other than 1, 10 or 100, or an
    /// unknown unit.
    pub fn parse(text: &str) -> Option<Self> {
        let s: String = text.split_whitespace().collect();
        let digit_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (num, unit) = s.split_at(digit_end);
        let magnitude = match num {
            "1" => 1,
            "10" => 10,
            "100" => 100,
            _ => return None,
        };
        Some(Self {
            magnitude,
            unit: TimeUnit::parse(unit)?,
        })
    }

    /// Returns the number of femtoseconds per tick.
    pub fn fs_per_tick(&self) -> u64 {
        u64::from(self.magnitude) * self.unit.fs()
    }

    /// Converts a tick count to femtoseconds, saturating on overflow.
    pub fn ticks_to_fs(&self, ticks: u64) -> u64 {
        ticks.saturating_mul(self.fs_per_tick())
    }

    /// Converts a physical duration to ticks.
    ///
    /// Returns `None` when the duration is not an exact multiple of one
    /// tick or does not fit in 64 bits of femtoseconds.
    pub fn ticks_from(&self, amount: u64, unit: TimeUnit) -> Option<u64> {
        let fs = amount.checked_mul(unit.fs())?;
        let per = self.fs_per_tick();
        if fs % per != 0 {
            return None;
        }
        Some(fs / per)
    }

    /// Formats a tick count as the largest whole physical unit, e.g. `15 ns`.
    pub fn format_ticks(&self, ticks: u64) -> String {
        format_fs(self.ticks_to_fs(ticks))
    }
}

impl fmt::Display for Timescale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit)
    }
}

/// Formats femtoseconds using the largest unit that divides them exactly.
pub fn format_fs(fs: u64) -> String {
    if fs == 0 {
        return "0 fs".to_string();
    }
    for unit in [
        TimeUnit::S,
        TimeUnit::Ms,
        TimeUnit::Us,
        TimeUnit::Ns,
        TimeUnit::Ps,
    ] {
        let per = unit.fs();
        if fs >= per && fs % per == 0 {
            return format!("{} {}", fs / per, unit);
        }
    }
    format!("{fs} fs")
}
