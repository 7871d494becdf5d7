//! Shared foundational types used across the Verisim waveform engine.
//!
//! This crate provides 4-state logic values, packed logic vectors with
//! radix formatting, and content hashing of dump files.

#![warn(missing_docs)]

pub mod hash;
pub mod logic;
pub mod logic_vec;
pub mod radix;

pub use hash::{ContentHash, ContentHasher};
pub use logic::Logic;
pub use logic_vec::LogicVec;
pub use radix::Radix;
