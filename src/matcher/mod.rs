//! Pattern matching for base58 addresses.
//!
//! Matching is on the address text, not raw bytes, and ignores ASCII case.

mod pattern;

pub use pattern::{MatchResult, Pattern, BASE58_ALPHABET};
