//! Prefix pattern matching on base58 addresses.

use crate::config::ConfigError;
use crate::crypto::Address;

/// The base58 alphabet used for Solana addresses.
pub const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Result of a pattern match operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// Full match found
    Match,
    /// No match
    NoMatch,
}

impl MatchResult {
    #[inline]
    pub fn is_match(self) -> bool {
        matches!(self, MatchResult::Match)
    }
}

/// A case-insensitive prefix over the leading characters of an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// The requested prefix as given
    requested: String,
    /// The compared prefix: first `match_length` chars, lowercased
    prefix: String,
}

impl Pattern {
    /// Creates a pattern comparing the first `match_length` characters of
    /// `prefix` against the start of each address.
    ///
    /// A prefix shorter than `match_length` is rejected rather than
    /// compared on fewer characters.
    pub fn prefix(prefix: &str, match_length: usize) -> Result<Self, ConfigError> {
        if match_length == 0 {
            return Err(ConfigError::InvalidPattern(
                "Match length must be at least 1".into(),
            ));
        }

        let available = prefix.chars().count();
        if available < match_length {
            return Err(ConfigError::InvalidPattern(format!(
                "Prefix '{}' has {} characters but match length is {}",
                prefix, available, match_length
            )));
        }

        let compared: String = prefix.chars().take(match_length).collect();
        if let Some(c) = compared.chars().find(|&c| alphabet_matches(c) == 0) {
            return Err(ConfigError::InvalidPattern(format!(
                "'{}' can never appear in a base58 address",
                c
            )));
        }

        Ok(Self {
            requested: prefix.to_string(),
            prefix: compared.to_ascii_lowercase(),
        })
    }

    /// Returns the prefix as requested by the caller.
    pub fn requested(&self) -> &str {
        &self.requested
    }

    /// Returns the normalized prefix actually compared.
    pub fn pattern(&self) -> &str {
        &self.prefix
    }

    /// Returns the number of characters compared.
    pub fn match_length(&self) -> usize {
        self.prefix.len()
    }

    /// Matches an address against this pattern.
    #[inline]
    pub fn matches(&self, address: &Address) -> MatchResult {
        if self.matches_text(&address.to_base58()) {
            MatchResult::Match
        } else {
            MatchResult::NoMatch
        }
    }

    /// Matches the base58 text of an address.
    #[inline]
    pub fn matches_text(&self, address: &str) -> bool {
        address.len() >= self.prefix.len()
            && address.as_bytes()[..self.prefix.len()].eq_ignore_ascii_case(self.prefix.as_bytes())
    }

    /// Returns the expected number of attempts to find a match, assuming
    /// uniformly distributed address characters.
    ///
    /// Each compared character matches 1 or 2 alphabet symbols depending on
    /// whether both of its cases are valid base58.
    pub fn estimated_difficulty(&self) -> u64 {
        let expected = self
            .prefix
            .chars()
            .map(|c| 58.0 / alphabet_matches(c) as f64)
            .product::<f64>();

        if expected >= u64::MAX as f64 {
            u64::MAX
        } else {
            expected.round() as u64
        }
    }

    /// Returns a human-readable difficulty estimate.
    pub fn difficulty_description(&self) -> String {
        let diff = self.estimated_difficulty();
        match diff {
            0..=1_000 => "Very Easy (< 1 second)".into(),
            1_001..=100_000 => "Easy (seconds)".into(),
            100_001..=10_000_000 => "Medium (minutes)".into(),
            10_000_001..=1_000_000_000 => "Hard (hours)".into(),
            _ => "Very Hard (days or more)".into(),
        }
    }
}

/// Number of base58 symbols equal to `c` ignoring ASCII case.
fn alphabet_matches(c: char) -> usize {
    BASE58_ALPHABET
        .chars()
        .filter(|a| a.eq_ignore_ascii_case(&c))
        .count()
}
