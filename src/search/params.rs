//! Search parameters and their defaults.

use std::time::Duration;

use crate::config::ConfigError;
use crate::matcher::Pattern;

/// Prefix used when none is given.
pub const DEFAULT_PREFIX: &str = "cbr";
/// Characters compared when the caller does not say otherwise.
pub const DEFAULT_MATCH_LENGTH: usize = 4;
/// Attempt budget per search.
pub const DEFAULT_MAX_ATTEMPTS: u64 = 10_000_000;
/// Wall-clock budget per search.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Attempts between yield points.
pub const DEFAULT_BATCH_SIZE: u64 = 1_000;

/// What to search for and how long to try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub prefix: String,
    pub prefix_match_length: usize,
    pub max_attempts: u64,
    pub timeout: Duration,
    pub batch_size: u64,
}

impl SearchParams {
    /// Creates parameters for `prefix` with the default budgets.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            prefix_match_length: DEFAULT_MATCH_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout: DEFAULT_TIMEOUT,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_match_length(mut self, match_length: usize) -> Self {
        self.prefix_match_length = match_length;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Validates the budgets and compiles the prefix pattern.
    pub fn pattern(&self) -> Result<Pattern, ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidBudget(
                "max attempts must be greater than 0".into(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidBudget(
                "timeout must be greater than 0".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBudget(
                "batch size must be greater than 0".into(),
            ));
        }

        Pattern::prefix(&self.prefix, self.prefix_match_length)
    }
}

impl Default for SearchParams {
    /// The whole default prefix with the default budgets.
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX).with_match_length(DEFAULT_PREFIX.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = SearchParams::new("cybr");
        assert_eq!(params.prefix_match_length, 4);
        assert_eq!(params.max_attempts, 10_000_000);
        assert_eq!(params.timeout, Duration::from_secs(30));
        assert!(params.pattern().is_ok());
    }

    #[test]
    fn test_default_params_compile() {
        let params = SearchParams::default();
        assert_eq!(params.prefix, "cbr");
        assert_eq!(params.pattern().unwrap().match_length(), 3);
    }

    #[test]
    fn test_zero_budgets_rejected() {
        let base = SearchParams::new("cbr").with_match_length(3);
        assert!(base.clone().with_max_attempts(0).pattern().is_err());
        assert!(base.clone().with_timeout(Duration::ZERO).pattern().is_err());
        assert!(base.with_batch_size(0).pattern().is_err());
    }
}
