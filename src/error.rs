//! Error types for vanity search, secret encryption and the mint flow.

use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias using `MintError`.
pub type Result<T> = std::result::Result<T, MintError>;

/// Every failure the crate reports to its callers.
///
/// Search failures (`Timeout`, `AttemptsExhausted`, `Cancelled`) are final for
/// the call that produced them; callers may retry with different parameters.
/// `DecryptionFailure` is never worth retrying with the same inputs.
#[derive(Debug, Error)]
pub enum MintError {
    #[error("Timeout after {:.2} seconds ({attempts} attempts)", .elapsed.as_secs_f64())]
    Timeout { attempts: u64, elapsed: Duration },

    #[error("Could not generate matching address after {attempts} attempts")]
    AttemptsExhausted { attempts: u64 },

    #[error("Search cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },

    #[error("Private key secret is not configured")]
    ConfigMissing,

    #[error("Failed to encrypt private key: {0}")]
    EncryptionFailure(String),

    #[error("Failed to reconstruct private key: {0}")]
    DecryptionFailure(String),

    #[error("Invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("Reconstructed keypair {actual} does not match stored token address {expected}")]
    AddressMismatch { expected: String, actual: String },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid token metadata: {0}")]
    InvalidMetadata(String),

    #[error("Metadata upload failed: {0}")]
    UploadFailure(String),

    #[error("Metadata fetch failed: {0}")]
    MetadataFetch(String),

    #[error("Transaction failed: {0}")]
    TransactionFailure(String),

    #[error("Token record {0} not found")]
    RecordNotFound(u64),

    #[error("Token record {0} is already minted")]
    AlreadyMinted(u64),

    #[error("Token store error: {0}")]
    Store(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MintError {
    /// Returns true for the outcomes a vanity search can end with.
    pub fn is_search_failure(&self) -> bool {
        matches!(
            self,
            MintError::Timeout { .. }
                | MintError::AttemptsExhausted { .. }
                | MintError::Cancelled { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_failure_kinds() {
        assert!(MintError::AttemptsExhausted { attempts: 1 }.is_search_failure());
        assert!(MintError::Cancelled { attempts: 1 }.is_search_failure());
        assert!(!MintError::ConfigMissing.is_search_failure());
    }

    #[test]
    fn test_timeout_message() {
        let err = MintError::Timeout {
            attempts: 42,
            elapsed: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "Timeout after 1.50 seconds (42 attempts)");
    }
}
