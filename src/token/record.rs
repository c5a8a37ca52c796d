//! Token metadata and persisted token records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::Address;
use crate::error::{MintError, Result};

/// The metadata document pinned to IPFS for a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub description: String,
    /// Image URI, filled in once the image is pinned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl TokenMetadata {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            description: description.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Name and symbol are required.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.symbol.trim().is_empty() {
            return Err(MintError::InvalidMetadata(
                "token name and symbol are required".into(),
            ));
        }
        Ok(())
    }
}

/// A token record before the store assigns its id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTokenRecord {
    pub wallet_address: String,
    pub token_address: String,
    pub metadata_uri: String,
    pub encrypted_secret: String,
}

impl NewTokenRecord {
    /// All fields are required.
    pub fn validate(&self) -> Result<()> {
        let missing = [
            ("wallet_address", &self.wallet_address),
            ("token_address", &self.token_address),
            ("metadata_uri", &self.metadata_uri),
            ("encrypted_secret", &self.encrypted_secret),
        ]
        .iter()
        .filter(|(_, v)| v.is_empty())
        .map(|(k, _)| *k)
        .collect::<Vec<_>>();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MintError::Store(format!(
                "missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

/// A stored token awaiting (or done with) minting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub id: u64,
    pub wallet_address: String,
    pub token_address: String,
    pub metadata_uri: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_minted: bool,
    #[serde(alias = "hashed_private_key")]
    pub encrypted_secret: String,
}

impl TokenRecord {
    pub fn from_new(id: u64, record: NewTokenRecord, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            wallet_address: record.wallet_address,
            token_address: record.token_address,
            metadata_uri: record.metadata_uri,
            created_at,
            is_minted: false,
            encrypted_secret: record.encrypted_secret,
        }
    }

    /// Parses the stored mint address.
    pub fn token_address(&self) -> Result<Address> {
        self.token_address.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_requires_all_fields() {
        let record = NewTokenRecord {
            wallet_address: "w".into(),
            token_address: String::new(),
            metadata_uri: "u".into(),
            encrypted_secret: String::new(),
        };
        let err = record.validate().unwrap_err().to_string();
        assert!(err.contains("token_address"));
        assert!(err.contains("encrypted_secret"));
    }

    #[test]
    fn test_record_accepts_legacy_column_name() {
        let json = r#"{
            "id": 3,
            "wallet_address": "w",
            "token_address": "t",
            "metadata_uri": "u",
            "created_at": "2025-01-01T00:00:00Z",
            "is_minted": false,
            "hashed_private_key": "abcd"
        }"#;
        let record: TokenRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.encrypted_secret, "abcd");
    }

    #[test]
    fn test_metadata_json_shape() {
        let metadata =
            TokenMetadata::new("Cyber", "CBR", "desc").with_image("https://ipfs.io/ipfs/x");
        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["symbol"], "CBR");
        assert_eq!(value["image"], "https://ipfs.io/ipfs/x");

        let bare = serde_json::to_value(TokenMetadata::new("a", "b", "c")).unwrap();
        assert!(bare.get("image").is_none());
    }

    #[test]
    fn test_metadata_requires_name_and_symbol() {
        assert!(matches!(
            TokenMetadata::new("", "CBR", "").validate(),
            Err(MintError::InvalidMetadata(_))
        ));
        assert!(matches!(
            TokenMetadata::new("Cyber", " ", "").validate(),
            Err(MintError::InvalidMetadata(_))
        ));
        assert!(TokenMetadata::new("Cyber", "CBR", "").validate().is_ok());
    }
}
