//! # vanity_mint
//!
//! Vanity Solana mint keypairs, stored encrypted until the token is minted.
//!
//! ## Architecture
//!
//! - `crypto`: Keypairs, base58 addresses and the secret codec
//! - `matcher`: Address prefix matching
//! - `search`: The vanity search state machine and its drivers
//! - `token`: Metadata upload, record storage and the create/mint flows
//! - `config`: Runtime configuration

pub mod config;
pub mod crypto;
pub mod error;
pub mod matcher;
pub mod search;
pub mod token;

pub use config::{Config, ConfigError};
pub use crypto::{Address, KeyDerivation, Keypair, SecretCodec};
pub use error::{MintError, Result};
pub use matcher::{MatchResult, Pattern};
pub use search::{generate, SearchParams, SearchRunner, SearchState, VanityMatch, VanitySearch};
pub use token::{TokenMetadata, TokenRecord, TokenService};
