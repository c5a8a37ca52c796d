//! Cryptographic operations for Solana keys and secret storage.
//!
//! This module provides:
//! - Secure random ed25519 key generation
//! - Base58 address rendering and parsing
//! - Authenticated encryption of keypair secrets for storage

mod address;
mod codec;
mod keypair;

pub use address::{Address, ADDRESS_LENGTH};
pub use codec::{KeyDerivation, SecretCodec, KEY_LENGTH, NONCE_LENGTH, TAG_LENGTH};
pub use keypair::{Keypair, SECRET_LENGTH};
