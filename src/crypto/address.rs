//! Solana address representation and utilities.

use std::fmt;
use std::str::FromStr;

use crate::error::MintError;

/// Length of an ed25519 public key, which is also the account address.
pub const ADDRESS_LENGTH: usize = 32;

/// A Solana account address (32-byte ed25519 public key).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Creates an address from raw bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Returns the address as raw bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Returns the base58 text form used everywhere an address is shown or stored.
    #[inline]
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

impl FromStr for Address {
    type Err = MintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = bs58::decode(s.trim())
            .into_vec()
            .map_err(|e| MintError::InvalidAddress(format!("{}: {}", s, e)))?;

        let bytes: [u8; ADDRESS_LENGTH] = decoded.try_into().map_err(|v: Vec<u8>| {
            MintError::InvalidAddress(format!(
                "{}: expected {} bytes, got {}",
                s,
                ADDRESS_LENGTH,
                v.len()
            ))
        })?;

        Ok(Self(bytes))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_base58())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}
