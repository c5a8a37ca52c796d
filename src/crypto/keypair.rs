//! Solana (ed25519) keypair generation.

use std::fmt;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, KEYPAIR_LENGTH, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use super::Address;
use crate::error::{MintError, Result};

/// Length of the secret material handed to signers and the codec
/// (32-byte seed followed by the 32-byte public key).
pub const SECRET_LENGTH: usize = KEYPAIR_LENGTH;

/// Represents a Solana keypair (ed25519 signing key + derived address).
#[derive(Clone)]
pub struct Keypair {
    /// The signing key; zeroized on drop by ed25519-dalek
    signing_key: SigningKey,
    /// The derived address
    address: Address,
}

impl Keypair {
    /// Generates a new random keypair from the OS RNG.
    #[inline]
    pub fn generate() -> Self {
        Self::generate_with(&mut OsRng)
    }

    /// Generates a new random keypair from the given RNG.
    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::from_signing_key(SigningKey::generate(rng))
    }

    /// Builds a keypair deterministically from a 32-byte seed.
    pub fn from_seed(seed: [u8; SECRET_KEY_LENGTH]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(&seed))
    }

    /// Rebuilds a keypair from 64 bytes of `seed ‖ public key`.
    ///
    /// Fails if the length is wrong or the embedded public key does not
    /// belong to the seed.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: &[u8; KEYPAIR_LENGTH] = bytes.try_into().map_err(|_| {
            MintError::InvalidSecretKey(format!(
                "expected {} bytes, got {}",
                KEYPAIR_LENGTH,
                bytes.len()
            ))
        })?;

        let signing_key = SigningKey::from_keypair_bytes(bytes)
            .map_err(|e| MintError::InvalidSecretKey(e.to_string()))?;

        Ok(Self::from_signing_key(signing_key))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = Address::from_bytes(signing_key.verifying_key().to_bytes());
        Self {
            signing_key,
            address,
        }
    }

    /// Returns the 64-byte secret material.
    pub fn secret_bytes(&self) -> Zeroizing<[u8; SECRET_LENGTH]> {
        Zeroizing::new(self.signing_key.to_keypair_bytes())
    }

    /// Returns the secret as base58 text (the form wallets import).
    pub fn secret_base58(&self) -> Zeroizing<String> {
        let secret = self.secret_bytes();
        Zeroizing::new(bs58::encode(&secret[..]).into_string())
    }

    /// Returns a reference to the derived address.
    #[inline]
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Signs a message with this keypair.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }

    /// Verifies a signature against this keypair's public key.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.signing_key
            .verifying_key()
            .verify(message, signature)
            .is_ok()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
