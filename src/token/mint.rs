//! Minting seam between reconstructed keypairs and the chain.

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use super::TokenMetadata;
use crate::crypto::{Address, Keypair};
use crate::error::{MintError, Result};

/// SPL Token-2022 program id.
pub const TOKEN_2022_PROGRAM_ID: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";

/// Decimals used for every minted token.
pub const DEFAULT_DECIMALS: u8 = 9;

/// Everything needed to create a Token-2022 mint with on-mint metadata.
#[derive(Debug)]
pub struct MintRequest<'a> {
    /// The vanity mint keypair; it must co-sign account creation
    pub mint: &'a Keypair,
    /// Wallet paying for the accounts and holding mint/update authority
    pub payer: Address,
    pub metadata: TokenMetadata,
    pub uri: String,
    pub decimals: u8,
}

#[derive(Serialize)]
struct MintIntent<'a> {
    program: &'static str,
    mint: String,
    payer: String,
    name: &'a str,
    symbol: &'a str,
    uri: &'a str,
    description: &'a str,
    decimals: u8,
}

impl MintRequest<'_> {
    /// Canonical JSON describing the mint, signed by the mint keypair.
    pub fn intent_bytes(&self) -> Result<Vec<u8>> {
        let intent = MintIntent {
            program: TOKEN_2022_PROGRAM_ID,
            mint: self.mint.address().to_base58(),
            payer: self.payer.to_base58(),
            name: &self.metadata.name,
            symbol: &self.metadata.symbol,
            uri: &self.uri,
            description: &self.metadata.description,
            decimals: self.decimals,
        };
        Ok(serde_json::to_vec(&intent)?)
    }
}

/// How far a mint got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintStatus {
    /// The transaction landed on chain
    Confirmed,
    /// Only the mint keypair signed; the payer still has to co-sign and submit
    PartiallySigned,
}

/// Result of a mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    pub mint: Address,
    /// Base58 signature
    pub signature: String,
    pub status: MintStatus,
}

impl MintReceipt {
    #[inline]
    pub fn is_confirmed(&self) -> bool {
        self.status == MintStatus::Confirmed
    }
}

/// Interface for turning a mint request into an on-chain token.
#[async_trait]
pub trait ChainMintingService: Send + Sync {
    async fn mint(&self, request: MintRequest<'_>) -> Result<MintReceipt>;
}

/// Produces the mint keypair's partial signature over the mint intent.
///
/// Nothing is submitted; the payer's wallet adds its signature and sends
/// the transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialSigner;

#[async_trait]
impl ChainMintingService for PartialSigner {
    async fn mint(&self, request: MintRequest<'_>) -> Result<MintReceipt> {
        if request.metadata.name.is_empty() || request.metadata.symbol.is_empty() {
            return Err(MintError::TransactionFailure(
                "metadata is missing name or symbol".into(),
            ));
        }

        let message = request.intent_bytes()?;
        let signature = request.mint.sign(&message);
        let signature = bs58::encode(signature.to_bytes()).into_string();

        info!(
            mint = %request.mint.address(),
            payer = %request.payer,
            "Signed mint intent"
        );

        Ok(MintReceipt {
            mint: *request.mint.address(),
            signature,
            status: MintStatus::PartiallySigned,
        })
    }
}
