//! Token creation and minting flows.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use super::{
    ChainMintingService, MetadataService, MintReceipt, MintRequest, NewTokenRecord,
    TokenMetadata, TokenRecord, TokenRecordStore, DEFAULT_DECIMALS,
};
use crate::crypto::{Address, SecretCodec};
use crate::error::{MintError, Result};
use crate::search::{SearchParams, VanitySearch};

/// A token whose metadata and encrypted mint keypair are stored.
#[derive(Debug, Clone)]
pub struct CreatedToken {
    pub id: u64,
    pub token_address: Address,
    pub metadata_uri: String,
    pub attempts: u64,
    pub elapsed: Duration,
}

/// Wires the search, codec and collaborators into the two user flows.
pub struct TokenService {
    metadata: Arc<dyn MetadataService>,
    store: Arc<dyn TokenRecordStore>,
    minter: Arc<dyn ChainMintingService>,
    codec: SecretCodec,
    search: SearchParams,
}

impl TokenService {
    pub fn new(
        metadata: Arc<dyn MetadataService>,
        store: Arc<dyn TokenRecordStore>,
        minter: Arc<dyn ChainMintingService>,
        codec: SecretCodec,
        search: SearchParams,
    ) -> Self {
        Self {
            metadata,
            store,
            minter,
            codec,
            search,
        }
    }

    /// Uploads metadata, finds a vanity mint keypair, encrypts its secret
    /// and stores the record.
    ///
    /// Nothing is uploaded when the passphrase is missing.
    #[instrument(skip(self, metadata, image), fields(name = %metadata.name))]
    pub async fn create_token_info(
        &self,
        wallet: &Address,
        metadata: &TokenMetadata,
        image: Vec<u8>,
        file_name: &str,
    ) -> Result<CreatedToken> {
        metadata.validate()?;
        if !self.codec.is_configured() {
            return Err(MintError::ConfigMissing);
        }

        info!("Uploading metadata");
        let metadata_uri = self.metadata.upload(image, file_name, metadata).await?;
        info!(uri = %metadata_uri, "Metadata uploaded");

        let found = VanitySearch::new(&self.search)?.run_async().await?;
        let token_address = *found.keypair.address();
        let encrypted_secret = self.codec.encrypt_keypair(&found.keypair)?;

        let id = self
            .store
            .save(NewTokenRecord {
                wallet_address: wallet.to_base58(),
                token_address: token_address.to_base58(),
                metadata_uri: metadata_uri.clone(),
                encrypted_secret,
            })
            .await?;

        info!(id, token = %token_address, "Token information saved");
        Ok(CreatedToken {
            id,
            token_address,
            metadata_uri,
            attempts: found.attempts,
            elapsed: found.elapsed,
        })
    }

    /// Returns all stored tokens, newest first.
    pub async fn list_tokens(&self) -> Result<Vec<TokenRecord>> {
        self.store.list_all().await
    }

    /// Rebuilds the stored mint keypair and mints the token.
    ///
    /// The keypair must reproduce the stored address before anything is
    /// handed to the minting service. The record is flagged minted only
    /// for a confirmed receipt; a partially signed mint can be re-run.
    #[instrument(skip(self))]
    pub async fn mint_token(&self, id: u64, payer: &Address) -> Result<MintReceipt> {
        let record = self
            .store
            .get(id)
            .await?
            .ok_or(MintError::RecordNotFound(id))?;
        if record.is_minted {
            return Err(MintError::AlreadyMinted(id));
        }

        let expected = record.token_address()?;
        let mint = self
            .codec
            .decrypt_keypair(&record.encrypted_secret, &expected)
            .inspect_err(|e| warn!(id, error = %e, "Refusing to mint"))?;

        let metadata = self.metadata.fetch(&record.metadata_uri).await?;

        let receipt = self
            .minter
            .mint(MintRequest {
                mint: &mint,
                payer: *payer,
                metadata,
                uri: record.metadata_uri.clone(),
                decimals: DEFAULT_DECIMALS,
            })
            .await?;

        if receipt.is_confirmed() {
            self.store.mark_minted(id).await?;
            info!(id, mint = %receipt.mint, "Token minted");
        } else {
            info!(id, mint = %receipt.mint, "Mint signed, awaiting payer submission");
        }
        Ok(receipt)
    }
}
