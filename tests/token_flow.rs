//! End-to-end create and mint flows over in-memory collaborators.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use vanity_mint::token::{
    ChainMintingService, FileStore, MemoryStore, MetadataService, MintReceipt, MintRequest,
    MintStatus, NewTokenRecord, TokenRecordStore, DEFAULT_DECIMALS,
};
use vanity_mint::{
    Address, KeyDerivation, Keypair, MintError, SearchParams, SecretCodec, TokenMetadata,
    TokenService,
};

struct StaticMetadata;

#[async_trait]
impl MetadataService for StaticMetadata {
    async fn upload(&self, _: Vec<u8>, _: &str, _: &TokenMetadata) -> vanity_mint::Result<String> {
        Ok("https://ipfs.io/ipfs/QmMeta".to_string())
    }

    async fn fetch(&self, _: &str) -> vanity_mint::Result<TokenMetadata> {
        Ok(TokenMetadata::new("Cyber", "CBR", "A token")
            .with_image("https://ipfs.io/ipfs/QmImage"))
    }
}

#[derive(Debug, Clone)]
struct Minted {
    mint: Address,
    payer: Address,
    uri: String,
    decimals: u8,
}

#[derive(Default)]
struct RecordingMinter {
    calls: Mutex<Vec<Minted>>,
}

#[async_trait]
impl ChainMintingService for RecordingMinter {
    async fn mint(&self, request: MintRequest<'_>) -> vanity_mint::Result<MintReceipt> {
        self.calls.lock().push(Minted {
            mint: *request.mint.address(),
            payer: request.payer,
            uri: request.uri.clone(),
            decimals: request.decimals,
        });
        Ok(MintReceipt {
            mint: *request.mint.address(),
            signature: "sig".to_string(),
            status: MintStatus::Confirmed,
        })
    }
}

fn search() -> SearchParams {
    SearchParams::new("a")
        .with_match_length(1)
        .with_timeout(Duration::from_secs(30))
}

fn service(
    store: Arc<dyn TokenRecordStore>,
    minter: Arc<RecordingMinter>,
    passphrase: &str,
) -> TokenService {
    TokenService::new(
        Arc::new(StaticMetadata),
        store,
        minter,
        SecretCodec::new(Some(passphrase), KeyDerivation::Padded).unwrap(),
        search(),
    )
}

fn metadata() -> TokenMetadata {
    TokenMetadata::new("Cyber", "CBR", "A token")
}

#[tokio::test]
async fn test_created_token_mints_with_matching_keypair() {
    let store = Arc::new(MemoryStore::new());
    let minter = Arc::new(RecordingMinter::default());
    let service = service(store.clone(), minter.clone(), "hunter2");
    let wallet = Keypair::generate();

    let created = service
        .create_token_info(wallet.address(), &metadata(), vec![0u8; 4], "logo.png")
        .await
        .unwrap();
    service.mint_token(created.id, wallet.address()).await.unwrap();

    let calls = minter.calls.lock().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].mint, created.token_address);
    assert_eq!(&calls[0].payer, wallet.address());
    assert_eq!(calls[0].uri, "https://ipfs.io/ipfs/QmMeta");
    assert_eq!(calls[0].decimals, DEFAULT_DECIMALS);
}

#[tokio::test]
async fn test_swapped_token_address_is_never_minted() {
    let store = Arc::new(MemoryStore::new());
    let minter = Arc::new(RecordingMinter::default());
    let service = service(store.clone(), minter.clone(), "hunter2");
    let wallet = Keypair::generate();

    let created = service
        .create_token_info(wallet.address(), &metadata(), vec![1], "logo.png")
        .await
        .unwrap();
    let original = store.find(created.id).unwrap();

    // Same ciphertext, different claimed address.
    let id = store
        .save(NewTokenRecord {
            wallet_address: original.wallet_address.clone(),
            token_address: Keypair::generate().address().to_base58(),
            metadata_uri: original.metadata_uri.clone(),
            encrypted_secret: original.encrypted_secret.clone(),
        })
        .await
        .unwrap();

    let err = service.mint_token(id, wallet.address()).await.unwrap_err();
    assert!(matches!(err, MintError::AddressMismatch { .. }));
    assert!(minter.calls.lock().is_empty());
    assert!(!store.find(id).unwrap().is_minted);
}

#[tokio::test]
async fn test_wrong_passphrase_cannot_mint() {
    let store = Arc::new(MemoryStore::new());
    let minter = Arc::new(RecordingMinter::default());
    let wallet = Keypair::generate();

    let created = service(store.clone(), minter.clone(), "hunter2")
        .create_token_info(wallet.address(), &metadata(), vec![1], "logo.png")
        .await
        .unwrap();

    let err = service(store.clone(), minter.clone(), "hunter3")
        .mint_token(created.id, wallet.address())
        .await
        .unwrap_err();
    assert!(matches!(err, MintError::DecryptionFailure(_)));
    assert!(minter.calls.lock().is_empty());
}

#[tokio::test]
async fn test_minted_flag_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokens.json");
    let minter = Arc::new(RecordingMinter::default());
    let wallet = Keypair::generate();

    let created = {
        let store = Arc::new(FileStore::open(&path).await.unwrap());
        let service = service(store, minter.clone(), "hunter2");
        let created = service
            .create_token_info(wallet.address(), &metadata(), vec![1], "logo.png")
            .await
            .unwrap();
        service.mint_token(created.id, wallet.address()).await.unwrap();
        created
    };

    let reopened = Arc::new(FileStore::open(&path).await.unwrap());
    let record = reopened.get(created.id).await.unwrap().unwrap();
    assert!(record.is_minted);
    assert_eq!(record.token_address, created.token_address.to_base58());

    let err = service(reopened, minter.clone(), "hunter2")
        .mint_token(created.id, wallet.address())
        .await
        .unwrap_err();
    assert!(matches!(err, MintError::AlreadyMinted(_)));
    assert_eq!(minter.calls.lock().len(), 1);
}
