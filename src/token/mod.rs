//! Token metadata, persistence and the create/mint flows.

mod metadata;
mod mint;
mod record;
mod service;
mod store;

pub use metadata::{MetadataService, PinataClient, PinataConfig};
pub use mint::{
    ChainMintingService, MintReceipt, MintRequest, MintStatus, PartialSigner, DEFAULT_DECIMALS,
    TOKEN_2022_PROGRAM_ID,
};
pub use record::{NewTokenRecord, TokenMetadata, TokenRecord};
pub use service::{CreatedToken, TokenService};
pub use store::{FileStore, MemoryStore, TokenRecordStore};
