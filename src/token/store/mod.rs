//! Token record persistence.

mod file;
mod memory;

use async_trait::async_trait;

pub use file::FileStore;
pub use memory::MemoryStore;

use super::{NewTokenRecord, TokenRecord};
use crate::error::Result;

/// Interface for token record storage.
///
/// Implementations might use:
/// - In-memory storage (for testing/development)
/// - A JSON file (single-user deployments)
/// - A SQL table (shared deployments)
#[async_trait]
pub trait TokenRecordStore: Send + Sync {
    /// Saves a new record and returns its assigned id.
    async fn save(&self, record: NewTokenRecord) -> Result<u64>;

    /// Returns all records, newest first.
    async fn list_all(&self) -> Result<Vec<TokenRecord>>;

    /// Returns a record by id.
    async fn get(&self, id: u64) -> Result<Option<TokenRecord>>;

    /// Flags a record as minted.
    async fn mark_minted(&self, id: u64) -> Result<()>;
}
