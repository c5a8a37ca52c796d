//! In-memory token record store.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, instrument};

use super::TokenRecordStore;
use crate::error::{MintError, Result};
use crate::token::{NewTokenRecord, TokenRecord};

/// Thread-safe in-memory store. Ids start at 1.
#[derive(Debug)]
pub struct MemoryStore {
    records: RwLock<Vec<TokenRecord>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Validates and inserts a record.
    pub fn insert(&self, record: NewTokenRecord) -> Result<TokenRecord> {
        record.validate()?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let stored = TokenRecord::from_new(id, record, Utc::now());
        self.records.write().push(stored.clone());

        debug!(id, token = %stored.token_address, "Saved token record");
        Ok(stored)
    }

    /// Returns all records, newest first (higher id first on equal timestamps).
    pub fn all_records(&self) -> Vec<TokenRecord> {
        let mut records = self.records.read().clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        records
    }

    pub fn find(&self, id: u64) -> Option<TokenRecord> {
        self.records.read().iter().find(|r| r.id == id).cloned()
    }

    pub fn set_minted(&self, id: u64) -> Result<()> {
        let mut records = self.records.write();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(MintError::RecordNotFound(id))?;
        record.is_minted = true;

        debug!(id, "Marked token record minted");
        Ok(())
    }

    /// Builds the record `insert` would store next without storing it.
    pub(super) fn stage(&self, record: NewTokenRecord) -> Result<TokenRecord> {
        record.validate()?;
        let id = self.next_id.load(Ordering::SeqCst);
        Ok(TokenRecord::from_new(id, record, Utc::now()))
    }

    /// Stores a record built by `stage`.
    pub(super) fn commit(&self, record: TokenRecord) {
        self.next_id.fetch_max(record.id + 1, Ordering::SeqCst);
        debug!(id = record.id, token = %record.token_address, "Saved token record");
        self.records.write().push(record);
    }

    /// Replaces the contents with previously stored records.
    pub fn import(&self, records: Vec<TokenRecord>) {
        let next = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        *self.records.write() = records;
        self.next_id.store(next, Ordering::SeqCst);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRecordStore for MemoryStore {
    #[instrument(skip(self, record))]
    async fn save(&self, record: NewTokenRecord) -> Result<u64> {
        Ok(self.insert(record)?.id)
    }

    async fn list_all(&self) -> Result<Vec<TokenRecord>> {
        Ok(self.all_records())
    }

    async fn get(&self, id: u64) -> Result<Option<TokenRecord>> {
        Ok(self.find(id))
    }

    async fn mark_minted(&self, id: u64) -> Result<()> {
        self.set_minted(id)
    }
}
