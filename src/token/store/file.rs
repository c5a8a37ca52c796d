//! File-backed token record store.
//!
//! Records live in memory and every change is written through to a JSON
//! document on disk. Writes go to a temp file first and are renamed over
//! the previous document. A change reaches memory only after its document
//! is on disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use super::{MemoryStore, TokenRecordStore};
use crate::error::{MintError, Result};
use crate::token::{NewTokenRecord, TokenRecord};

/// JSON-file token store.
#[derive(Debug)]
pub struct FileStore {
    /// Path to the storage file
    path: PathBuf,
    /// In-memory storage
    memory: MemoryStore,
    /// Serializes writes to disk
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens the store at `path`, loading it if the file exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            memory: MemoryStore::new(),
            write_lock: Mutex::new(()),
        };

        if fs::try_exists(&store.path).await? {
            store.load().await?;
        }

        Ok(store)
    }

    #[instrument(skip(self))]
    async fn load(&self) -> Result<()> {
        let contents = fs::read(&self.path).await?;
        let records: Vec<TokenRecord> = if contents.is_empty() {
            Vec::new()
        } else {
            serde_json::from_slice(&contents)?
        };

        info!(count = records.len(), path = ?self.path, "Loaded token records");
        self.memory.import(records);
        Ok(())
    }

    /// Writes all records to disk.
    #[instrument(skip(self))]
    pub async fn persist(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_records(&self.memory.all_records()).await
    }

    /// Replaces the document with `records`. Callers hold `write_lock`.
    async fn write_records(&self, records: &[TokenRecord]) -> Result<()> {
        let serialized = serde_json::to_vec_pretty(records)?;

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&serialized).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.path).await?;

        debug!(count = records.len(), "Token records saved");
        Ok(())
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }
}

#[async_trait]
impl TokenRecordStore for FileStore {
    async fn save(&self, record: NewTokenRecord) -> Result<u64> {
        let _guard = self.write_lock.lock().await;

        let staged = self.memory.stage(record)?;
        let mut records = self.memory.all_records();
        records.push(staged.clone());
        self.write_records(&records).await?;

        let id = staged.id;
        self.memory.commit(staged);
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<TokenRecord>> {
        Ok(self.memory.all_records())
    }

    async fn get(&self, id: u64) -> Result<Option<TokenRecord>> {
        Ok(self.memory.find(id))
    }

    async fn mark_minted(&self, id: u64) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.memory.all_records();
        records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(MintError::RecordNotFound(id))?
            .is_minted = true;
        self.write_records(&records).await?;

        self.memory.set_minted(id)
    }
}
