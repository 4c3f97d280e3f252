//! JSON file storage backend.
//!
//! Entries live in one file as `{"KEY": {"value": "...", "updated_at": "..."}}`.
//! Every write rewrites the whole file through [`save_json`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_transport::{StorageApi, StorageError};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StoreError;
use crate::persistence::{default_storage_path, load_json, save_json};

/// A stored value with its last write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    /// The value.
    pub value: String,
    /// When the value was last written.
    pub updated_at: DateTime<Utc>,
}

type Entries = BTreeMap<String, StoredEntry>;

/// Storage persisted to a JSON file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within the process.
    lock: Mutex<()>,
}

impl FileStorage {
    /// Creates storage backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Creates storage at the default location.
    pub fn default_location() -> Self {
        Self::new(default_storage_path())
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the full entry for `key`, including its timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn entry(&self, key: &str) -> Result<Option<StoredEntry>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_entries().await?.remove(key))
    }

    async fn read_entries(&self) -> Result<Entries, StoreError> {
        match load_json(&self.path).await {
            Ok(entries) => Ok(entries),
            Err(e) if e.is_not_found() => Ok(Entries::new()),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl StorageApi for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entry(key).await?.map(|e| e.value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(
            key.to_string(),
            StoredEntry {
                value: value.to_string(),
                updated_at: Utc::now(),
            },
        );
        save_json(&self.path, &entries).await?;
        debug!(key, path = %self.path.display(), "Stored value");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        if entries.remove(key).is_some() {
            save_json(&self.path, &entries).await?;
            debug!(key, path = %self.path.display(), "Deleted value");
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
