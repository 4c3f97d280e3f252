//! Key-value storage capability.
//!
//! The transport reads its bearer token through [`StorageApi`] before every
//! request and deletes it on a 401. Backends live wherever their
//! dependencies do: [`MemoryStorage`] here, the keychain next door, the
//! JSON file backend in `folio-store`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StorageError;

// ============================================================================
// Storage API Trait
// ============================================================================

/// Durable string key-value storage.
#[async_trait]
pub trait StorageApi: Send + Sync {
    /// Get a value.
    ///
    /// # Returns
    /// * `Ok(Some(value))` - Value found
    /// * `Ok(None)` - No value stored under `key`
    /// * `Err(e)` - The backend failed
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Check if a value exists.
    async fn exists(&self, key: &str) -> bool {
        matches!(self.get(key).await, Ok(Some(_)))
    }
}

// ============================================================================
// Memory Storage
// ============================================================================

/// Process-local storage. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage holding one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self {
            entries: RwLock::new(entries),
        }
    }
}

#[async_trait]
impl StorageApi for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_lifecycle() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("TOKEN_KEY").await.unwrap(), None);
        assert!(!storage.exists("TOKEN_KEY").await);

        storage.set("TOKEN_KEY", "abc").await.unwrap();
        assert_eq!(storage.get("TOKEN_KEY").await.unwrap().as_deref(), Some("abc"));
        assert!(storage.exists("TOKEN_KEY").await);

        storage.delete("TOKEN_KEY").await.unwrap();
        assert_eq!(storage.get("TOKEN_KEY").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_missing_key_succeeds() {
        let storage = MemoryStorage::with_entry("other", "1");
        assert!(storage.delete("TOKEN_KEY").await.is_ok());
        assert!(storage.exists("other").await);
    }
}
