//! Storage backed by the system keychain.
//!
//! - macOS: Keychain Services
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KDE Wallet)
//!
//! Each storage key becomes a keychain account under one service name.

use async_trait::async_trait;
use keyring::Entry;
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::host::storage::StorageApi;

/// Default keychain service name.
const DEFAULT_SERVICE: &str = "folio";

/// Storage implementation using the system keychain.
#[derive(Debug, Clone)]
pub struct KeychainStorage {
    service: String,
}

impl KeychainStorage {
    /// Creates keychain storage under the default service name.
    pub fn new() -> Self {
        Self::with_service(DEFAULT_SERVICE)
    }

    /// Creates keychain storage under a custom service name.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Returns the keychain service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, key: &str) -> Result<Entry, StorageError> {
        Entry::new(&self.service, key).map_err(|e| StorageError::Platform(e.to_string()))
    }
}

impl Default for KeychainStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageApi for KeychainStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        debug!(service = %self.service, key = %key, "Reading keychain entry");

        match self.entry(key)?.get_password() {
            Ok(value) if value.is_empty() => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => {
                debug!(service = %self.service, key = %key, "Keychain entry not found");
                Ok(None)
            }
            Err(e) => {
                warn!(service = %self.service, key = %key, error = %e, "Failed to read keychain entry");
                Err(e.into())
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        debug!(service = %self.service, key = %key, "Writing keychain entry");

        self.entry(key)?.set_password(value).map_err(|e| {
            warn!(service = %self.service, key = %key, error = %e, "Failed to write keychain entry");
            StorageError::from(e)
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        debug!(service = %self.service, key = %key, "Deleting keychain entry");

        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => {
                warn!(service = %self.service, key = %key, error = %e, "Failed to delete keychain entry");
                Err(e.into())
            }
        }
    }
}
