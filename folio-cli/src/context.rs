//! Shared command context: settings, storage and transport.

use std::sync::Arc;

use anyhow::{Context, Result};
use folio_store::{FileStorage, Settings, SettingsStore, StorageBackend};
use folio_transport::{Http, KeychainStorage, MemoryStorage, StorageApi};
use tracing::{debug, warn};

/// Everything a command needs to reach the API.
pub struct AppContext {
    store: SettingsStore,
    settings: Settings,
}

impl AppContext {
    /// Resolves effective settings: flag, then environment, then file.
    pub async fn new(store: SettingsStore, origin_flag: Option<String>) -> Self {
        let settings = store
            .get()
            .await
            .with_env_overrides()
            .with_origin_override(origin_flag);
        debug!(origin = %settings.api_origin, storage = %settings.storage, "Resolved settings");
        Self { store, settings }
    }

    /// The settings store backing this run.
    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    /// Effective settings after overrides.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Opens the configured token storage.
    pub fn storage(&self) -> Arc<dyn StorageApi> {
        storage_for(self.settings.storage)
    }

    /// Builds a transport for the effective origin.
    pub fn http(&self) -> Result<Http> {
        Http::builder(self.settings.api_origin.as_str())
            .storage(self.storage())
            .on_access_denied(Arc::new(|origin: &url::Url| {
                warn!(%origin, "Session expired or access denied; log in again");
            }))
            .build()
            .with_context(|| format!("Invalid API origin: {}", self.settings.api_origin))
    }
}

/// Creates the storage backend for `backend`.
pub fn storage_for(backend: StorageBackend) -> Arc<dyn StorageApi> {
    match backend {
        StorageBackend::Keychain => Arc::new(KeychainStorage::new()),
        StorageBackend::File => Arc::new(FileStorage::default_location()),
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
    }
}
