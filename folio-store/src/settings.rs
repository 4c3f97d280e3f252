//! User settings with persistence.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json, save_json};

/// Environment variable overriding [`Settings::api_origin`].
pub const ORIGIN_ENV_VAR: &str = "FOLIO_API_ORIGIN";

/// Origin used when nothing else is configured.
pub const DEFAULT_API_ORIGIN: &str = "http://localhost:8080";

// ============================================================================
// Settings Types
// ============================================================================

/// User preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Application origin; requests go to `<origin>/api`.
    pub api_origin: String,

    /// Where the bearer token is kept.
    pub storage: StorageBackend,

    /// Log level.
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_origin: DEFAULT_API_ORIGIN.to_string(),
            storage: StorageBackend::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    /// Applies environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_origin_override(std::env::var(ORIGIN_ENV_VAR).ok())
    }

    /// Replaces the origin when `origin` holds a non-blank value.
    pub fn with_origin_override(mut self, origin: Option<String>) -> Self {
        if let Some(origin) = origin.filter(|o| !o.trim().is_empty()) {
            debug!(origin = %origin, "Overriding API origin");
            self.api_origin = origin.trim().to_string();
        }
        self
    }
}

/// Token storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// System keychain.
    Keychain,
    /// `storage.json` in the config directory.
    #[default]
    File,
    /// Nothing persists past the process.
    Memory,
}

impl StorageBackend {
    /// All available backends.
    pub fn all() -> &'static [StorageBackend] {
        &[StorageBackend::Keychain, StorageBackend::File, StorageBackend::Memory]
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Keychain => write!(f, "keychain"),
            StorageBackend::File => write!(f, "file"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keychain" => Ok(StorageBackend::Keychain),
            "file" => Ok(StorageBackend::File),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(StoreError::Config(format!("Unknown storage backend: {other}"))),
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Settings bound to the file they were loaded from.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store holding defaults.
    pub fn new(path: PathBuf) -> Self {
        Self {
            settings: Arc::new(RwLock::new(Settings::default())),
            path,
        }
    }

    /// Loads settings from the default path.
    ///
    /// # Errors
    ///
    /// Currently infallible; broken files fall back to defaults.
    pub async fn load_default() -> Result<Self, StoreError> {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path.
    ///
    /// # Errors
    ///
    /// Currently infallible; broken files fall back to defaults.
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let settings = if path.exists() {
            info!(path = %path.display(), "Loading settings");
            load_json(&path).await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load settings, using defaults");
                Settings::default()
            })
        } else {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            Settings::default()
        };

        Ok(Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
        })
    }

    /// Returns the settings file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Updates settings in memory.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.settings.write().await;
        f(&mut settings);
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    /// Restores defaults and saves them.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.update(|s| *s = Settings::default()).await;
        self.save().await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.api_origin, "http://localhost:8080");
        assert_eq!(settings.storage, StorageBackend::File);
        assert_eq!(settings.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"storage":"keychain"}"#).unwrap();
        assert_eq!(settings.storage, StorageBackend::Keychain);
        assert_eq!(settings.api_origin, DEFAULT_API_ORIGIN);
    }

    #[test]
    fn test_origin_override() {
        let settings = Settings::default().with_origin_override(Some(" https://folio.example.com ".into()));
        assert_eq!(settings.api_origin, "https://folio.example.com");

        let settings = Settings::default().with_origin_override(Some("   ".into()));
        assert_eq!(settings.api_origin, DEFAULT_API_ORIGIN);

        let settings = Settings::default().with_origin_override(None);
        assert_eq!(settings.api_origin, DEFAULT_API_ORIGIN);
    }

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!("Keychain".parse::<StorageBackend>().unwrap(), StorageBackend::Keychain);
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("vault".parse::<StorageBackend>().is_err());

        for backend in StorageBackend::all() {
            assert_eq!(backend.to_string().parse::<StorageBackend>().unwrap(), *backend);
        }
    }

    #[tokio::test]
    async fn test_settings_store_update() {
        let store = SettingsStore::new(PathBuf::from("/tmp/folio-test-settings.json"));
        store.update(|s| s.api_origin = "https://x.example".into()).await;
        assert_eq!(store.get().await.api_origin, "https://x.example");
    }
}
