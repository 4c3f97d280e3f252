// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Folio Store
//!
//! Local state for Folio clients.
//!
//! This crate provides:
//!
//! - **Settings**: API origin, token storage backend and log level, with
//!   environment overrides
//! - **FileStorage**: A [`folio_transport::StorageApi`] backend kept in a
//!   JSON file
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use folio_store::{FileStorage, SettingsStore};
//!
//! let store = SettingsStore::load_default().await?;
//! let settings = store.get().await.with_env_overrides();
//!
//! let storage = FileStorage::default_location();
//! ```

pub mod error;
pub mod file_storage;
pub mod persistence;
pub mod settings;

pub use error::StoreError;
pub use file_storage::{FileStorage, StoredEntry};
pub use persistence::{
    default_config_dir, default_settings_path, default_storage_path, ensure_dir, load_json,
    load_json_or_default, save_json,
};
pub use settings::{
    LogLevel, Settings, SettingsStore, StorageBackend, DEFAULT_API_ORIGIN, ORIGIN_ENV_VAR,
};
