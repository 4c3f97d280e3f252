//! Host APIs for the transport.
//!
//! - [`storage`] - Key-value storage capability and the in-memory backend
//! - [`keychain`] - Storage backed by the system keychain

pub mod keychain;
pub mod storage;

pub use keychain::KeychainStorage;
pub use storage::{MemoryStorage, StorageApi};
