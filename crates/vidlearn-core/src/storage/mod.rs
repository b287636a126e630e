//! Persisted key-value storage backends.
//!
//! This module provides the `KeyValueStore` port used by the session store
//! together with its implementations:
//! - `FileStore`: one file per key inside the cache directory
//! - `KeyringStore`: entries in the OS keychain via `keyring`
//! - `MemoryStore`: in-process map for tests and throwaway sessions
//!
//! Backends report every failure. Deciding which failures are fatal is left to
//! the caller (see `SessionStore`, which fails open on reads).

pub mod file;
pub mod keychain;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use file::FileStore;
pub use keychain::KeyringStore;
pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Storage task failed: {0}")]
    Task(String),

    #[error("Keychain did not keep the value for '{0}'")]
    NotPersisted(String),
}

/// String key-value storage that survives process restarts.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Read the value under `key`. A missing key is `Ok(None)`, not an error.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Remove `key`. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
