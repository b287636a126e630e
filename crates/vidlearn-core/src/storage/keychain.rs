use async_trait::async_trait;
use keyring::Entry;
use tracing::warn;

use super::{KeyValueStore, StorageError};

const SERVICE_NAME: &str = "vidlearn";

/// Stores each key as a credential in the OS keychain.
///
/// `keyring` calls block on the platform secret service, so every operation
/// runs on the blocking pool. Writes are read back through a fresh entry: a
/// platform without a persistent credential store fails the write instead of
/// dropping the value.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Use a custom service name, e.g. to keep staging and production apart.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    async fn run<T, F>(&self, key: &str, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&str, &str) -> Result<T, StorageError> + Send + 'static,
    {
        let service = self.service.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || op(&service, &key))
            .await
            .map_err(|e| StorageError::Task(e.to_string()))?
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for KeyringStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let value = value.to_string();
        self.run(key, move |service, key| {
            Entry::new(service, key)?.set_password(&value)?;

            match Entry::new(service, key)?.get_password() {
                Ok(stored) if stored == value => Ok(()),
                Ok(_) | Err(keyring::Error::NoEntry) => {
                    warn!(key, "Keychain accepted a write but did not keep it");
                    Err(StorageError::NotPersisted(key.to_string()))
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.run(key, |service, key| match Entry::new(service, key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.run(key, |service, key| {
            match Entry::new(service, key)?.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }
}
