use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::config::{Config, StorageBackend};
use crate::models::Profile;
use crate::storage::{FileStore, KeyValueStore, KeyringStore, MemoryStore, StorageError};

/// Storage key holding the bearer token
pub const TOKEN_KEY: &str = "authToken";

/// Storage key holding the serialized profile
pub const PROFILE_KEY: &str = "userData";

/// Snapshot of who is logged in.
#[derive(Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<Profile>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .finish()
    }
}

/// Shared handle to the persisted session.
///
/// Reads fail open: a backend error or a corrupt value reads as "absent" and
/// is logged, so a broken store looks like a logged-out user rather than a
/// crash. Writes report `StorageError`. Clone is cheap and every clone sees
/// the same backend.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Session that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Open the backend selected in the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend: Arc<dyn KeyValueStore> = match config.storage {
            StorageBackend::File => {
                let dir = config.cache_dir().context("Failed to resolve session directory")?;
                Arc::new(FileStore::new(dir))
            }
            StorageBackend::Keyring => Arc::new(KeyringStore::new()),
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
        };
        debug!(storage = ?config.storage, "Session store opened");
        Ok(Self::new(backend))
    }

    pub async fn save_token(&self, token: &str) -> Result<(), StorageError> {
        self.backend.set(TOKEN_KEY, token).await?;
        debug!("Token saved");
        Ok(())
    }

    /// Current bearer token. Empty values count as absent.
    pub async fn token(&self) -> Option<String> {
        match self.backend.get(TOKEN_KEY).await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read token, treating as logged out");
                None
            }
        }
    }

    pub async fn save_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        let json = serde_json::to_string(profile)?;
        self.backend.set(PROFILE_KEY, &json).await?;
        debug!("Profile saved");
        Ok(())
    }

    pub async fn profile(&self) -> Option<Profile> {
        let json = match self.backend.get(PROFILE_KEY).await {
            Ok(json) => json?,
            Err(e) => {
                warn!(error = %e, "Failed to read profile");
                return None;
            }
        };

        match serde_json::from_str(&json) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "Stored profile is corrupt, ignoring it");
                None
            }
        }
    }

    pub async fn is_logged_in(&self) -> bool {
        self.token().await.is_some()
    }

    pub async fn snapshot(&self) -> Session {
        Session {
            token: self.token().await,
            user: self.profile().await,
        }
    }

    /// Remove token and profile.
    ///
    /// Both removals are always attempted; a failure on one does not stop the
    /// other. A token that cannot be removed is blanked instead, since an
    /// empty token reads as absent. Failures are logged and not returned.
    pub async fn clear(&self) {
        if let Err(e) = self.backend.remove(TOKEN_KEY).await {
            warn!(error = %e, "Failed to remove token, blanking it");
            if let Err(e) = self.backend.set(TOKEN_KEY, "").await {
                warn!(error = %e, "Failed to blank token");
            }
        }
        if let Err(e) = self.backend.remove(PROFILE_KEY).await {
            warn!(error = %e, "Failed to remove profile");
        }
        debug!("Session cleared");
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}
