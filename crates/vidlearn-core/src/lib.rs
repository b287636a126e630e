//! Core library for vidlearn, a client for a video-learning platform.
//!
//! The pieces, leaf first:
//! - `storage`: key-value backends the session is persisted in
//! - `auth::SessionStore`: token and cached profile, failing open on reads
//! - `api::ApiClient`: HTTP client that attaches the token and clears the
//!   session when the backend answers 401
//! - `auth::AuthService`: signup, login, logout and profile lookup
//! - `catalog::Catalog`: dashboard videos and stream resolution
//! - `poller::SessionPoller`: periodic authenticated/unauthenticated check
//!
//! All of them share one `SessionStore`, built once at startup:
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use vidlearn_core::{ApiClient, AuthService, Config, SessionPoller, SessionStore};
//!
//! let config = Config::load()?;
//! let session = SessionStore::from_config(&config)?;
//! let api = ApiClient::from_config(&config, session.clone())?;
//! let auth = AuthService::new(api);
//! let poller = SessionPoller::from_config(&config, session).spawn();
//!
//! auth.login("a@b.com", "secret1").await?;
//! # drop(poller);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod models;
pub mod poller;
pub mod storage;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthError, AuthService, Session, SessionStore};
pub use catalog::{Catalog, CatalogError};
pub use config::{Config, StorageBackend};
pub use models::{Profile, Stream, Video};
pub use poller::{AuthState, PollerHandle, SessionPoller, SessionStatus};
pub use storage::{FileStore, KeyValueStore, KeyringStore, MemoryStore, StorageError};
