//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `SessionStore`: the persisted token and cached profile
//! - `AuthService`: signup, login, logout and profile lookup
//! - validation of credentials before they are sent
//!
//! The session has no expiry of its own; it ends on logout or when the
//! backend rejects the token with a 401.

pub mod service;
pub mod session;
pub mod validation;

pub use service::{AuthError, AuthService};
pub use session::{Session, SessionStore, PROFILE_KEY, TOKEN_KEY};
pub use validation::{validate_login, validate_signup, MIN_PASSWORD_LENGTH};
