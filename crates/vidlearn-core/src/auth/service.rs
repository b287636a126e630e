//! Signup, login, logout and profile lookup.
//!
//! Every operation returns `Result<_, AuthError>`. Transport failures are
//! converted here and never reach the caller as `ApiError`.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, LoginRequest, SignupRequest, SignupResponse};
use crate::auth::{validate_login, validate_signup, SessionStore};
use crate::models::Profile;

const SIGNUP_FAILED: &str = "Signup failed. Please try again.";
const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
const PROFILE_FAILED: &str = "Failed to fetch profile.";

/// A failed auth operation. Every variant carries a message fit for display.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Rejected locally, the request was never sent
    #[error("{0}")]
    Validation(String),

    /// Timeout or unreachable backend
    #[error("{0}")]
    Network(String),

    /// Backend answered 401; the stored session has been cleared
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Backend(String),

    /// Login succeeded remotely but the session could not be saved
    #[error("{0}")]
    Storage(String),
}

impl AuthError {
    pub fn message(&self) -> &str {
        match self {
            AuthError::Validation(m)
            | AuthError::Network(m)
            | AuthError::Unauthorized(m)
            | AuthError::Backend(m)
            | AuthError::Storage(m) => m,
        }
    }

    /// Prefer the backend's own message, fall back to `default`
    fn from_api(err: &ApiError, default: &str) -> Self {
        let message = err.backend_message().unwrap_or(default).to_string();
        match err {
            ApiError::Timeout | ApiError::Network(_) => AuthError::Network(message),
            ApiError::Unauthorized { .. } => AuthError::Unauthorized(message),
            ApiError::Backend { .. } | ApiError::InvalidResponse(_) | ApiError::InvalidUrl(_) => {
                AuthError::Backend(message)
            }
        }
    }
}

/// Orchestrates auth calls and keeps the `SessionStore` in step with them.
#[derive(Clone, Debug)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn session(&self) -> &SessionStore {
        self.api.session()
    }

    /// Create an account. Nothing is persisted; the user still has to log in.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SignupResponse, AuthError> {
        let (name, email) = validate_signup(name, email, password)?;

        let request = SignupRequest {
            name,
            email,
            password,
        };
        match self.api.signup(&request).await {
            Ok(response) => {
                info!(email, "Signup successful");
                Ok(response)
            }
            Err(e) => {
                warn!(error = %e, "Signup failed");
                Err(AuthError::from_api(&e, SIGNUP_FAILED))
            }
        }
    }

    /// Log in and persist the session.
    ///
    /// The token is written before the profile and both writes finish before
    /// this returns. A failed request persists nothing.
    pub async fn login(&self, email: &str, password: &str) -> Result<Profile, AuthError> {
        let email = validate_login(email, password)?;

        let response = match self.api.login(&LoginRequest { email, password }).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Login failed");
                return Err(AuthError::from_api(&e, LOGIN_FAILED));
            }
        };

        let session = self.session();
        let saved = match session.save_token(&response.token).await {
            Ok(()) => session.save_profile(&response.user).await,
            Err(e) => Err(e),
        };
        if let Err(e) = saved {
            warn!(error = %e, "Failed to persist session after login");
            // Leave no half-written session behind
            session.clear().await;
            return Err(AuthError::Storage(LOGIN_FAILED.to_string()));
        }

        info!(email = %response.user.email, "Login successful");
        Ok(response.user)
    }

    /// Log out. Always succeeds.
    ///
    /// The backend call is best effort; the local session is cleared whatever
    /// it returns.
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "Backend logout failed, clearing local session anyway");
        }
        self.session().clear().await;
        info!("Logged out");
    }

    /// Fetch the profile from the backend. The cached profile is not updated.
    pub async fn get_profile(&self) -> Result<Profile, AuthError> {
        match self.api.me().await {
            Ok(user) => {
                debug!(email = %user.email, "Profile fetched");
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch profile");
                Err(AuthError::from_api(&e, PROFILE_FAILED))
            }
        }
    }

    /// Profile cached at login, if any
    pub async fn cached_profile(&self) -> Option<Profile> {
        self.session().profile().await
    }
}
