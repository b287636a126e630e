//! API client for communicating with the video-learning backend.
//!
//! This module provides the `ApiClient` struct. It owns the outbound and
//! inbound interception every request goes through: token attachment before
//! sending, and status logging plus session invalidation on the way back.

use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::SessionStore;
use crate::config::Config;
use crate::models::{DashboardResponse, Profile, StreamResponse, Video};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<Profile>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Profile,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    user: Profile,
}

/// API client for the video-learning backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling,
/// and all clones share one `SessionStore`.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    /// Create a client for `base_url` with the default timeout
    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS), session)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
        session: SessionStore,
    ) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(ApiError::Network)?;

        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn from_config(config: &Config, session: SessionStore) -> Result<Self, ApiError> {
        Self::with_timeout(&config.base_url, config.timeout(), session)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// URL for `segments` under the base URL. Each segment is percent-encoded,
    /// so ids containing `/`, `?` or `#` stay inside their segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Outbound interception: build the request and attach the stored token.
    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method.clone(), self.url(path));
        self.authorize(builder, &method, path).await
    }

    async fn request_url(&self, method: Method, url: Url) -> RequestBuilder {
        let path = url.path().to_string();
        let builder = self.client.request(method.clone(), url);
        self.authorize(builder, &method, &path).await
    }

    async fn authorize(
        &self,
        mut builder: RequestBuilder,
        method: &Method,
        path: &str,
    ) -> RequestBuilder {
        let token = self.session.token().await;
        if let Some(ref token) = token {
            builder = builder.bearer_auth(token);
        }
        debug!(%method, path, authenticated = token.is_some(), "Sending request");
        builder
    }

    /// Inbound interception: log the outcome and invalidate the session on 401.
    async fn check_response(
        &self,
        method: &Method,
        path: &str,
        response: Response,
    ) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            debug!(%method, path, status = status.as_u16(), "Request succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(
            %method,
            path,
            status = status.as_u16(),
            body = %ApiError::truncate_body(&body),
            "Request failed"
        );

        if status == StatusCode::UNAUTHORIZED {
            info!(path, "Unauthorized response, clearing session");
            self.session.clear().await;
        }

        Err(ApiError::from_status(status, &body))
    }

    /// Send once and decode the JSON body. No retries.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(%method, path, error = %e, timeout = e.is_timeout(), "Request did not complete");
                return Err(ApiError::from_transport(e));
            }
        };

        let response = self.check_response(&method, path, response).await?;
        let text = response.text().await.map_err(ApiError::from_transport)?;

        // Some endpoints answer with an empty body; decode that as JSON null
        let body = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(body).map_err(|e| {
            ApiError::InvalidResponse(format!("{} {}: {}", method, path, e))
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let builder = self.request(Method::GET, path).await;
        self.execute(Method::GET, path, builder).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let builder = self.request(Method::POST, path).await.json(body);
        self.execute(Method::POST, path, builder).await
    }

    /// POST without a request body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let builder = self.request(Method::POST, path).await;
        self.execute(Method::POST, path, builder).await
    }

    // ===== Endpoints =====

    pub async fn signup(&self, request: &SignupRequest<'_>) -> Result<SignupResponse, ApiError> {
        self.post("/auth/signup", request).await
    }

    pub async fn login(&self, request: &LoginRequest<'_>) -> Result<LoginResponse, ApiError> {
        self.post("/auth/login", request).await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        let _: serde_json::Value = self.post_empty("/auth/logout").await?;
        Ok(())
    }

    /// Fetch the current user's profile from the backend
    pub async fn me(&self) -> Result<Profile, ApiError> {
        let response: MeResponse = self.get("/auth/me").await?;
        Ok(response.user)
    }

    /// Fetch the videos listed on the dashboard
    pub async fn dashboard(&self) -> Result<Vec<Video>, ApiError> {
        let response: DashboardResponse = self.get("/dashboard").await?;
        debug!(count = response.videos.len(), "Dashboard loaded");
        Ok(response.videos)
    }

    /// Resolve the stream URL for a video
    pub async fn stream_url(
        &self,
        video_id: &str,
        playback_token: Option<&str>,
    ) -> Result<String, ApiError> {
        let url = self.endpoint(&["video", video_id, "stream"])?;
        let path = url.path().to_string();
        let mut builder = self.request_url(Method::GET, url).await;
        if let Some(token) = playback_token {
            builder = builder.query(&[("token", token)]);
        }
        let response: StreamResponse = self.execute(Method::GET, &path, builder).await?;
        Ok(response.stream_url)
    }
}
