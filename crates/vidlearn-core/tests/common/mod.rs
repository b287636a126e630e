//! In-process backend and store doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use vidlearn_core::{
    ApiClient, AuthService, Catalog, KeyValueStore, MemoryStore, SessionStore, StorageError,
};

pub const VALID_TOKEN: &str = "tkn_123";
pub const VALID_PASSWORD: &str = "secret1";
pub const TAKEN_EMAIL: &str = "taken@b.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogoutBehavior {
    #[default]
    Ok,
    Error,
    Slow,
}

#[derive(Debug, Default)]
struct BackendState {
    /// (path, Authorization header) for every request received
    requests: Vec<(String, Option<String>)>,
    logout: LogoutBehavior,
    tokens_expired: bool,
}

#[derive(Clone)]
pub struct MockBackend {
    pub base_url: String,
    state: Arc<Mutex<BackendState>>,
}

type Shared = Arc<Mutex<BackendState>>;

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap()
}

/// Record the request and report whether it carried the valid token
fn record(state: &Shared, path: &str, headers: &HeaderMap) -> bool {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let mut state = lock(state);
    let expected = format!("Bearer {}", VALID_TOKEN);
    let authorized = !state.tokens_expired && auth.as_deref() == Some(expected.as_str());
    state.requests.push((path.to_string(), auth));
    authorized
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
}

async fn signup(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    record(&state, "/auth/signup", &headers);
    match body["email"].as_str() {
        Some(TAKEN_EMAIL) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "Email already registered" })),
        )
            .into_response(),
        Some("broken@b.com") => (StatusCode::INTERNAL_SERVER_ERROR, "oops").into_response(),
        _ => (
            StatusCode::CREATED,
            Json(json!({
                "message": "User created",
                "user": { "name": body["name"], "email": body["email"] }
            })),
        )
            .into_response(),
    }
}

async fn login(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    record(&state, "/auth/login", &headers);
    if body["password"] == VALID_PASSWORD {
        Json(json!({
            "token": VALID_TOKEN,
            "user": { "name": "A", "email": body["email"] }
        }))
        .into_response()
    } else {
        unauthorized("Invalid email or password")
    }
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    record(&state, "/auth/logout", &headers);
    let behavior = lock(&state).logout;
    match behavior {
        LogoutBehavior::Ok => Json(json!({})).into_response(),
        LogoutBehavior::Error => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "boom" }))).into_response()
        }
        LogoutBehavior::Slow => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({})).into_response()
        }
    }
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !record(&state, "/auth/me", &headers) {
        return unauthorized("Missing or invalid token");
    }
    Json(json!({ "user": { "name": "A", "email": "a@b.com", "plan": "pro" } })).into_response()
}

async fn dashboard(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !record(&state, "/dashboard", &headers) {
        return unauthorized("Token expired");
    }
    Json(json!({
        "videos": [
            {
                "id": "v1",
                "title": "Ownership",
                "description": "Moves and borrows",
                "thumbnail_url": "https://img.example.com/v1.jpg",
                "playback_token": "pb_v1"
            },
            {
                "id": 2,
                "title": "Lifetimes",
                "description": "Scopes",
                "thumbnail_url": null
            },
            {
                "id": "nolink",
                "title": "Broken",
                "description": "No embed"
            }
        ]
    }))
    .into_response()
}

async fn stream(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !record(&state, "/video/stream", &headers) {
        return unauthorized("Token expired");
    }
    let url = if id == "nolink" {
        "https://cdn.example.com/raw.mp4".to_string()
    } else {
        let token = query.get("token").map(String::as_str).unwrap_or("none");
        format!("https://www.youtube-nocookie.com/embed/yt-{}?pt={}", id, token)
    };
    Json(json!({ "stream_url": url })).into_response()
}

impl MockBackend {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(BackendState::default()));
        let app = Router::new()
            .route("/auth/signup", post(signup))
            .route("/auth/login", post(login))
            .route("/auth/logout", post(logout))
            .route("/auth/me", get(me))
            .route("/dashboard", get(dashboard))
            .route("/video/{id}/stream", get(stream))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn set_logout(&self, behavior: LogoutBehavior) {
        lock(&self.state).logout = behavior;
    }

    /// Make every protected endpoint answer 401
    pub fn expire_tokens(&self) {
        lock(&self.state).tokens_expired = true;
    }

    /// Authorization headers received on `path`, in order
    pub fn auth_headers(&self, path: &str) -> Vec<Option<String>> {
        lock(&self.state)
            .requests
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, auth)| auth.clone())
            .collect()
    }

    pub fn request_count(&self, path: &str) -> usize {
        self.auth_headers(path).len()
    }
}

/// Memory store that counts removals per key
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    removals: Mutex<HashMap<String, usize>>,
    removal_total: AtomicUsize,
}

impl CountingStore {
    pub fn removals(&self, key: &str) -> usize {
        self.removals.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    pub fn total_removals(&self) -> usize {
        self.removal_total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for CountingStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set(key, value).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        *self.removals.lock().unwrap().entry(key.to_string()).or_default() += 1;
        self.removal_total.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(key).await
    }
}

pub struct Harness {
    pub backend: MockBackend,
    pub session: SessionStore,
    pub api: ApiClient,
    pub auth: AuthService,
    pub catalog: Catalog,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_session(SessionStore::in_memory(), Duration::from_secs(10)).await
    }

    pub async fn with_session(session: SessionStore, timeout: Duration) -> Self {
        let backend = MockBackend::start().await;
        let api = ApiClient::with_timeout(&backend.base_url, timeout, session.clone()).unwrap();
        Self {
            auth: AuthService::new(api.clone()),
            catalog: Catalog::new(api.clone()),
            backend,
            session,
            api,
        }
    }
}
