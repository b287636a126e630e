mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{CountingStore, Harness, LogoutBehavior, MockBackend, VALID_TOKEN};
use vidlearn_core::auth::{PROFILE_KEY, TOKEN_KEY};
use vidlearn_core::{ApiClient, ApiError, Profile, SessionStore};

#[tokio::test]
async fn request_without_token_has_no_authorization_header() {
    let h = Harness::new().await;

    let err = h.api.dashboard().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(h.backend.auth_headers("/dashboard"), vec![None]);
}

#[tokio::test]
async fn request_with_token_carries_exact_bearer() {
    let h = Harness::new().await;
    h.session.save_token(VALID_TOKEN).await.unwrap();

    let videos = h.api.dashboard().await.unwrap();
    assert_eq!(videos.len(), 3);
    assert_eq!(
        h.backend.auth_headers("/dashboard"),
        vec![Some(format!("Bearer {}", VALID_TOKEN))]
    );
}

#[tokio::test]
async fn token_is_read_fresh_for_every_request() {
    let h = Harness::new().await;

    h.session.save_token("first").await.unwrap();
    let _ = h.api.me().await;
    h.session.save_token("second").await.unwrap();
    let _ = h.api.me().await;

    assert_eq!(
        h.backend.auth_headers("/auth/me"),
        vec![
            Some("Bearer first".to_string()),
            Some("Bearer second".to_string())
        ]
    );
}

#[tokio::test]
async fn unauthorized_response_clears_session_once() {
    let backend = Arc::new(CountingStore::default());
    let session = SessionStore::new(backend.clone());
    let h = Harness::with_session(session, Duration::from_secs(10)).await;

    h.session.save_token("stale").await.unwrap();
    h.session.save_profile(&Profile::new("A", "a@b.com")).await.unwrap();

    let err = h.api.dashboard().await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert_eq!(err.backend_message(), Some("Token expired"));
    assert_eq!(backend.removals(TOKEN_KEY), 1);
    assert_eq!(backend.removals(PROFILE_KEY), 1);
    assert_eq!(h.session.token().await, None);
    assert_eq!(h.session.profile().await, None);
}

#[tokio::test]
async fn unauthorized_without_stored_token_still_clears_once() {
    let backend = Arc::new(CountingStore::default());
    let h = Harness::with_session(SessionStore::new(backend.clone()), Duration::from_secs(10)).await;

    let _ = h.api.me().await.unwrap_err();

    assert_eq!(backend.removals(TOKEN_KEY), 1);
}

#[tokio::test]
async fn successful_response_leaves_session_alone() {
    let backend = Arc::new(CountingStore::default());
    let h = Harness::with_session(SessionStore::new(backend.clone()), Duration::from_secs(10)).await;
    h.session.save_token(VALID_TOKEN).await.unwrap();

    h.api.me().await.unwrap();

    assert_eq!(backend.total_removals(), 0);
    assert_eq!(h.session.token().await.as_deref(), Some(VALID_TOKEN));
}

#[tokio::test]
async fn backend_error_is_not_retried() {
    let h = Harness::new().await;
    h.backend.set_logout(LogoutBehavior::Error);

    let err = h.api.logout().await.unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(500));
    assert_eq!(err.backend_message(), Some("boom"));
    assert_eq!(h.backend.request_count("/auth/logout"), 1);
}

#[tokio::test]
async fn timeout_is_distinguishable() {
    let h = Harness::with_session(SessionStore::in_memory(), Duration::from_millis(200)).await;
    h.backend.set_logout(LogoutBehavior::Slow);

    let err = h.api.logout().await.unwrap_err();

    assert!(matches!(err, ApiError::Timeout), "got {:?}", err);
    assert_eq!(h.backend.request_count("/auth/logout"), 1);
}

#[tokio::test]
async fn unreachable_host_is_network_error() {
    let backend = MockBackend::start().await;
    let api = ApiClient::new("http://127.0.0.1:9", SessionStore::in_memory()).unwrap();

    let err = api.dashboard().await.unwrap_err();

    assert!(matches!(err, ApiError::Network(_)), "got {:?}", err);
    assert_eq!(backend.request_count("/dashboard"), 0);
}
