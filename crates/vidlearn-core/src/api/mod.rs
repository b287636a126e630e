//! REST API client module for the video-learning backend.
//!
//! This module provides the `ApiClient` for communicating with the backend's
//! auth, dashboard and stream endpoints.
//!
//! Every request carries the bearer token from the shared `SessionStore`, and
//! a 401 response clears that session before the error is returned.

pub mod client;
pub mod error;

pub use client::{ApiClient, LoginRequest, LoginResponse, SignupRequest, SignupResponse};
pub use error::ApiError;
