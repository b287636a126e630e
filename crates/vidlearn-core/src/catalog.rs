//! Video listing and stream resolution.
//!
//! Front-ends show the dashboard from `Catalog::videos` and hand the result of
//! `Catalog::stream` to an embedded player.

use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{Stream, Video};

const VIDEOS_FAILED: &str = "Failed to load videos. Please try again.";
const STREAM_FAILED: &str = "Failed to load video. Please try again.";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to load videos: {0}")]
    Videos(#[source] ApiError),

    #[error("Failed to resolve stream: {0}")]
    Stream(#[source] ApiError),

    #[error("Stream URL has no embed identifier: {0}")]
    MissingEmbedId(String),
}

impl CatalogError {
    /// Message suitable for showing to the user
    pub fn user_message(&self) -> &'static str {
        match self {
            CatalogError::Videos(_) => VIDEOS_FAILED,
            CatalogError::Stream(_) | CatalogError::MissingEmbedId(_) => STREAM_FAILED,
        }
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            CatalogError::Videos(e) | CatalogError::Stream(e) => Some(e),
            CatalogError::MissingEmbedId(_) => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Catalog {
    api: ApiClient,
}

impl Catalog {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Videos on the dashboard. An empty list is a valid answer.
    pub async fn videos(&self) -> Result<Vec<Video>, CatalogError> {
        let videos = self.api.dashboard().await.map_err(|e| {
            warn!(error = %e, "Failed to fetch dashboard");
            CatalogError::Videos(e)
        })?;
        debug!(count = videos.len(), "Loaded videos");
        Ok(videos)
    }

    /// Find a dashboard video by id
    pub async fn find(&self, video_id: &str) -> Result<Option<Video>, CatalogError> {
        Ok(self.videos().await?.into_iter().find(|v| v.id == video_id))
    }

    /// Resolve a playable stream for `video`
    pub async fn stream(&self, video: &Video) -> Result<Stream, CatalogError> {
        debug!(video_id = %video.id, "Fetching stream URL");
        let url = self
            .api
            .stream_url(&video.id, video.playback_token.as_deref())
            .await
            .map_err(|e| {
                warn!(video_id = %video.id, error = %e, "Failed to fetch stream");
                CatalogError::Stream(e)
            })?;

        let stream = Stream::from_url(&url).ok_or(CatalogError::MissingEmbedId(url))?;
        debug!(video_id = %video.id, embed_id = %stream.embed_id, "Stream resolved");
        Ok(stream)
    }
}
