use serde::{Deserialize, Deserializer, Serialize};

/// Path segment that precedes the video identifier in an embed URL
const EMBED_MARKER: &str = "/embed/";

/// Base for opening a video outside the embedded player
const WATCH_URL_BASE: &str = "https://www.youtube.com/watch?v=";

/// A video listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Video {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Per-video token the stream endpoint expects as a query parameter
    #[serde(default)]
    pub playback_token: Option<String>,
}

/// Wire shape of `GET /dashboard`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardResponse {
    #[serde(default)]
    pub videos: Vec<Video>,
}

/// Wire shape of `GET /video/:id/stream`
#[derive(Debug, Clone, Deserialize)]
pub struct StreamResponse {
    pub stream_url: String,
}

/// A resolved stream ready to hand to the embedded player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Stream {
    pub url: String,
    pub embed_id: String,
}

impl Stream {
    /// Build a stream from an embed URL such as
    /// `https://www.youtube-nocookie.com/embed/aqz-KE-bpKQ?autoplay=1`.
    /// Returns `None` when the URL carries no embed identifier.
    pub fn from_url(url: &str) -> Option<Self> {
        let embed_id = extract_embed_id(url)?;
        Some(Self {
            url: url.to_string(),
            embed_id: embed_id.to_string(),
        })
    }

    /// URL for watching this video outside the app
    pub fn watch_url(&self) -> String {
        format!("{}{}", WATCH_URL_BASE, self.embed_id)
    }
}

fn extract_embed_id(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once(EMBED_MARKER)?;
    let id = rest.split(['?', '#', '/']).next().unwrap_or_default();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Backends disagree on whether ids are numbers or strings
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}
