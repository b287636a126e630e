//! Data models shared by the client and its front-ends.
//!
//! - `Profile`: the signed-in user, cached alongside the token
//! - `Video`, `Stream`: dashboard entries and resolved playback streams

pub mod profile;
pub mod video;

pub use profile::Profile;
pub use video::{DashboardResponse, Stream, StreamResponse, Video};
