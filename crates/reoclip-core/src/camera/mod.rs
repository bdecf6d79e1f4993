//! Camera client: the only place that speaks HTTP to the camera.
//!
//! The core drives a camera through the `CameraClient` trait and only looks
//! at the shapes of its two results; `ReolinkHttp` is the libcurl-backed
//! implementation used by the CLI.

mod http;
pub(crate) mod protocol;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

use chrono::NaiveDateTime;
use std::io::Write;

use crate::retry::TransportError;

pub use http::ReolinkHttp;
pub use types::{ApiTime, DayStatus, DeviceInfo, SearchResult, VodFile};

/// Failure of a camera call.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    /// Credentials or session rejected.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// Network, HTTP, or API fault.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The sink handed to `download` failed to accept data.
    #[error("writing clip data: {0}")]
    Sink(#[source] std::io::Error),
}

impl From<curl::Error> for CameraError {
    fn from(e: curl::Error) -> Self {
        CameraError::Transport(TransportError::Curl(e))
    }
}

/// Search and download operations the core needs from a camera.
///
/// Implementations are shared between worker threads.
pub trait CameraClient: Send + Sync {
    /// Search recordings whose time overlaps the inclusive window
    /// `[start, end]` (camera-local, whole seconds).
    fn search(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<SearchResult, CameraError>;

    /// Stream the clip named `clip_id` into `sink`; returns bytes written.
    fn download(&self, clip_id: &str, sink: &mut dyn Write) -> Result<u64, CameraError>;
}
