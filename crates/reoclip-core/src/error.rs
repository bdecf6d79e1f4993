//! Error taxonomy for a fetch run.
//!
//! `Auth` and `Validation` abort the whole run. Everything else is scoped to
//! one day slice or one clip and ends up in the run summary.

use chrono::NaiveDateTime;
use std::path::PathBuf;

use crate::camera::CameraError;
use crate::retry::{classify, ErrorKind, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Bad user input, e.g. `start >= end` or an unparseable timestamp.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The camera rejected the credentials or the session.
    #[error("camera rejected credentials: {0}")]
    Auth(String),

    /// Network, HTTP, or camera API fault.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The camera answered a single-day search with its per-day bitmap
    /// instead of clip entries.
    #[error(
        "degraded search response for {start} .. {end}: camera flagged {flagged_days} day(s) \
         with recordings but returned no clip entries"
    )]
    DegradedResponse {
        start: NaiveDateTime,
        end: NaiveDateTime,
        flagged_days: usize,
    },

    /// Destination directory or file could not be written.
    #[error("filesystem error at {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The user cancelled while a failed clip was waiting for its next attempt.
    #[error("cancelled by user")]
    Cancelled,
}

impl FetchError {
    pub fn file_system(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchError::FileSystem {
            path: path.into(),
            source,
        }
    }

    /// Errors that end the whole run rather than one slice or clip.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FetchError::Auth(_) | FetchError::Validation(_))
    }

    /// Retry classification; only transport faults are ever retried.
    pub fn retry_kind(&self) -> ErrorKind {
        match self {
            FetchError::Transport(e) => classify(e),
            _ => ErrorKind::Other,
        }
    }
}

impl From<CameraError> for FetchError {
    /// Sink failures carry no path here; callers that know the file they were
    /// writing map `CameraError::Sink` themselves.
    fn from(e: CameraError) -> Self {
        match e {
            CameraError::Auth(detail) => FetchError::Auth(detail),
            CameraError::Transport(t) => FetchError::Transport(t),
            CameraError::Sink(source) => FetchError::FileSystem {
                path: PathBuf::new(),
                source,
            },
        }
    }
}
