//! Transport-level error type for retry classification.

use std::fmt;

/// Failure of one HTTP exchange with the camera.
/// Kept separate from `FetchError` so it can be classified before it is
/// attributed to a slice or clip.
#[derive(Debug)]
pub enum TransportError {
    /// Curl reported an error (timeout, connection, TLS, etc.).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Http(u32),
    /// Transfer ended with fewer (or more) bytes than the camera advertised
    /// for the clip. Enables retry instead of silently keeping a short file.
    PartialTransfer { expected: u64, received: u64 },
    /// The camera answered with an API-level error code.
    Api {
        cmd: String,
        rsp_code: i64,
        detail: String,
    },
    /// Response body was not the JSON shape the command returns.
    Decode(String),
    /// Camera address could not be turned into a URL.
    InvalidEndpoint(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Curl(e) => write!(f, "{}", e),
            TransportError::Http(code) => write!(f, "HTTP {}", code),
            TransportError::PartialTransfer { expected, received } => {
                write!(f, "partial transfer: expected {} bytes, got {}", expected, received)
            }
            TransportError::Api {
                cmd,
                rsp_code,
                detail,
            } => write!(f, "{} failed (rspCode {}): {}", cmd, rsp_code, detail),
            TransportError::Decode(msg) => write!(f, "unexpected response: {}", msg),
            TransportError::InvalidEndpoint(msg) => write!(f, "invalid camera address: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Curl(e) => Some(e),
            _ => None,
        }
    }
}

impl From<curl::Error> for TransportError {
    fn from(e: curl::Error) -> Self {
        TransportError::Curl(e)
    }
}
