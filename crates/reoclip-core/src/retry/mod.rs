//! Retry and backoff policy.
//!
//! Classifies camera transport failures (timeouts, throttling, dropped
//! connections) and computes exponential backoff so the clip downloader and
//! any other caller share one policy.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::TransportError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::{run_with_retry, Attempted};
