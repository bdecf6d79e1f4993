//! Run cancellation: a shared abort token.
//!
//! The CLI sets the token on Ctrl-C; the locator checks it before each day
//! search and the orchestrator before each clip, so an in-flight transfer
//! always finishes (or fails) into its temp file and never the final path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable cancel flag shared between the CLI and the blocking worker threads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Work already in progress is allowed to finish.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
