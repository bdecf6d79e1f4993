//! Progress events for a fetch run.
//!
//! The core runs on blocking threads and pushes events over an unbounded
//! tokio channel; the CLI drains it on the async side and prints as it goes.
//! Events arrive in slice / clip order.

use chrono::NaiveDate;
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedSender;

pub type ProgressSender = UnboundedSender<ProgressEvent>;

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// One day searched successfully.
    SliceSearched { day: NaiveDate, clips: usize },
    /// One day's search failed and was skipped.
    SliceFailed { day: NaiveDate, reason: String },
    /// All slices searched; this many unique clips will be considered.
    ClipsLocated { total: usize },
    /// A clip is about to be downloaded (index is 0-based in run order).
    ClipStarted {
        index: usize,
        total: usize,
        file_name: String,
    },
    ClipFinished {
        index: usize,
        total: usize,
        path: PathBuf,
        outcome: ClipOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipOutcome {
    Downloaded { bytes: u64, attempts: u32 },
    Skipped,
    Failed { reason: String },
}

/// Sends `event` if anyone is listening. A closed receiver is ignored.
pub(crate) fn emit(progress: Option<&ProgressSender>, event: ProgressEvent) {
    if let Some(tx) = progress {
        let _ = tx.send(event);
    }
}
