//! Recording locator: per-day searches merged into one deduplicated list.
//!
//! Every search goes through a single-day window (see `time_range`). Slices
//! may be searched by a small worker pool; results are still merged in slice
//! order so the output does not depend on completion order.

mod merge;
mod parse;

pub use merge::merge_clips;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::camera::CameraClient;
use crate::clip::ClipRecord;
use crate::control::CancelToken;
use crate::error::FetchError;
use crate::pool;
use crate::progress::{self, ProgressEvent, ProgressSender};
use crate::time_range::DaySlice;

/// What to do when one day's search fails (auth failures always abort).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceFailurePolicy {
    /// Record the failure and keep searching the remaining days.
    #[default]
    Skip,
    /// Stop at the first failed day.
    Abort,
}

#[derive(Debug, Clone, Copy)]
pub struct LocateOptions {
    pub policy: SliceFailurePolicy,
    pub max_concurrent: usize,
}

impl Default for LocateOptions {
    fn default() -> Self {
        Self {
            policy: SliceFailurePolicy::Skip,
            max_concurrent: 1,
        }
    }
}

/// A day whose search failed under `SliceFailurePolicy::Skip`.
#[derive(Debug)]
pub struct SliceFailure {
    pub slice: DaySlice,
    pub error: FetchError,
}

#[derive(Debug, Default)]
pub struct LocateOutcome {
    /// Chronological, no duplicate ids.
    pub clips: Vec<ClipRecord>,
    pub slices_searched: usize,
    pub failures: Vec<SliceFailure>,
    /// Some slices were never searched because the run was cancelled.
    pub cancelled: bool,
}

/// Raw search over one closed window, parsed into clip records.
///
/// The window is sent as-is; a window spanning several days will usually
/// come back degraded.
pub fn search_window(
    client: &dyn CameraClient,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Vec<ClipRecord>, FetchError> {
    let result = client.search(start, end)?;
    parse::clips_from_result(start, end, &result)
}

/// Searches one slice and keeps the entries that overlap it.
pub fn search_slice(client: &dyn CameraClient, slice: &DaySlice) -> Result<Vec<ClipRecord>, FetchError> {
    let (start, end) = slice.query_window();
    let clips = search_window(client, start, end)?;
    Ok(clips
        .into_iter()
        .filter(|c| slice.overlaps(c.start, c.end))
        .collect())
}

/// Searches every slice and merges the results.
///
/// Returns `Err` for auth failures, and for any slice failure under
/// `SliceFailurePolicy::Abort`. Under `Skip`, failed slices are listed in
/// the outcome instead.
pub fn locate<I>(
    client: &dyn CameraClient,
    slices: I,
    opts: &LocateOptions,
    cancel: Option<&CancelToken>,
    progress: Option<&ProgressSender>,
) -> Result<LocateOutcome, FetchError>
where
    I: IntoIterator<Item = DaySlice>,
{
    let slices: Vec<DaySlice> = slices.into_iter().collect();
    let stop = AtomicBool::new(false);
    let should_stop =
        || stop.load(Ordering::SeqCst) || cancel.is_some_and(CancelToken::is_cancelled);

    let results = pool::run_bounded(
        slices.clone(),
        opts.max_concurrent,
        should_stop,
        |_, slice| {
            let res = search_slice(client, &slice);
            match &res {
                Ok(clips) => {
                    tracing::debug!(day = %slice.day(), clips = clips.len(), "day searched");
                }
                Err(e) => {
                    tracing::warn!(day = %slice.day(), error = %e, "day search failed");
                    if e.is_fatal() || opts.policy == SliceFailurePolicy::Abort {
                        stop.store(true, Ordering::SeqCst);
                    }
                }
            }
            res
        },
        |index, res| {
            let day = slices[index].day();
            let event = match res {
                Ok(clips) => ProgressEvent::SliceSearched {
                    day,
                    clips: clips.len(),
                },
                Err(e) => ProgressEvent::SliceFailed {
                    day,
                    reason: e.to_string(),
                },
            };
            progress::emit(progress, event);
        },
    );

    let mut outcome = LocateOutcome::default();
    let mut batches = Vec::with_capacity(slices.len());
    let mut unsearched = 0usize;
    for (slice, res) in slices.into_iter().zip(results) {
        match res {
            None => unsearched += 1,
            Some(Ok(clips)) => {
                outcome.slices_searched += 1;
                batches.push(clips);
            }
            Some(Err(e)) => {
                outcome.slices_searched += 1;
                if e.is_fatal() || opts.policy == SliceFailurePolicy::Abort {
                    return Err(e);
                }
                outcome.failures.push(SliceFailure { slice, error: e });
            }
        }
    }
    if unsearched > 0 && cancel.is_some_and(CancelToken::is_cancelled) {
        tracing::info!(unsearched, "search cancelled");
        outcome.cancelled = true;
    }

    outcome.clips = merge_clips(batches);
    tracing::info!(
        clips = outcome.clips.len(),
        failed_days = outcome.failures.len(),
        "located recordings"
    );
    Ok(outcome)
}
