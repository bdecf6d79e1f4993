//! Download orchestrator: turns located clips into files on disk.
//!
//! Resumability is purely filesystem state: a clip whose destination already
//! holds a finished file is skipped, and partial data only ever lives in a
//! `.part` temp file. Clips are processed and reported in list order; with
//! `max_concurrent > 1` transfers overlap but reports are re-ordered.

mod fetch;
mod task;

pub use task::{DownloadTask, InvalidTransition, TaskState};

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::camera::CameraClient;
use crate::clip::ClipRecord;
use crate::control::CancelToken;
use crate::error::FetchError;
use crate::naming;
use crate::pool;
use crate::progress::{self, ClipOutcome, ProgressEvent, ProgressSender};
use crate::retry::RetryPolicy;
use fetch::Fetched;

#[derive(Debug, Clone, Copy)]
pub struct DownloadOptions {
    pub max_concurrent: usize,
    pub retry: RetryPolicy,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            max_concurrent: 1,
            retry: RetryPolicy::default(),
        }
    }
}

/// A clip that could not be downloaded.
#[derive(Debug)]
pub struct ClipFailure {
    pub clip: ClipRecord,
    pub destination: PathBuf,
    pub attempts: u32,
    pub error: FetchError,
}

#[derive(Debug, Default)]
pub struct DownloadSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Clips never started because the run was cancelled.
    pub not_started: usize,
    pub bytes_written: u64,
    pub failures: Vec<ClipFailure>,
    pub cancelled: bool,
}

impl DownloadSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped + self.not_started
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && !self.cancelled
    }
}

/// Downloads every clip into `dest_dir`.
///
/// Per-clip failures are collected into the summary; only an auth failure
/// ends the batch early and is returned as `Err`.
pub fn download(
    client: &dyn CameraClient,
    clips: &[ClipRecord],
    dest_dir: &Path,
    opts: &DownloadOptions,
    cancel: Option<&CancelToken>,
    progress: Option<&ProgressSender>,
) -> Result<DownloadSummary, FetchError> {
    let total = clips.len();
    let tasks = plan_tasks(clips, dest_dir);

    let stop = AtomicBool::new(false);
    let should_stop =
        || stop.load(Ordering::SeqCst) || cancel.is_some_and(CancelToken::is_cancelled);

    let results = pool::run_bounded(
        tasks,
        opts.max_concurrent,
        should_stop,
        |index, mut task| {
            progress::emit(
                progress,
                ProgressEvent::ClipStarted {
                    index,
                    total,
                    file_name: file_name_of(task.destination_path()),
                },
            );
            let res = fetch::fetch_clip(client, &mut task, &opts.retry, cancel);
            if let Err(e) = &res {
                if e.is_fatal() {
                    stop.store(true, Ordering::SeqCst);
                }
            }
            (task, res)
        },
        |index, (task, res)| {
            let outcome = match res {
                Ok(Fetched::Downloaded { bytes }) => ClipOutcome::Downloaded {
                    bytes: *bytes,
                    attempts: task.attempt_count(),
                },
                Ok(Fetched::Skipped) => ClipOutcome::Skipped,
                Err(e) => ClipOutcome::Failed {
                    reason: e.to_string(),
                },
            };
            progress::emit(
                progress,
                ProgressEvent::ClipFinished {
                    index,
                    total,
                    path: task.destination_path().to_path_buf(),
                    outcome,
                },
            );
        },
    );

    let mut summary = DownloadSummary::default();
    for slot in results {
        let Some((task, res)) = slot else {
            summary.not_started += 1;
            continue;
        };
        match res {
            Ok(Fetched::Downloaded { bytes }) => {
                summary.succeeded += 1;
                summary.bytes_written += bytes;
            }
            Ok(Fetched::Skipped) => summary.skipped += 1,
            Err(e) if e.is_fatal() => return Err(e),
            Err(error) => {
                summary.failed += 1;
                summary.failures.push(ClipFailure {
                    clip: task.clip().clone(),
                    destination: task.destination_path().to_path_buf(),
                    attempts: task.attempt_count(),
                    error,
                });
            }
        }
    }
    let interrupted = summary
        .failures
        .iter()
        .any(|f| matches!(f.error, FetchError::Cancelled));
    summary.cancelled =
        (summary.not_started > 0 || interrupted) && cancel.is_some_and(CancelToken::is_cancelled);

    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        skipped = summary.skipped,
        not_started = summary.not_started,
        bytes = summary.bytes_written,
        "downloads finished"
    );
    Ok(summary)
}

/// One task per clip. A clip whose plain name is already claimed by an
/// earlier clip with a different id gets the hashed name instead.
fn plan_tasks(clips: &[ClipRecord], dest_dir: &Path) -> Vec<DownloadTask> {
    let mut taken: HashSet<PathBuf> = HashSet::with_capacity(clips.len());
    clips
        .iter()
        .map(|c| {
            let mut task = DownloadTask::new(c.clone(), dest_dir);
            if taken.contains(task.destination_path()) {
                let unique = dest_dir.join(naming::unique_file_name(c));
                tracing::warn!(clip = %c.id, path = %unique.display(), "file name collision; using hashed name");
                task = DownloadTask::with_destination(c.clone(), unique);
            }
            taken.insert(task.destination_path().to_path_buf());
            task
        })
        .collect()
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
