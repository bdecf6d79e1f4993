//! One clip: skip check, temp file, retry loop, finalize.

use std::path::Path;

use super::task::{DownloadTask, TaskState};
use crate::camera::{CameraClient, CameraError};
use crate::clip::ClipRecord;
use crate::control::CancelToken;
use crate::error::FetchError;
use crate::retry::{run_with_retry, Attempted, RetryDecision, RetryPolicy, TransportError};
use crate::storage::{self, ClipFileBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fetched {
    Downloaded { bytes: u64 },
    /// A finished file was already at the destination.
    Skipped,
}

/// Drives `task` to `Complete` or `Failed`.
pub(crate) fn fetch_clip(
    client: &dyn CameraClient,
    task: &mut DownloadTask,
    policy: &RetryPolicy,
    cancel: Option<&CancelToken>,
) -> Result<Fetched, FetchError> {
    let destination = task.destination_path().to_path_buf();
    if storage::is_complete(&destination, task.clip().size_hint) {
        tracing::debug!(path = %destination.display(), "already downloaded");
        advance(task, TaskState::Complete);
        return Ok(Fetched::Skipped);
    }

    advance(task, TaskState::InProgress);
    let clip = task.clip().clone();
    let result = ensure_parent(&destination).and_then(|()| {
        let Attempted { result, attempts } =
            run_with_retry(policy, cancel, FetchError::retry_kind, |attempt| {
                if attempt > 1 {
                    tracing::info!(clip = %clip.id, attempt, "retrying download");
                }
                attempt_once(client, &clip, &destination)
            });
        task.set_attempt_count(attempts);
        match result {
            Err(e) if retry_cut_short(policy, cancel, attempts, &e) => Err(FetchError::Cancelled),
            other => other,
        }
    });

    match result {
        Ok(bytes) => {
            advance(task, TaskState::Complete);
            tracing::info!(
                path = %destination.display(),
                bytes,
                duration_secs = clip.duration_secs(),
                attempts = task.attempt_count(),
                "clip saved"
            );
            Ok(Fetched::Downloaded { bytes })
        }
        Err(e) => {
            advance(task, TaskState::Failed);
            tracing::warn!(clip = %clip.id, attempts = task.attempt_count(), error = %e, "clip failed");
            Err(e)
        }
    }
}

/// One transfer into `<destination>.part`, renamed into place on success.
/// Every failure path removes the temp file.
fn attempt_once(
    client: &dyn CameraClient,
    clip: &ClipRecord,
    destination: &Path,
) -> Result<u64, FetchError> {
    let temp = storage::temp_path(destination);
    let mut builder = ClipFileBuilder::create(&temp)?;
    if let Some(size) = clip.size_hint {
        builder.preallocate(size)?;
    }
    let mut file = builder.build();

    match client.download(&clip.id, &mut file) {
        Ok(_) => {}
        Err(CameraError::Sink(e)) => {
            let err = FetchError::file_system(file.temp_path(), e);
            file.discard();
            return Err(err);
        }
        Err(e) => {
            file.discard();
            return Err(e.into());
        }
    }

    let written = file.written();
    if let Some(expected) = clip.size_hint {
        if written != expected {
            file.discard();
            return Err(TransportError::PartialTransfer {
                expected,
                received: written,
            }
            .into());
        }
    }
    file.finalize(destination)?;
    Ok(written)
}

/// The policy would have tried again but the user cancelled.
fn retry_cut_short(
    policy: &RetryPolicy,
    cancel: Option<&CancelToken>,
    attempts: u32,
    error: &FetchError,
) -> bool {
    cancel.is_some_and(CancelToken::is_cancelled)
        && matches!(policy.decide(attempts, error.retry_kind()), RetryDecision::RetryAfter(_))
}

fn ensure_parent(destination: &Path) -> Result<(), FetchError> {
    match destination.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).map_err(|e| FetchError::file_system(dir, e))
        }
        _ => Ok(()),
    }
}

fn advance(task: &mut DownloadTask, next: TaskState) {
    if let Err(e) = task.transition(next) {
        tracing::error!(error = %e, "task state machine violated");
    }
}
