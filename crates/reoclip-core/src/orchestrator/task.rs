//! Per-clip download task and its state machine.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::clip::ClipRecord;
use crate::naming;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    InProgress,
    Complete,
    Failed,
}

impl TaskState {
    /// Legal transitions. `Pending -> Complete` is the already-on-disk skip.
    pub fn can_transition_to(self, next: TaskState) -> bool {
        use TaskState::*;
        matches!(
            (self, next),
            (Pending, InProgress) | (Pending, Complete) | (InProgress, Complete) | (InProgress, Failed)
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Pending => "pending",
            TaskState::InProgress => "in progress",
            TaskState::Complete => "complete",
            TaskState::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("clip {clip_id}: cannot go from {from} to {to}")]
pub struct InvalidTransition {
    pub clip_id: String,
    pub from: TaskState,
    pub to: TaskState,
}

/// One clip to fetch. Only the orchestrator moves it between states.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    clip: ClipRecord,
    destination: PathBuf,
    state: TaskState,
    attempt_count: u32,
}

impl DownloadTask {
    pub fn new(clip: ClipRecord, dest_dir: &Path) -> Self {
        let destination = naming::destination_path(dest_dir, &clip);
        Self::with_destination(clip, destination)
    }

    /// A task writing to an explicit destination instead of the derived one.
    pub(crate) fn with_destination(clip: ClipRecord, destination: PathBuf) -> Self {
        Self {
            clip,
            destination,
            state: TaskState::Pending,
            attempt_count: 0,
        }
    }

    pub fn clip(&self) -> &ClipRecord {
        &self.clip
    }

    pub fn destination_path(&self) -> &Path {
        &self.destination
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub(crate) fn transition(&mut self, next: TaskState) -> Result<(), InvalidTransition> {
        if !self.state.can_transition_to(next) {
            return Err(InvalidTransition {
                clip_id: self.clip.id.clone(),
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    pub(crate) fn set_attempt_count(&mut self, attempts: u32) {
        self.attempt_count = attempts;
    }
}
