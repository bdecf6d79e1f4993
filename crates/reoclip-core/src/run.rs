//! One complete fetch: login, locate clips day by day, download, logout.

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

use crate::camera::{CameraClient, CameraError, ReolinkHttp};
use crate::config::ReoclipConfig;
use crate::control::CancelToken;
use crate::error::FetchError;
use crate::locator::{self, LocateOptions, SliceFailure};
use crate::orchestrator::{self, DownloadOptions, DownloadSummary};
use crate::progress::{self, ProgressEvent, ProgressSender};
use crate::retry::{RetryPolicy, TransportError};
use crate::time_range::TimeRange;

/// Exit status when the user interrupted the run.
pub const EXIT_CANCELLED: i32 = 130;

#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Camera IP address or hostname.
    pub host: String,
    pub username: String,
    pub password: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub output_dir: PathBuf,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    /// Camera name from GetDevInfo, when it answered.
    pub device_name: Option<String>,
    /// Calendar days the requested range touches.
    pub days: usize,
    pub days_searched: usize,
    pub slice_failures: Vec<SliceFailure>,
    /// Unique clips found across all days.
    pub clips_found: usize,
    pub download: DownloadSummary,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.slice_failures.is_empty() && self.download.is_success()
    }

    /// 0 on full success, 130 when cancelled, 1 for any failed day or clip.
    pub fn exit_code(&self) -> i32 {
        if self.cancelled {
            EXIT_CANCELLED
        } else if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Connects to the camera described by `req` and fetches every clip in the
/// requested range. Blocking.
pub fn run(
    req: &RunRequest,
    cfg: &ReoclipConfig,
    cancel: Option<&CancelToken>,
    progress: Option<&ProgressSender>,
) -> Result<RunSummary, FetchError> {
    let range = TimeRange::new(req.start, req.end)?;
    let client = ReolinkHttp::new(&req.host, &req.username, &req.password, cfg).map_err(|e| match e {
        CameraError::Transport(TransportError::InvalidEndpoint(msg)) => FetchError::Validation(msg),
        other => other.into(),
    })?;
    tracing::info!(endpoint = %client.endpoint(), "connecting to camera");
    client.login()?;

    let device_name = match client.device_info() {
        Ok(info) => {
            tracing::info!(name = %info.name, model = %info.model, firmware = %info.firmware, "connected");
            Some(info.name)
        }
        Err(e) => {
            tracing::warn!(error = %e, "GetDevInfo failed; continuing");
            None
        }
    };

    let result = run_with_client(&client, &range, &req.output_dir, cfg, cancel, progress);
    client.logout();
    let mut summary = result?;
    summary.device_name = device_name;
    Ok(summary)
}

/// The search-then-download pipeline against an already connected client.
pub fn run_with_client(
    client: &dyn CameraClient,
    range: &TimeRange,
    output_dir: &Path,
    cfg: &ReoclipConfig,
    cancel: Option<&CancelToken>,
    progress: Option<&ProgressSender>,
) -> Result<RunSummary, FetchError> {
    let days = range.days().len();
    tracing::info!(start = %range.start(), end = %range.end(), days, "searching recordings");

    let locate_opts = LocateOptions {
        policy: cfg.on_search_failure,
        max_concurrent: cfg.max_concurrent_searches,
    };
    let located = locator::locate(client, range, &locate_opts, cancel, progress)?;
    progress::emit(
        progress,
        ProgressEvent::ClipsLocated {
            total: located.clips.len(),
        },
    );

    let download = if located.cancelled {
        DownloadSummary {
            not_started: located.clips.len(),
            cancelled: true,
            ..DownloadSummary::default()
        }
    } else {
        let opts = DownloadOptions {
            max_concurrent: cfg.max_concurrent_downloads,
            retry: RetryPolicy::from(&cfg.retry_or_default()),
        };
        orchestrator::download(client, &located.clips, output_dir, &opts, cancel, progress)?
    };

    Ok(RunSummary {
        device_name: None,
        days,
        days_searched: located.slices_searched,
        slice_failures: located.failures,
        clips_found: located.clips.len(),
        cancelled: located.cancelled || download.cancelled,
        download,
    })
}
