//! Tracing setup. Logs go to a file under the XDG state dir so they never
//! interleave with the progress lines on stdout; stderr is the fallback.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset.
const FILE_FILTER: &str = "info,reoclip=debug,reoclip_core=debug";
const STDERR_FILTER: &str = "warn";

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// `~/.local/state/reoclip/reoclip.log`, creating the directory if needed.
pub fn log_file_path() -> Result<PathBuf> {
    let dirs = xdg::BaseDirectories::with_prefix("reoclip")?;
    dirs.place_state_file("reoclip.log")
        .context("create reoclip state directory")
}

/// Append structured logs to [`log_file_path`]. Returns Err when the file
/// cannot be opened so the caller can use [`init_logging_stderr`] instead.
///
/// Camera credentials are never logged; the camera address is.
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    // Each worker thread writes through the shared handle; appends are atomic per event.
    tracing_subscriber::fmt()
        .with_env_filter(filter_or(FILE_FILTER))
        .with_writer(Arc::new(file))
        .with_thread_names(true)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install log subscriber: {e}"))?;

    tracing::info!(path = %path.display(), "reoclip logging initialized");
    Ok(())
}

/// Warnings and errors to stderr only.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_or(STDERR_FILTER))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
