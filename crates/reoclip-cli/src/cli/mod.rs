//! CLI for downloading recorded clips from a Reolink camera.

mod commands;
mod report;

use anyhow::Result;
use clap::Parser;
use reoclip_core::config::{self, ReoclipConfig};
use reoclip_core::locator::SliceFailurePolicy;
use std::path::PathBuf;

use commands::run_fetch;

/// Download recorded videos from a Reolink camera within a time range.
#[derive(Debug, Parser)]
#[command(name = "reoclip")]
#[command(about = "Download videos from a Reolink camera within a specified date range", long_about = None)]
pub struct Cli {
    /// Camera IP address or hostname.
    #[arg(long)]
    pub ip: String,

    /// Camera username.
    #[arg(long)]
    pub username: String,

    /// Camera password.
    #[arg(long)]
    pub password: String,

    /// Start date/time (e.g. '2024-01-01' or '2024-01-01 14:30:00').
    #[arg(long, value_name = "TIME")]
    pub start_time: String,

    /// End date/time, exclusive (e.g. '2024-01-02' or '2024-01-02 14:30:00').
    #[arg(long, value_name = "TIME")]
    pub end_time: String,

    /// Output directory for downloaded videos.
    #[arg(long, default_value = "./downloads", value_name = "DIR")]
    pub output: PathBuf,

    /// Search days and download clips N at a time (default from config, normally 1).
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Stop at the first day whose search fails instead of skipping it.
    #[arg(long)]
    pub abort_on_search_failure: bool,

    /// Camera channel (NVR input); 0 for standalone cameras.
    #[arg(long)]
    pub channel: Option<u8>,

    /// Use HTTPS to talk to the camera.
    #[arg(long)]
    pub https: bool,

    /// Non-default camera HTTP(S) port.
    #[arg(long)]
    pub port: Option<u16>,
}

impl Cli {
    /// Command-line flags win over config.toml.
    pub fn apply_overrides(&self, cfg: &mut ReoclipConfig) {
        if let Some(jobs) = self.jobs {
            let jobs = jobs.max(1);
            cfg.max_concurrent_searches = jobs;
            cfg.max_concurrent_downloads = jobs;
        }
        if self.abort_on_search_failure {
            cfg.on_search_failure = SliceFailurePolicy::Abort;
        }
        if let Some(channel) = self.channel {
            cfg.channel = channel;
        }
        if self.https {
            cfg.use_https = true;
        }
        if self.port.is_some() {
            cfg.port = self.port;
        }
    }
}

/// Parses arguments, loads config and runs the fetch. Returns the process
/// exit code.
pub async fn run_from_args() -> Result<i32> {
    let cli = Cli::parse();
    let mut cfg = config::load_or_init()?;
    cli.apply_overrides(&mut cfg);
    tracing::debug!("effective config: {:?}", cfg);
    run_fetch(&cli, cfg).await
}

#[cfg(test)]
mod tests;
