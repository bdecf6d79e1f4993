use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::locator::SliceFailurePolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per clip download (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

/// Which recording stream to search and download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    #[default]
    Main,
    Sub,
}

impl StreamType {
    pub fn as_str(self) -> &'static str {
        match self {
            StreamType::Main => "main",
            StreamType::Sub => "sub",
        }
    }
}

/// Global configuration loaded from `~/.config/reoclip/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReoclipConfig {
    /// Camera channel to search (0 for standalone cameras).
    #[serde(default)]
    pub channel: u8,
    /// Recording stream to fetch.
    #[serde(default)]
    pub stream: StreamType,
    /// Talk to the camera over HTTPS instead of HTTP.
    #[serde(default)]
    pub use_https: bool,
    /// Non-default camera HTTP(S) port.
    #[serde(default)]
    pub port: Option<u16>,
    /// Accept the self-signed certificates cameras ship with.
    #[serde(default = "default_true")]
    pub accept_invalid_certs: bool,
    /// Connect timeout for every camera request.
    pub connect_timeout_secs: u64,
    /// Overall timeout for login/search/logout requests.
    pub request_timeout_secs: u64,
    /// Overall timeout for a single clip download.
    pub download_timeout_secs: u64,
    /// Day searches in flight at once.
    pub max_concurrent_searches: usize,
    /// Clip downloads in flight at once.
    pub max_concurrent_downloads: usize,
    /// What to do when one day's search fails: "skip" (default) or "abort".
    #[serde(default)]
    pub on_search_failure: SliceFailurePolicy,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

fn default_true() -> bool {
    true
}

impl Default for ReoclipConfig {
    fn default() -> Self {
        Self {
            channel: 0,
            stream: StreamType::Main,
            use_https: false,
            port: None,
            accept_invalid_certs: true,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            download_timeout_secs: 3600,
            max_concurrent_searches: 1,
            max_concurrent_downloads: 1,
            on_search_failure: SliceFailurePolicy::Skip,
            retry: None,
        }
    }
}

impl ReoclipConfig {
    /// Retry settings, falling back to built-in defaults.
    pub fn retry_or_default(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let dirs = xdg::BaseDirectories::with_prefix("reoclip")?;
    dirs.place_config_file("config.toml")
        .context("create reoclip config directory")
}

/// Read the config file, writing one with the defaults on first run.
pub fn load_or_init() -> Result<ReoclipConfig> {
    let path = config_path()?;
    match fs::read_to_string(&path) {
        Ok(text) => toml::from_str(&text).with_context(|| format!("parse {}", path.display())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let cfg = ReoclipConfig::default();
            fs::write(&path, toml::to_string_pretty(&cfg)?)
                .with_context(|| format!("write default config {}", path.display()))?;
            tracing::info!(path = %path.display(), "created default config");
            Ok(cfg)
        }
        Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
    }
}
