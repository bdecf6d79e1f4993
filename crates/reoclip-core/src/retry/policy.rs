use std::time::Duration;

use crate::config::RetryConfig;

/// Why a camera call failed, as far as retrying is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connect or transfer timeout, including the low-speed cutoff.
    Timeout,
    /// The camera is busy (rspCode -12) or answered 429/503.
    Throttled,
    /// Connection refused/reset, DNS failure, or a body shorter than announced.
    Connection,
    /// Any other 5xx.
    Http5xx(u16),
    /// Bad request, auth, local I/O: retrying will not help.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    NoRetry,
    RetryAfter(Duration),
}

/// Capped exponential backoff over a fixed attempt budget.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts per operation, the first one included.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    /// Zero attempts become one; a negative or NaN base delay becomes zero.
    fn from(cfg: &RetryConfig) -> Self {
        let base_delay = Duration::try_from_secs_f64(cfg.base_delay_secs).unwrap_or(Duration::ZERO);
        Self {
            max_attempts: cfg.max_attempts.max(1),
            base_delay,
            max_delay: Duration::from_secs(cfg.max_delay_secs),
        }
    }
}

impl RetryPolicy {
    /// Whether to try again after attempt number `attempt` (1-based) failed
    /// with `kind`, and how long to wait first.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts || kind == ErrorKind::Other {
            return RetryDecision::NoRetry;
        }
        let mut delay = self.backoff(attempt);
        if kind == ErrorKind::Throttled {
            // A busy camera needs longer than a dropped connection.
            delay = delay.saturating_mul(2).min(self.max_delay);
        }
        RetryDecision::RetryAfter(delay)
    }

    /// `base * 2^(attempt-1)`, capped at `max_delay`.
    fn backoff(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << doublings)
            .min(self.max_delay)
    }
}
