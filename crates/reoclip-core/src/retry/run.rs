//! Retry loop: run a closure until success, a non-retryable error, or cancel.

use super::policy::{ErrorKind, RetryDecision, RetryPolicy};
use crate::control::CancelToken;

/// Outcome of `run_with_retry` together with how many attempts were made.
#[derive(Debug)]
pub struct Attempted<T, E> {
    pub result: Result<T, E>,
    pub attempts: u32,
}

/// Runs `f(attempt)` until it succeeds or the policy says to stop.
/// `attempt` is 1-based. On retryable failure, sleeps for the backoff
/// duration then tries again; a cancelled token stops further attempts and
/// the last error is returned.
pub fn run_with_retry<T, E, C, F>(
    policy: &RetryPolicy,
    cancel: Option<&CancelToken>,
    classify: C,
    mut f: F,
) -> Attempted<T, E>
where
    C: Fn(&E) -> ErrorKind,
    F: FnMut(u32) -> Result<T, E>,
{
    let mut attempt = 1u32;
    loop {
        match f(attempt) {
            Ok(v) => {
                return Attempted {
                    result: Ok(v),
                    attempts: attempt,
                }
            }
            Err(e) => {
                let decision = policy.decide(attempt, classify(&e));
                let cancelled = cancel.is_some_and(CancelToken::is_cancelled);
                match decision {
                    RetryDecision::RetryAfter(d) if !cancelled => {
                        tracing::debug!(attempt, delay_ms = d.as_millis() as u64, "retrying after backoff");
                        std::thread::sleep(d);
                        attempt += 1;
                    }
                    _ => {
                        return Attempted {
                            result: Err(e),
                            attempts: attempt,
                        }
                    }
                }
            }
        }
    }
}
