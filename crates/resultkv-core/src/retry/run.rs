//! Retry loop: run a closure until success or policy says stop.

use super::classify;
use super::error::{RetryError, TransportError};
use super::policy::{ErrorKind, RetryDecision, RetryPolicy};

/// Runs a single remote call until it succeeds or the retry policy says to stop.
///
/// Throttling errors are retried after the backoff delay; any other error is
/// returned unchanged as [`RetryError::Fatal`] on the attempt it happened.
/// The closure must not hold locks across calls: the sleep happens here,
/// between invocations.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, op: &str, mut f: F) -> Result<T, RetryError>
where
    F: FnMut() -> Result<T, TransportError>,
{
    let mut attempt = 1u32;
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                if kind == ErrorKind::Other {
                    return Err(RetryError::Fatal(e));
                }
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => {
                        tracing::warn!(op, attempts = attempt, error = %e, "retries exhausted");
                        return Err(RetryError::Exhausted {
                            attempts: attempt,
                            last: e,
                        });
                    }
                    RetryDecision::RetryAfter(d) => {
                        tracing::debug!(op, attempt, delay_ms = d.as_millis() as u64, "throttled; backing off");
                        std::thread::sleep(d);
                        attempt += 1;
                    }
                }
            }
        }
    }
}
