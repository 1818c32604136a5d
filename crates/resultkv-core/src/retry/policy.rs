use std::time::Duration;

/// High-level classification of a store error for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Store asked us to slow down (provisioned throughput exceeded, throttling).
    Throttled,
    /// Any other error (never retried).
    Other,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Capped exponential backoff for throttled store calls.
///
/// Two presets exist: [`RetryPolicy::fast`] keeps retrying with short sleeps,
/// [`RetryPolicy::bounded`] waits longer but gives up after five attempts.
/// `Default` is `bounded()` so a caller is never blocked forever by a
/// persistently throttled table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first). `None` = unbounded.
    pub max_attempts: Option<u32>,
    /// Base delay for backoff.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::bounded()
    }
}

impl RetryPolicy {
    /// 100ms base, 500ms cap, retries until the store stops throttling.
    pub const fn fast() -> Self {
        Self {
            max_attempts: None,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
        }
    }

    /// 1s base, 10s cap, at most 5 attempts.
    pub const fn bounded() -> Self {
        Self {
            max_attempts: Some(5),
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }

    /// Look up a preset by name (`"fast"` or `"bounded"`).
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "fast" => Some(Self::fast()),
            "bounded" => Some(Self::bounded()),
            _ => None,
        }
    }

    /// Backoff delay after the given failed attempt: `min(base * 2^(attempt-1), cap)`.
    ///
    /// `attempt` is 1-based.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(20);
        let raw = self.base_delay.saturating_mul(1u32 << shift);
        raw.min(self.max_delay)
    }

    /// Decide what to do after `attempt` failed with an error of `kind`.
    ///
    /// `attempt` is 1-based (1 = first attempt). Returns `RetryDecision::NoRetry`
    /// when we should stop retrying.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if let Some(max) = self.max_attempts {
            if attempt >= max {
                return RetryDecision::NoRetry;
            }
        }

        match kind {
            ErrorKind::Other => RetryDecision::NoRetry,
            ErrorKind::Throttled => RetryDecision::RetryAfter(self.delay_for(attempt)),
        }
    }
}
