//! Transport error type for retry classification.

use std::fmt;

/// Error code the store returns when a table's provisioned throughput is used up.
pub const PROVISIONED_THROUGHPUT_EXCEEDED: &str = "ProvisionedThroughputExceededException";
/// Account/request-rate throttling code.
pub const THROTTLING_EXCEPTION: &str = "ThrottlingException";
/// Per-account request limit code.
pub const REQUEST_LIMIT_EXCEEDED: &str = "RequestLimitExceeded";

/// Error returned by a single remote call to the store.
///
/// `code` is the store's machine-readable error code; classification only ever
/// looks at it, never at `message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub code: String,
    pub message: String,
}

impl TransportError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Provisioned-throughput error with the given message.
    pub fn throttled(message: impl Into<String>) -> Self {
        Self::new(PROVISIONED_THROUGHPUT_EXCEEDED, message)
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for TransportError {}

/// Outcome of [`run_with_retry`](super::run_with_retry) when the call never succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError {
    /// Non-retryable error, surfaced on the attempt it happened.
    Fatal(TransportError),
    /// Throttled on every attempt the policy allowed.
    Exhausted {
        attempts: u32,
        last: TransportError,
    },
}

impl fmt::Display for RetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Fatal(e) => write!(f, "{}", e),
            RetryError::Exhausted { attempts, last } => {
                write!(f, "gave up after {} attempts: {}", attempts, last)
            }
        }
    }
}

impl std::error::Error for RetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RetryError::Fatal(e) => Some(e),
            RetryError::Exhausted { last, .. } => Some(last),
        }
    }
}
