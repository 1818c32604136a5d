//! Error taxonomy surfaced by the store client.

use crate::retry::{RetryError, TransportError};

/// Errors returned by [`StoreClient`](crate::client::StoreClient) operations.
///
/// Throttling never appears here: it is absorbed by the retry policy and only
/// escapes as `RetryExhausted` once a bounded policy runs out of attempts.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Throttled on every attempt the retry policy allowed.
    #[error("store still throttling after {attempts} attempts: {last}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        last: TransportError,
    },

    /// `get` did not see the record within its consistency wait budget.
    #[error("no record for key {key:?} within the consistency wait budget")]
    NotFound { key: String },

    /// Non-retryable transport or remote error (auth, network, bad request).
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] TransportError),

    /// Invalid connection descriptor, detected before any remote call.
    #[error("invalid connection descriptor: {0}")]
    Configuration(String),
}

impl StoreError {
    /// True for the "not written yet" outcome of `get`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_retry_exhausted(&self) -> bool {
        matches!(self, StoreError::RetryExhausted { .. })
    }
}

impl From<RetryError> for StoreError {
    fn from(e: RetryError) -> Self {
        match e {
            RetryError::Fatal(err) => StoreError::StoreUnavailable(err),
            RetryError::Exhausted { attempts, last } => StoreError::RetryExhausted { attempts, last },
        }
    }
}
