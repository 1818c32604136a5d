//! Retry and backoff policy.
//!
//! This module encapsulates error classification (throttling vs. everything
//! else) and exponential backoff decisions so that every remote call the
//! store client makes shares a consistent policy.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_code};
pub use error::{
    RetryError, TransportError, PROVISIONED_THROUGHPUT_EXCEEDED, REQUEST_LIMIT_EXCEEDED,
    THROTTLING_EXCEPTION,
};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
