//! Classify store error codes into retry policy error kinds.

use super::error::{
    TransportError, PROVISIONED_THROUGHPUT_EXCEEDED, REQUEST_LIMIT_EXCEEDED, THROTTLING_EXCEPTION,
};
use super::policy::ErrorKind;

/// Classify a store error code for retry decisions.
pub fn classify_code(code: &str) -> ErrorKind {
    match code {
        PROVISIONED_THROUGHPUT_EXCEEDED | THROTTLING_EXCEPTION | REQUEST_LIMIT_EXCEEDED => {
            ErrorKind::Throttled
        }
        _ => ErrorKind::Other,
    }
}

/// Classify a transport error into an ErrorKind.
pub fn classify(e: &TransportError) -> ErrorKind {
    classify_code(e.code())
}
