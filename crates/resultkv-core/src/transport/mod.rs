//! Remote table transports.
//!
//! A [`Table`] performs exactly one remote call per method and reports failures
//! as [`TransportError`]s carrying the store's error code. Retrying, consistency
//! polling and batch pagination all live in the client on top of it.

mod memory;
#[cfg(feature = "dynamodb")]
mod dynamodb;

pub use memory::{CallStats, MemoryTable};
#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoTable;

use crate::retry::TransportError;
use crate::value::Value;

/// Maximum number of keys the store accepts in one batch read.
pub const BATCH_GET_LIMIT: usize = 100;

/// Error code for a counter update that would leave the 64-bit range. The
/// update is rejected before anything is written.
pub const COUNTER_OVERFLOW: &str = "CounterOverflow";

/// One response page of a batch read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchGetPage {
    /// Records returned by this call, in the order the store sent them.
    pub items: Vec<(String, Value)>,
    /// Requested keys the store did not get to; they must be asked for again.
    pub unprocessed: Vec<String>,
}

/// A single table with records of shape `{ id, result }`.
pub trait Table: Send + Sync {
    /// Read one record. `consistent = false` may miss a recent write.
    fn get_item(&self, key: &str, consistent: bool) -> Result<Option<Value>, TransportError>;

    /// Read up to [`BATCH_GET_LIMIT`] distinct keys in one call.
    fn batch_get_item(&self, keys: &[String], consistent: bool)
        -> Result<BatchGetPage, TransportError>;

    /// Create or overwrite the record for `key`.
    fn put_item(&self, key: &str, value: &Value) -> Result<(), TransportError>;

    /// Remove the record for `key`; absent keys are not an error.
    fn delete_item(&self, key: &str) -> Result<(), TransportError>;

    /// Atomically add `delta` to the numeric `result` and return the new value.
    /// An absent record starts from 0. A sum outside `i64` fails with
    /// [`COUNTER_OVERFLOW`] and leaves the record unchanged.
    fn add_to_counter(&self, key: &str, delta: i64) -> Result<i64, TransportError>;
}

impl<T: Table + ?Sized> Table for std::sync::Arc<T> {
    fn get_item(&self, key: &str, consistent: bool) -> Result<Option<Value>, TransportError> {
        (**self).get_item(key, consistent)
    }

    fn batch_get_item(
        &self,
        keys: &[String],
        consistent: bool,
    ) -> Result<BatchGetPage, TransportError> {
        (**self).batch_get_item(keys, consistent)
    }

    fn put_item(&self, key: &str, value: &Value) -> Result<(), TransportError> {
        (**self).put_item(key, value)
    }

    fn delete_item(&self, key: &str) -> Result<(), TransportError> {
        (**self).delete_item(key)
    }

    fn add_to_counter(&self, key: &str, delta: i64) -> Result<i64, TransportError> {
        (**self).add_to_counter(key, delta)
    }
}
