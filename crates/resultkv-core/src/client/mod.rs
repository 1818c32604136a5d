//! Store client: get/mget/set/delete/incr over a remote table.
//!
//! Every remote call goes through the retry policy. `get` additionally polls
//! through replication lag ([`consistency`]), and `mget` chunks and follows
//! unprocessed keys ([`batch`]). The client holds no mutable state, so one
//! instance can be shared across threads.

mod batch;
mod consistency;

pub use batch::partition_chunks;
pub use consistency::ConsistencyWait;

use crate::error::StoreError;
use crate::retry::{run_with_retry, RetryPolicy};
use crate::transport::Table;
use crate::value::Value;

#[derive(Debug)]
pub struct StoreClient<T> {
    table: T,
    retry: RetryPolicy,
    consistency: ConsistencyWait,
}

impl<T: Table> StoreClient<T> {
    /// Client over `table` with the default retry policy and consistency wait.
    pub fn new(table: T) -> Self {
        Self {
            table,
            retry: RetryPolicy::default(),
            consistency: ConsistencyWait::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_consistency_wait(mut self, consistency: ConsistencyWait) -> Self {
        self.consistency = consistency;
        self
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn consistency_wait(&self) -> &ConsistencyWait {
        &self.consistency
    }

    /// Store `value` under `key`, overwriting any existing record.
    ///
    /// Text and bytes are written with the binary encoding, numbers as exact
    /// integers.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<(), StoreError> {
        let value = value.into();
        run_with_retry(&self.retry, "put_item", || self.table.put_item(key, &value))?;
        tracing::debug!(key, "set");
        Ok(())
    }

    /// Remove the record for `key`. Deleting an absent key succeeds.
    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        run_with_retry(&self.retry, "delete_item", || self.table.delete_item(key))?;
        tracing::debug!(key, "delete");
        Ok(())
    }

    /// Atomically add 1 to the counter at `key` and return the new value.
    ///
    /// The increment happens inside the store, so concurrent callers never lose
    /// updates. An absent key is created at 1.
    pub fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let n = run_with_retry(&self.retry, "update_item", || self.table.add_to_counter(key, 1))?;
        tracing::debug!(key, value = n, "incr");
        Ok(n)
    }
}

#[cfg(feature = "dynamodb")]
impl StoreClient<crate::transport::DynamoTable> {
    /// Parse a connection descriptor and connect to the table it names.
    pub fn connect(descriptor: &str) -> Result<Self, StoreError> {
        let info = crate::connection::ConnectionInfo::parse(descriptor)?;
        Self::from_info(&info)
    }

    pub fn from_info(info: &crate::connection::ConnectionInfo) -> Result<Self, StoreError> {
        let table = crate::transport::DynamoTable::new(info)?;
        Ok(StoreClient::new(table)
            .with_retry_policy(info.retry)
            .with_consistency_wait(info.consistency))
    }
}
