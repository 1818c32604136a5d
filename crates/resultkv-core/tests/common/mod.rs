//! Shared helpers for client integration tests.

use std::time::Duration;

use resultkv_core::{MemoryTable, RetryPolicy, StoreClient, Table};

/// Retry policy with millisecond sleeps so throttling tests stay fast.
pub fn quick_retry(max_attempts: Option<u32>) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    }
}

pub fn client() -> StoreClient<MemoryTable> {
    client_over(MemoryTable::new())
}

pub fn client_over<T: Table>(table: T) -> StoreClient<T> {
    StoreClient::new(table).with_retry_policy(quick_retry(Some(5)))
}

pub fn keys(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("celery-task-meta-{i:04}")).collect()
}
