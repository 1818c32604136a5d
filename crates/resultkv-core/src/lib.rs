//! Resilient client for a DynamoDB-style key-value table used as a durable
//! task-result store.
//!
//! [`StoreClient`] exposes get/mget/set/delete/incr and hides the store's
//! quirks: throttling is retried by [`retry`], read-after-write lag is masked
//! by consistency polling in `get`, and batch-size limits and unprocessed keys
//! are handled by chunked pagination in `mget`.

pub mod client;
pub mod connection;
pub mod error;
pub mod retry;
pub mod transport;
pub mod value;

pub use client::{ConsistencyWait, StoreClient};
pub use connection::ConnectionInfo;
pub use error::StoreError;
pub use retry::RetryPolicy;
pub use transport::{MemoryTable, Table};
pub use value::Value;
