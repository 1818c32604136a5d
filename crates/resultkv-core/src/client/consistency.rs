//! Read-after-write polling for single-key reads.
//!
//! A fast (eventually-consistent) read can miss a record that another process
//! wrote moments ago. Rather than paying for a strongly-consistent read on
//! every call, `get` polls: on a miss it sleeps `gap` and reads again, until
//! `budget` worth of gaps has been spent.

use std::time::Duration;

use super::StoreClient;
use crate::error::StoreError;
use crate::retry::run_with_retry;
use crate::transport::Table;
use crate::value::Value;

const MIN_GAP: Duration = Duration::from_millis(1);

/// Polling parameters for `get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsistencyWait {
    /// Sleep between reads that miss.
    pub gap: Duration,
    /// Total time `get` may spend sleeping before giving up with `NotFound`.
    pub budget: Duration,
}

impl Default for ConsistencyWait {
    fn default() -> Self {
        Self {
            gap: Duration::from_millis(100),
            budget: Duration::from_secs(1),
        }
    }
}

impl ConsistencyWait {
    /// Gap is clamped to at least 1ms.
    pub fn new(gap: Duration, budget: Duration) -> Self {
        Self {
            gap: gap.max(MIN_GAP),
            budget,
        }
    }

    /// Sleep actually taken between reads; never shorter than 1ms, even when
    /// `gap` was set to zero through the public field.
    pub fn effective_gap(&self) -> Duration {
        self.gap.max(MIN_GAP)
    }

    /// Number of reads a lookup of a missing key performs: one at time zero,
    /// then one after each gap that still fits in the budget.
    pub fn max_reads(&self) -> u32 {
        let gaps = self.budget.as_nanos() / self.effective_gap().as_nanos();
        u32::try_from(gaps).unwrap_or(u32::MAX - 1) + 1
    }
}

impl<T: Table> StoreClient<T> {
    /// Read the record for `key`, polling through replication lag.
    ///
    /// Returns `StoreError::NotFound` once the consistency budget is spent.
    pub fn get(&self, key: &str) -> Result<Value, StoreError> {
        self.get_with_wait(key, self.consistency)
    }

    /// Like [`get`](Self::get) with a caller-chosen wait budget (zero = a single read).
    pub fn get_within(&self, key: &str, budget: Duration) -> Result<Value, StoreError> {
        self.get_with_wait(key, ConsistencyWait::new(self.consistency.gap, budget))
    }

    fn get_with_wait(&self, key: &str, wait: ConsistencyWait) -> Result<Value, StoreError> {
        let reads = wait.max_reads();
        for read in 1..=reads {
            let found = run_with_retry(&self.retry, "get_item", || self.table.get_item(key, false))?;
            if let Some(value) = found {
                tracing::debug!(key, read, "get hit");
                return Ok(value);
            }
            if read < reads {
                tracing::trace!(key, read, "get miss; waiting for replication");
                std::thread::sleep(wait.effective_gap());
            }
        }
        tracing::debug!(key, reads, "get gave up waiting for record");
        Err(StoreError::NotFound {
            key: key.to_string(),
        })
    }
}
