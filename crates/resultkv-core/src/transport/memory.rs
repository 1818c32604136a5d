//! In-process table with the store's semantics and injectable faults.
//!
//! Used by tests and local tooling. Faults model what the real store does to
//! a client: throttling, replication lag on eventually-consistent reads, and
//! partially processed batch reads.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{BatchGetPage, Table, BATCH_GET_LIMIT, COUNTER_OVERFLOW};
use crate::retry::TransportError;
use crate::value::Value;

/// Number of calls made per operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallStats {
    pub get_item: u32,
    pub batch_get_item: u32,
    pub put_item: u32,
    pub delete_item: u32,
    pub add_to_counter: u32,
}

#[derive(Debug, Default)]
struct State {
    items: HashMap<String, Value>,
    /// Errors returned by the next calls, oldest first, whatever the operation.
    injected: VecDeque<TransportError>,
    /// Remaining eventually-consistent reads that still miss the key.
    stale_reads: HashMap<String, u32>,
    /// Max keys answered per batch call; the rest come back unprocessed.
    page_limit: Option<usize>,
    stats: CallStats,
}

#[derive(Debug, Default)]
pub struct MemoryTable {
    state: Mutex<State>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fail the next call with `err`.
    pub fn fail_next(&self, err: TransportError) {
        self.lock().injected.push_back(err);
    }

    /// Fail the next `n` calls with provisioned-throughput errors.
    pub fn throttle_next(&self, n: u32) {
        let mut state = self.lock();
        for i in 0..n {
            state
                .injected
                .push_back(TransportError::throttled(format!("injected throttle {}", i + 1)));
        }
    }

    /// Make the next `reads` eventually-consistent reads of `key` miss it.
    pub fn lag_reads(&self, key: &str, reads: u32) {
        self.lock().stale_reads.insert(key.to_string(), reads);
    }

    /// Answer at most `limit` keys per batch read (`None` = all).
    pub fn set_page_limit(&self, limit: Option<usize>) {
        self.lock().page_limit = limit;
    }

    pub fn stats(&self) -> CallStats {
        self.lock().stats
    }

    /// Current value for `key`, bypassing faults and counters.
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.lock().items.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl State {
    fn take_injected(&mut self) -> Result<(), TransportError> {
        match self.injected.pop_front() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Whether an eventually-consistent read of `key` misses; consumes one lagged read.
    fn read_is_stale(&mut self, key: &str) -> bool {
        match self.stale_reads.get_mut(key) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }
}

impl Table for MemoryTable {
    fn get_item(&self, key: &str, consistent: bool) -> Result<Option<Value>, TransportError> {
        let mut state = self.lock();
        state.stats.get_item += 1;
        state.take_injected()?;
        if !consistent && state.read_is_stale(key) {
            return Ok(None);
        }
        Ok(state.items.get(key).cloned())
    }

    fn batch_get_item(
        &self,
        keys: &[String],
        consistent: bool,
    ) -> Result<BatchGetPage, TransportError> {
        let mut state = self.lock();
        state.stats.batch_get_item += 1;
        state.take_injected()?;

        if keys.is_empty() || keys.len() > BATCH_GET_LIMIT {
            return Err(TransportError::new(
                "ValidationException",
                format!("batch read must ask for 1..={} keys, got {}", BATCH_GET_LIMIT, keys.len()),
            ));
        }
        let mut seen = HashSet::with_capacity(keys.len());
        if !keys.iter().all(|k| seen.insert(k.as_str())) {
            return Err(TransportError::new(
                "ValidationException",
                "provided list of item keys contains duplicates",
            ));
        }

        let answered = state.page_limit.unwrap_or(keys.len()).min(keys.len());
        let (now, later) = keys.split_at(answered);

        let mut page = BatchGetPage {
            items: Vec::with_capacity(now.len()),
            unprocessed: later.to_vec(),
        };
        for key in now {
            if !consistent && state.read_is_stale(key) {
                continue;
            }
            if let Some(v) = state.items.get(key) {
                page.items.push((key.clone(), v.clone()));
            }
        }
        Ok(page)
    }

    fn put_item(&self, key: &str, value: &Value) -> Result<(), TransportError> {
        let mut state = self.lock();
        state.stats.put_item += 1;
        state.take_injected()?;
        state.items.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn delete_item(&self, key: &str) -> Result<(), TransportError> {
        let mut state = self.lock();
        state.stats.delete_item += 1;
        state.take_injected()?;
        state.items.remove(key);
        Ok(())
    }

    fn add_to_counter(&self, key: &str, delta: i64) -> Result<i64, TransportError> {
        let mut state = self.lock();
        state.stats.add_to_counter += 1;
        state.take_injected()?;
        let current = match state.items.get(key) {
            None => 0,
            Some(Value::Number(n)) => *n,
            Some(Value::Binary(_)) => {
                return Err(TransportError::new(
                    "ValidationException",
                    "an operand in the update expression has an incorrect data type",
                ))
            }
        };
        let next = current.checked_add(delta).ok_or_else(|| {
            TransportError::new(COUNTER_OVERFLOW, format!("{current} + {delta} leaves the 64-bit range"))
        })?;
        state.items.insert(key.to_string(), Value::Number(next));
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("k{i}")).collect()
    }

    #[test]
    fn counter_overflow_leaves_record_unchanged() {
        let t = MemoryTable::new();
        t.put_item("n", &Value::Number(i64::MAX)).unwrap();
        assert_eq!(t.add_to_counter("n", 1).unwrap_err().code, COUNTER_OVERFLOW);
        assert_eq!(t.peek("n"), Some(Value::Number(i64::MAX)));
    }

    #[test]
    fn lagged_reads_only_hit_eventually_consistent_reads() {
        let t = MemoryTable::new();
        t.put_item("a", &Value::from("x")).unwrap();
        t.lag_reads("a", 2);
        assert_eq!(t.get_item("a", true).unwrap(), Some(Value::from("x")));
        assert_eq!(t.get_item("a", false).unwrap(), None);
        assert_eq!(t.get_item("a", false).unwrap(), None);
        assert_eq!(t.get_item("a", false).unwrap(), Some(Value::from("x")));
    }

    #[test]
    fn injected_errors_are_consumed_in_order() {
        let t = MemoryTable::new();
        t.throttle_next(1);
        t.fail_next(TransportError::new("AccessDeniedException", ""));
        assert_eq!(
            t.delete_item("a").unwrap_err().code,
            "ProvisionedThroughputExceededException"
        );
        assert_eq!(t.delete_item("a").unwrap_err().code, "AccessDeniedException");
        assert!(t.delete_item("a").is_ok());
        assert_eq!(t.stats().delete_item, 3);
    }

    #[test]
    fn batch_rejects_oversized_and_duplicate_requests() {
        let t = MemoryTable::new();
        let err = t.batch_get_item(&keys(101), true).unwrap_err();
        assert_eq!(err.code, "ValidationException");
        let dup = vec!["a".to_string(), "a".to_string()];
        assert_eq!(t.batch_get_item(&dup, true).unwrap_err().code, "ValidationException");
    }

    #[test]
    fn page_limit_leaves_tail_unprocessed() {
        let t = MemoryTable::new();
        for k in keys(10) {
            t.put_item(&k, &Value::from(k.as_str())).unwrap();
        }
        t.set_page_limit(Some(4));
        let page = t.batch_get_item(&keys(10), true).unwrap();
        assert_eq!(page.items.len(), 4);
        assert_eq!(page.unprocessed, keys(10)[4..].to_vec());
    }

    #[test]
    fn counter_starts_at_zero_and_rejects_binary() {
        let t = MemoryTable::new();
        assert_eq!(t.add_to_counter("c", 1).unwrap(), 1);
        assert_eq!(t.add_to_counter("c", 1).unwrap(), 2);
        t.put_item("b", &Value::from("text")).unwrap();
        assert_eq!(t.add_to_counter("b", 1).unwrap_err().code, "ValidationException");
    }
}
