//! Multi-key reads: chunking to the store's batch limit and following
//! "unprocessed keys" until every chunk is fully answered.

use std::collections::HashSet;

use super::StoreClient;
use crate::error::StoreError;
use crate::retry::{run_with_retry, ErrorKind, RetryDecision, TransportError};
use crate::transport::{Table, BATCH_GET_LIMIT};
use crate::value::Value;

/// Split `keys` into consecutive chunks of at most `size` keys.
pub fn partition_chunks<'a>(keys: &'a [String], size: usize) -> impl Iterator<Item = &'a [String]> {
    keys.chunks(size.max(1))
}

/// Drop repeated keys, keeping the first occurrence.
fn dedupe(keys: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(keys.len());
    keys.iter()
        .filter(|k| seen.insert(k.as_str()))
        .cloned()
        .collect()
}

impl<T: Table> StoreClient<T> {
    /// Read many keys; returns the stored values of the keys that exist.
    ///
    /// Order follows processing order, which is not request order once the
    /// store hands back unprocessed keys. Use [`mget_keyed`](Self::mget_keyed)
    /// to reconcile by key.
    pub fn mget(&self, keys: &[String]) -> Result<Vec<Value>, StoreError> {
        Ok(self.mget_keyed(keys)?.into_iter().map(|(_, v)| v).collect())
    }

    /// Read many keys; returns `(key, value)` pairs for the keys that exist.
    pub fn mget_keyed(&self, keys: &[String]) -> Result<Vec<(String, Value)>, StoreError> {
        let keys = dedupe(keys);
        let mut out = Vec::with_capacity(keys.len());
        for (i, chunk) in partition_chunks(&keys, BATCH_GET_LIMIT).enumerate() {
            tracing::debug!(chunk = i, keys = chunk.len(), "batch read");
            self.read_chunk(chunk, &mut out)?;
        }
        Ok(out)
    }

    /// Read one chunk, re-requesting unprocessed keys until none remain.
    fn read_chunk(
        &self,
        chunk: &[String],
        out: &mut Vec<(String, Value)>,
    ) -> Result<(), StoreError> {
        let mut remaining = chunk.to_vec();
        let mut stalled = 0u32;
        while !remaining.is_empty() {
            let page = run_with_retry(&self.retry, "batch_get_item", || {
                self.table.batch_get_item(&remaining, true)
            })?;

            let made_progress = !page.items.is_empty() || page.unprocessed.len() < remaining.len();
            out.extend(page.items);

            if page.unprocessed.is_empty() {
                break;
            }
            tracing::debug!(unprocessed = page.unprocessed.len(), "batch read returned unprocessed keys");

            if made_progress {
                stalled = 0;
            } else {
                // Nothing answered at all: the store is shedding load.
                stalled += 1;
                match self.retry.decide(stalled, ErrorKind::Throttled) {
                    RetryDecision::RetryAfter(d) => std::thread::sleep(d),
                    RetryDecision::NoRetry => {
                        tracing::warn!(attempts = stalled, "batch read made no progress; giving up");
                        return Err(StoreError::RetryExhausted {
                            attempts: stalled,
                            last: TransportError::throttled(format!(
                                "{} keys left unprocessed",
                                page.unprocessed.len()
                            )),
                        });
                    }
                }
            }
            remaining = page.unprocessed;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("k{i}")).collect()
    }

    #[test]
    fn chunks_respect_limit() {
        let k = keys(250);
        let sizes: Vec<usize> = partition_chunks(&k, 100).map(|c| c.len()).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        assert_eq!(partition_chunks(&[], 100).count(), 0);
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let k = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(dedupe(&k), vec!["b".to_string(), "a".to_string()]);
    }
}
