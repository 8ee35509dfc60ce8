//! Cache Statistics Module
//!
//! Per-key access counters and the read-only snapshot reported by
//! `TtlCache::stats`. Nothing here feeds back into caching decisions.

use std::collections::HashMap;

use serde::Serialize;

// == Access Counters ==
/// Counts accesses that produced a value, per key.
#[derive(Debug, Default)]
pub struct AccessCounters {
    counts: HashMap<String, u64>,
}

impl AccessCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the counter for `key`.
    pub fn record(&mut self, key: &str) {
        match self.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(key.to_string(), 1);
            }
        }
    }

    /// Current count for `key`, zero when never accessed or reset.
    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn remove(&mut self, key: &str) {
        self.counts.remove(key);
    }

    /// Drops the counters of every key satisfying `predicate`.
    pub fn remove_matching<P>(&mut self, mut predicate: P)
    where
        P: FnMut(&str) -> bool,
    {
        self.counts.retain(|key, _| !predicate(key.as_str()));
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    // == Top N ==
    /// Returns the `n` most accessed keys.
    ///
    /// Ties are broken by key so the order is stable between calls.
    pub fn top(&self, n: usize) -> Vec<KeyAccess> {
        let mut ranked: Vec<KeyAccess> = self
            .counts
            .iter()
            .map(|(key, count)| KeyAccess {
                key: key.clone(),
                count: *count,
            })
            .collect();

        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        ranked.truncate(n);
        ranked
    }
}

// == Key Access ==
/// One row of the top-keys report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyAccess {
    pub key: String,
    pub count: u64,
}

// == Cache Stats ==
/// Point-in-time view of the cache.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of stored keys, stale ones included
    pub total_keys: usize,
    /// Most accessed keys, highest first
    pub top_keys: Vec<KeyAccess>,
    /// Sum of serialized value sizes in bytes
    pub approx_bytes: usize,
    /// Lookups answered from a fresh entry
    pub hits: u64,
    /// Lookups that had to go through the loader path
    pub misses: u64,
    /// Loader executions that succeeded
    pub loads: u64,
    /// Loader executions that returned an error
    pub load_failures: u64,
    /// Callers that joined a load started by someone else
    pub coalesced: u64,
    /// Loads running right now
    pub in_flight: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
