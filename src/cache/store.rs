//! Entry Store Module
//!
//! Plain keyed storage for cache entries. Freshness is judged by the caller;
//! the store never drops an entry on its own.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{CacheEntry, CachedValue};

// == Entry Store ==
/// Key-value storage of cache entries.
#[derive(Debug, Default)]
pub struct EntryStore {
    /// Key-entry storage
    entries: HashMap<String, CacheEntry>,
}

impl EntryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Read ==
    /// Returns the entry stored under `key`, fresh or not.
    pub fn read(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    // == Write ==
    /// Stores `value` under `key` stamped with `now`.
    ///
    /// Overwrites unconditionally: the last writer wins.
    pub fn write(&mut self, key: &str, value: CachedValue, ttl: Duration, size: usize, now: Instant) {
        let entry = CacheEntry::new(value, ttl, size, now);
        self.entries.insert(key.to_string(), entry);
    }

    // == Delete ==
    /// Removes the entry under `key`. Returns whether one existed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Delete Matching ==
    /// Removes every entry whose key satisfies `predicate`.
    ///
    /// Returns the removed keys.
    pub fn delete_matching<P>(&mut self, mut predicate: P) -> Vec<String>
    where
        P: FnMut(&str) -> bool,
    {
        let doomed: Vec<String> = self
            .entries
            .keys()
            .filter(|key| predicate(key.as_str()))
            .cloned()
            .collect();

        for key in &doomed {
            self.entries.remove(key);
        }

        doomed
    }

    // == Clear ==
    /// Removes every entry. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    // == Approximate Size ==
    /// Sum of the recorded value sizes in bytes.
    pub fn approx_bytes(&self) -> usize {
        self.entries.values().map(|entry| entry.size).sum()
    }

    // == Length ==
    /// Returns the current number of entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
