//! TTL Cache Module
//!
//! Read-through cache combining the entry store with single-flight loading.

use std::any::type_name;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use regex::Regex;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::{AccessCounters, CacheStats, CachedValue, EntryStore, SingleFlight};
use crate::error::{CacheError, Result};

// == Tables ==
/// Shared mutable state, always touched under one lock.
#[derive(Debug, Default)]
struct Tables {
    store: EntryStore,
    counters: AccessCounters,
    hits: u64,
    misses: u64,
    loads: u64,
    load_failures: u64,
}

struct CacheState {
    tables: Mutex<Tables>,
    flights: SingleFlight<CachedValue>,
}

impl CacheState {
    /// Fresh value under `key`, without touching any counter.
    fn fresh_value(&self, key: &str) -> Option<CachedValue> {
        let tables = self.tables.lock();
        tables
            .store
            .read(key)
            .filter(|entry| entry.is_fresh(Instant::now()))
            .map(|entry| Arc::clone(&entry.value))
    }

    /// Writes a freshly loaded value. Runs on the load task before its flight
    /// is released.
    fn store_loaded(&self, key: &str, value: CachedValue, ttl: Duration, size: usize) {
        let mut tables = self.tables.lock();
        tables.store.write(key, value, ttl, size, Instant::now());
        tables.loads += 1;
    }

    fn record_failure(&self, key: &str, cause: &anyhow::Error) {
        warn!(key, error = %cause, "Loader failed");
        self.tables.lock().load_failures += 1;
    }
}

// == TTL Cache ==
/// Read-through cache with lazy TTL expiry and per-key load coalescing.
///
/// Cloning is cheap and every clone shares the same tables, so one instance
/// can be handed to all request handlers.
#[derive(Clone)]
pub struct TtlCache {
    state: Arc<CacheState>,
}

impl TtlCache {
    // == Constructor ==
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            state: Arc::new(CacheState {
                tables: Mutex::new(Tables::default()),
                flights: SingleFlight::new(),
            }),
        }
    }

    // == Get ==
    /// Returns the value under `key`, loading it with `loader` when the key is
    /// missing or older than `ttl`.
    ///
    /// Concurrent callers for the same cold key share one loader run. A
    /// failed load is reported to each of them and nothing is stored, so the
    /// next call tries again.
    ///
    /// # Panics
    ///
    /// Panics when a load has to be started outside a tokio runtime.
    pub async fn get<T, L, F>(&self, key: &str, ttl: Duration, loader: L) -> Result<Arc<T>>
    where
        T: Serialize + Send + Sync + 'static,
        L: FnOnce() -> F + Send + 'static,
        F: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        if let Some(value) = self.lookup::<T>(key)? {
            return Ok(value);
        }

        let state = Arc::clone(&self.state);
        let owned_key = key.to_string();
        let loaded = self
            .state
            .flights
            .coalesce(key, move || async move {
                // A load that settled between our lookup and the coalesce
                // already stored a fresh value.
                if let Some(value) = state.fresh_value(&owned_key) {
                    return Ok(value);
                }

                match loader().await {
                    Ok(value) => {
                        let size = approx_size(&owned_key, &value);
                        let value: CachedValue = Arc::new(value);
                        state.store_loaded(&owned_key, Arc::clone(&value), ttl, size);
                        debug!(key = %owned_key, size, "Stored loaded value");
                        Ok(value)
                    }
                    Err(cause) => {
                        state.record_failure(&owned_key, &cause);
                        Err(CacheError::loader(owned_key, cause))
                    }
                }
            })
            .await?;

        let value = downcast::<T>(key, loaded)?;
        self.state.tables.lock().counters.record(key);
        Ok(value)
    }

    /// Fresh-entry fast path. Counts the lookup as a hit or a miss.
    fn lookup<T>(&self, key: &str) -> Result<Option<Arc<T>>>
    where
        T: Send + Sync + 'static,
    {
        let mut tables = self.state.tables.lock();
        let now = Instant::now();

        let fresh = match tables.store.read(key) {
            Some(entry) if entry.is_fresh(now) => Some(downcast::<T>(key, Arc::clone(&entry.value))?),
            _ => None,
        };

        match fresh {
            Some(value) => {
                tables.hits += 1;
                tables.counters.record(key);
                debug!(key, "Cache hit");
                Ok(Some(value))
            }
            None => {
                tables.misses += 1;
                debug!(key, "Cache miss");
                Ok(None)
            }
        }
    }

    // == Invalidate ==
    /// Drops the entry and access counter for `key`.
    ///
    /// A load already running for the key is left alone and will store its
    /// result when it finishes.
    pub fn invalidate(&self, key: &str) -> bool {
        let mut tables = self.state.tables.lock();
        let removed = tables.store.delete(key);
        tables.counters.remove(key);
        info!(key, removed, "Invalidated key");
        removed
    }

    // == Invalidate Pattern ==
    /// Drops every entry whose key matches the regular expression `pattern`.
    ///
    /// A plain substring is a valid pattern. Matching runs once over the keys
    /// present right now. Returns the number of entries removed.
    pub fn invalidate_pattern(&self, pattern: &str) -> Result<usize> {
        let regex = Regex::new(pattern).map_err(|err| CacheError::InvalidPattern(err.to_string()))?;
        let removed = self.invalidate_matching(|key| regex.is_match(key));
        info!(pattern, removed, "Invalidated pattern");
        Ok(removed)
    }

    // == Invalidate Matching ==
    /// Drops every entry and counter whose key satisfies `predicate`.
    pub fn invalidate_matching<P>(&self, mut predicate: P) -> usize
    where
        P: FnMut(&str) -> bool,
    {
        let mut tables = self.state.tables.lock();
        let removed = tables.store.delete_matching(&mut predicate);
        tables.counters.remove_matching(&mut predicate);
        removed.len()
    }

    // == Clear ==
    /// Empties the store and access counters. Running loads are not cancelled.
    pub fn clear(&self) -> usize {
        let mut tables = self.state.tables.lock();
        let removed = tables.store.clear();
        tables.counters.clear();
        info!(removed, "Cache cleared");
        removed
    }

    // == Stats ==
    /// Snapshot of the cache with the `top_n` most accessed keys.
    pub fn stats(&self, top_n: usize) -> CacheStats {
        let in_flight = self.state.flights.in_flight();
        let coalesced = self.state.flights.joined();

        let tables = self.state.tables.lock();
        CacheStats {
            total_keys: tables.store.len(),
            top_keys: tables.counters.top(top_n),
            approx_bytes: tables.store.approx_bytes(),
            hits: tables.hits,
            misses: tables.misses,
            loads: tables.loads,
            load_failures: tables.load_failures,
            coalesced,
            in_flight,
        }
    }

    // == Accessors ==
    /// Access count recorded for `key`.
    pub fn access_count(&self, key: &str) -> u64 {
        self.state.tables.lock().counters.get(key)
    }

    /// Whether an entry, fresh or stale, is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.state.tables.lock().store.read(key).is_some()
    }

    /// Whether a load is currently running for `key`.
    pub fn is_loading(&self, key: &str) -> bool {
        self.state.flights.is_loading(key)
    }

    pub fn len(&self) -> usize {
        self.state.tables.lock().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.tables.lock().store.is_empty()
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("entries", &self.len())
            .field("in_flight", &self.state.flights.in_flight())
            .finish()
    }
}

fn downcast<T>(key: &str, value: CachedValue) -> Result<Arc<T>>
where
    T: Send + Sync + 'static,
{
    value.downcast::<T>().map_err(|_| CacheError::TypeMismatch {
        key: key.to_string(),
        expected: type_name::<T>(),
    })
}

/// Serialized JSON length of `value`, the size proxy used by `stats`.
fn approx_size<T: Serialize>(key: &str, value: &T) -> usize {
    match serde_json::to_vec(value) {
        Ok(bytes) => bytes.len(),
        Err(err) => {
            warn!(key, error = %err, "Could not size cached value");
            0
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::{self, Ready};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;

    const TTL: Duration = Duration::from_millis(1000);

    /// Loader yielding "V1", "V2", ... and counting its runs.
    fn counting_loader(
        calls: &Arc<AtomicUsize>,
    ) -> impl FnOnce() -> Ready<anyhow::Result<String>> + Send + 'static {
        let calls = Arc::clone(calls);
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            future::ready(Ok(format!("V{}", n)))
        }
    }

    fn failing_loader(
        calls: &Arc<AtomicUsize>,
    ) -> impl FnOnce() -> Ready<anyhow::Result<String>> + Send + 'static {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            future::ready(Err(anyhow::anyhow!("query timed out")))
        }
    }

    #[tokio::test]
    async fn test_fresh_hit_skips_loader() {
        let cache = TtlCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache.get("a", TTL, counting_loader(&calls)).await.unwrap();
        let second = cache.get("a", TTL, counting_loader(&calls)).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.as_str(), "V1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_after_ttl() {
        let cache = TtlCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        // t = 0
        let v = cache.get("a", TTL, counting_loader(&calls)).await.unwrap();
        assert_eq!(v.as_str(), "V1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // t = 500ms
        tokio::time::advance(Duration::from_millis(500)).await;
        let v = cache.get("a", TTL, counting_loader(&calls)).await.unwrap();
        assert_eq!(v.as_str(), "V1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // t = 1200ms
        tokio::time::advance(Duration::from_millis(700)).await;
        let v = cache.get("a", TTL, counting_loader(&calls)).await.unwrap();
        assert_eq!(v.as_str(), "V2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // The reload was stored.
        let v = cache.get("a", TTL, counting_loader(&calls)).await.unwrap();
        assert_eq!(v.as_str(), "V2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entry_kept_until_next_access() {
        let cache = TtlCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get("a", TTL, counting_loader(&calls)).await.unwrap();
        tokio::time::advance(Duration::from_secs(5)).await;

        assert!(cache.contains("a"));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let cache = TtlCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let err = cache.get("a", TTL, failing_loader(&calls)).await.unwrap_err();
        assert_eq!(err.loader_cause().unwrap().to_string(), "query timed out");
        assert!(!cache.contains("a"));

        let v = cache.get("a", TTL, counting_loader(&calls)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(v.as_str(), "V2");
        assert_eq!(cache.stats(10).load_failures, 1);
    }

    #[tokio::test]
    async fn test_access_count_includes_completed_miss() {
        let cache = TtlCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..4 {
            cache.get("k", TTL, counting_loader(&calls)).await.unwrap();
        }

        let stats = cache.stats(10);
        assert_eq!(cache.access_count("k"), 4);
        assert_eq!(stats.top_keys[0].key, "k");
        assert_eq!(stats.top_keys[0].count, 4);
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.loads, 1);
    }

    #[tokio::test]
    async fn test_failed_access_not_counted() {
        let cache = TtlCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let _ = cache.get("k", TTL, failing_loader(&calls)).await;
        assert_eq!(cache.access_count("k"), 0);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let cache = TtlCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get("a", TTL, counting_loader(&calls)).await.unwrap();
        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        assert_eq!(cache.access_count("a"), 0);

        let v = cache.get("a", TTL, counting_loader(&calls)).await.unwrap();
        assert_eq!(v.as_str(), "V2");
    }

    #[tokio::test]
    async fn test_invalidate_pattern() {
        let cache = TtlCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let arena_calls = Arc::new(AtomicUsize::new(0));

        cache.get("leaderboard:coding:week", TTL, counting_loader(&calls)).await.unwrap();
        cache.get("leaderboard:coding:month", TTL, counting_loader(&calls)).await.unwrap();
        cache.get("arenas:all", TTL, counting_loader(&arena_calls)).await.unwrap();

        assert_eq!(cache.invalidate_pattern("^leaderboard:").unwrap(), 2);
        assert!(!cache.contains("leaderboard:coding:week"));
        assert!(!cache.contains("leaderboard:coding:month"));
        assert_eq!(cache.access_count("leaderboard:coding:week"), 0);

        cache.get("arenas:all", TTL, counting_loader(&arena_calls)).await.unwrap();
        assert_eq!(arena_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let cache = TtlCache::new();
        let result = cache.invalidate_pattern("(unclosed");
        assert!(matches!(result, Err(CacheError::InvalidPattern(_))));
    }

    #[tokio::test]
    async fn test_clear_empties_everything() {
        let cache = TtlCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get("a", TTL, counting_loader(&calls)).await.unwrap();
        cache.get("b", TTL, counting_loader(&calls)).await.unwrap();

        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
        assert!(cache.stats(10).top_keys.is_empty());
        assert_eq!(cache.stats(10).approx_bytes, 0);
    }

    #[tokio::test]
    async fn test_invalidate_during_load_is_overwritten() {
        let cache = TtlCache::new();
        let gate = Arc::new(Semaphore::new(0));

        let pending = {
            let cache = cache.clone();
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                cache
                    .get("a", TTL, move || async move {
                        let _permit = gate.acquire().await.unwrap();
                        Ok::<_, anyhow::Error>("late".to_string())
                    })
                    .await
            })
        };
        while !cache.is_loading("a") {
            tokio::task::yield_now().await;
        }

        cache.invalidate("a");
        cache.clear();
        gate.add_permits(1);

        assert_eq!(pending.await.unwrap().unwrap().as_str(), "late");
        assert!(cache.contains("a"));
    }

    #[tokio::test]
    async fn test_type_mismatch() {
        let cache = TtlCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get("a", TTL, counting_loader(&calls)).await.unwrap();
        let result = cache
            .get("a", TTL, || async { Ok::<u64, anyhow::Error>(1) })
            .await;

        assert!(matches!(result, Err(CacheError::TypeMismatch { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_memory_estimate_uses_serialized_length() {
        let cache = TtlCache::new();

        cache
            .get("a", TTL, || async { Ok::<_, anyhow::Error>(vec![1u32, 2, 3]) })
            .await
            .unwrap();

        // "[1,2,3]"
        assert_eq!(cache.stats(10).approx_bytes, 7);
    }
}
