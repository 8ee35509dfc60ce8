//! Domain Facade
//!
//! Narrows the generic cache to one logical resource with a fixed key, TTL
//! and loader, so callers cannot fetch the same resource with drifting TTLs.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;

use crate::cache::TtlCache;
use crate::error::Result;

type BoundLoader<T> = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<T>> + Send + Sync>;

// == Facade ==
/// A cached resource bound to one key.
pub struct Facade<T> {
    cache: TtlCache,
    key: String,
    ttl: Duration,
    loader: BoundLoader<T>,
}

impl<T> Facade<T>
where
    T: Serialize + Send + Sync + 'static,
{
    // == Constructor ==
    /// Binds `key`, `ttl` and `loader` on top of `cache`.
    pub fn new<L, F>(cache: TtlCache, key: impl Into<String>, ttl: Duration, loader: L) -> Self
    where
        L: Fn() -> F + Send + Sync + 'static,
        F: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Self {
            cache,
            key: key.into(),
            ttl,
            loader: Arc::new(move || loader().boxed()),
        }
    }

    // == Get ==
    /// Returns the cached resource, loading it if missing or stale.
    pub async fn get(&self) -> Result<Arc<T>> {
        let loader = Arc::clone(&self.loader);
        self.cache.get(&self.key, self.ttl, move || loader()).await
    }

    // == Clear ==
    /// Invalidates the resource. Returns whether an entry was stored.
    pub fn clear(&self) -> bool {
        self.cache.invalidate(&self.key)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<T> Clone for Facade<T> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            key: self.key.clone(),
            ttl: self.ttl,
            loader: Arc::clone(&self.loader),
        }
    }
}

impl<T> fmt::Debug for Facade<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Facade")
            .field("key", &self.key)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn arenas_facade(cache: &TtlCache, calls: &Arc<AtomicUsize>, ttl: Duration) -> Facade<Vec<String>> {
        let calls = Arc::clone(calls);
        Facade::new(cache.clone(), "arenas", ttl, move || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, anyhow::Error>(vec!["Syntax Swamp".to_string()])
            }
        })
    }

    #[tokio::test]
    async fn test_facade_caches_under_bound_key() {
        let cache = TtlCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let arenas = arenas_facade(&cache, &calls, Duration::from_secs(60));

        let first = arenas.get().await.unwrap();
        let second = arenas.get().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.contains("arenas"));
    }

    #[tokio::test]
    async fn test_facade_clear_forces_reload() {
        let cache = TtlCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let arenas = arenas_facade(&cache, &calls, Duration::from_secs(60));

        arenas.get().await.unwrap();
        assert!(arenas.clear());
        arenas.get().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_facade_uses_bound_ttl() {
        let cache = TtlCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let arenas = arenas_facade(&cache, &calls, Duration::from_millis(100));

        arenas.get().await.unwrap();
        tokio::time::advance(Duration::from_millis(150)).await;
        arenas.get().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_clones_share_the_cache() {
        let cache = TtlCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let arenas = arenas_facade(&cache, &calls, Duration::from_secs(60));
        let copy = arenas.clone();

        arenas.get().await.unwrap();
        copy.get().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(copy.key(), "arenas");
    }
}
