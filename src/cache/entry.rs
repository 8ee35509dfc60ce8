//! Cache Entry Module
//!
//! Defines a single stored value tagged with its storage time and TTL.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

/// Type-erased cached value shared between the store and every caller.
pub type CachedValue = Arc<dyn Any + Send + Sync>;

// == Cache Entry ==
/// Represents a single cache entry with value and freshness metadata.
///
/// Entries are never removed because they went stale. Staleness only means the
/// next access for the key has to reload.
#[derive(Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: CachedValue,
    /// When the value was written
    pub stored_at: Instant,
    /// How long the value stays fresh after `stored_at`
    pub ttl: Duration,
    /// Serialized length of the value, used for the memory estimate
    pub size: usize,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with `now`.
    pub fn new(value: CachedValue, ttl: Duration, size: usize, now: Instant) -> Self {
        Self {
            value,
            stored_at: now,
            ttl,
            size,
        }
    }

    // == Is Fresh ==
    /// Checks whether the entry may still be served at `now`.
    ///
    /// Boundary condition: an entry whose age equals its TTL is stale, so a
    /// zero TTL never produces a hit.
    pub fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < self.ttl
    }

    // == Downcast ==
    /// Returns the value as `Arc<T>` if it was stored with that type.
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("stored_at", &self.stored_at)
            .field("ttl", &self.ttl)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}
