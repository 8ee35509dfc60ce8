//! Cache Module
//!
//! Provides the read-through TTL cache and the pieces it is built from.

mod entry;
mod flight;
mod key;
mod stats;
mod store;
mod ttl;


// Re-export public types
pub use entry::{CacheEntry, CachedValue};
pub use flight::SingleFlight;
pub use key::composite_key;
pub use stats::{AccessCounters, CacheStats, KeyAccess};
pub use store::EntryStore;
pub use ttl::TtlCache;

// == Public Constants ==
/// Separator between the dimensions of a composite key
pub const KEY_DELIMITER: &str = ":";

/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
