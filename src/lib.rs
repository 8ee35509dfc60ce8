//! Flightcache - an in-process read-through cache
//!
//! TTL entries with lazy expiry, per-key single-flight loading, domain facades
//! and a composite-key leaderboard cache in front of a slow data source.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod facade;
pub mod models;
pub mod source;

pub use api::AppState;
pub use cache::TtlCache;
pub use config::Config;
pub use error::{CacheError, Result};
pub use facade::{DomainCaches, Facade, LeaderboardCache};
