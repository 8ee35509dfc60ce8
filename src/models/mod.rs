//! Domain records and API models
//!
//! Domain records are what the loaders produce and the cache stores; the
//! request/response DTOs shape the HTTP surface.

pub mod domain;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use domain::{Arena, Challenge, LeaderboardEntry, Quest};
pub use requests::{InvalidatePatternRequest, LeaderboardQuery, StatsQuery};
pub use responses::{HealthResponse, InvalidateResponse, LeaderboardResponse, StatsResponse};
