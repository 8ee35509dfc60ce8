//! API Module
//!
//! HTTP handlers and routing for the cache service.
//!
//! # Endpoints
//! - `GET /arenas`, `/challenges`, `/quests` - Cached domain collections
//! - `GET /leaderboard/:category` - Cached leaderboard
//! - `GET /cache/stats` - Cache statistics
//! - `DELETE /cache/keys/:key`, `/cache/domains/:name`, `/cache` - Invalidation
//! - `POST /cache/invalidate` - Pattern invalidation
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
