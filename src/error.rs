//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache and its service surface.
///
/// `Clone` because one load outcome is handed to every caller that joined it.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// The loader returned an error
    #[error("Loader failed for '{key}': {cause:#}")]
    Loader {
        key: String,
        cause: Arc<anyhow::Error>,
    },

    /// The loader panicked before producing a result
    #[error("Loader panicked for '{key}'")]
    LoaderPanicked { key: String },

    /// A composite key could not be built from the given parts
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// An invalidation pattern is not a valid regular expression
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// The key holds a value of a different type than requested
    #[error("Key '{key}' does not hold a value of type {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    /// Unknown resource
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Wraps a loader error for `key`.
    pub fn loader(key: impl Into<String>, cause: anyhow::Error) -> Self {
        CacheError::Loader {
            key: key.into(),
            cause: Arc::new(cause),
        }
    }

    /// The loader's own error, if this is a loader failure.
    pub fn loader_cause(&self) -> Option<&anyhow::Error> {
        match self {
            CacheError::Loader { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::Loader { .. } => StatusCode::BAD_GATEWAY,
            CacheError::InvalidKey(_) | CacheError::InvalidPattern(_) => StatusCode::BAD_REQUEST,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::LoaderPanicked { .. }
            | CacheError::TypeMismatch { .. }
            | CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_error_keeps_cause() {
        let err = CacheError::loader("arenas", anyhow::anyhow!("connection refused"));

        assert_eq!(err.loader_cause().unwrap().to_string(), "connection refused");
        assert!(err.to_string().contains("arenas"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_clones_share_cause() {
        let err = CacheError::loader("k", anyhow::anyhow!("boom"));
        let copy = err.clone();

        match (&err, &copy) {
            (CacheError::Loader { cause: a, .. }, CacheError::Loader { cause: b, .. }) => {
                assert!(Arc::ptr_eq(a, b));
            }
            _ => panic!("expected loader errors"),
        }
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (CacheError::loader("k", anyhow::anyhow!("x")), StatusCode::BAD_GATEWAY),
            (CacheError::InvalidKey("empty".into()), StatusCode::BAD_REQUEST),
            (CacheError::InvalidPattern("(".into()), StatusCode::BAD_REQUEST),
            (CacheError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                CacheError::LoaderPanicked { key: "k".into() },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
