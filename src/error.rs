//! Error types for the caching layer
//!
//! `StoreError` covers failures inside the store adapters, `AppError` is what
//! handlers return and maps onto the stable JSON error bodies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

// == Store Error Enum ==
/// Failure reported by a cache store or persistent store adapter.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Redis command or connection failure
    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),

    /// SQLite query or connection failure
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    /// Snapshot could not be encoded or decoded
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation exceeded the adapter's time budget
    #[error("operation timed out after {0} ms")]
    Timeout(u64),

    /// Writes must carry a positive TTL
    #[error("ttl must be at least one second")]
    InvalidTtl,

    /// Update targeted a record that no longer exists
    #[error("record {0} does not exist")]
    MissingRecord(String),

    /// Backend refused the operation
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// == App Error Enum ==
/// Unified error type for request handling.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource absent from the source of truth
    #[error("{0} not found")]
    NotFound(String),

    /// Request rejected before any store was touched
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Third-party dependency failed
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// Persistent store failure with no fallback
    #[error("Store failure: {0}")]
    Store(#[from] StoreError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Details of 5xx causes stay in the server log.
        let (status, body) = match &self {
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "message": format!("{} not found", what) }),
            ),
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }
            AppError::Upstream(detail) => {
                error!("Error fetching upstream data: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Unable to fetch data" }),
                )
            }
            AppError::Store(err) => {
                error!("Store error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            AppError::Internal(detail) => {
                error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for request handling.
pub type Result<T> = std::result::Result<T, AppError>;
