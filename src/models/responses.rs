//! Response DTOs
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::resource::UserProfile;

/// Response body for PUT /users/:id/bio
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdatedResponse {
    /// Fixed confirmation message
    pub message: String,
    /// The profile as persisted
    pub user: UserProfile,
}

impl ProfileUpdatedResponse {
    pub fn new(user: UserProfile) -> Self {
        Self {
            message: "User profile updated".to_string(),
            user,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
