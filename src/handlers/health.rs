//! Health check endpoint for service monitoring.

use crate::{app::AppState, error::AppError};
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health check response.
///
/// Returns service status and store connectivity.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: String,

    /// Which store adapter is configured
    pub store: String,

    /// Current server timestamp
    pub timestamp: DateTime<Utc>,
}

/// Health check handler.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "status": "healthy",
///   "store": "postgres",
///   "timestamp": "2025-12-21T19:00:00Z"
/// }
/// ```
///
/// # Response (503 Service Unavailable)
///
/// If the store is unreachable, returns standard error response.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    state.accounts.ping().await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        store: state.accounts.store_name().to_string(),
        timestamp: Utc::now(),
    }))
}
