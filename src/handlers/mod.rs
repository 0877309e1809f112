//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, query string)
//! 2. Validates it (email shape, amount sign, distinct parties)
//! 3. Calls the account services
//! 4. Returns HTTP response (JSON, status code)

use crate::error::AppError;

/// Health check endpoint
pub mod health;
/// Funds transfer endpoint
pub mod transfers;
/// User lookup, creation and funding endpoints
pub mod users;

/// Fallback for any path without a route.
pub async fn not_implemented() -> AppError {
    AppError::NotImplemented
}
