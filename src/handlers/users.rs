//! User account HTTP handlers.
//!
//! This module implements the account-related API endpoints:
//! - GET /user?email= - Fetch an account
//! - POST /user/create - Create a new account
//! - POST /user/fund - Add funds to an account

use crate::{
    app::AppState,
    error::AppError,
    models::{
        account::{AccountResponse, CreateUserRequest, FetchUserQuery},
        transfer::{FundAccountRequest, MessageResponse},
    },
    validation,
};
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
};

/// Fetch an account by email.
///
/// # Endpoint
///
/// `GET /user?email=ada@example.com`
///
/// # Response
///
/// - **Success (200 OK)**: Returns the account
/// - **Error (400)**: Email missing or malformed
/// - **Error (404)**: No account for this email
/// - **Error (503)**: Store unavailable
pub async fn fetch_user(
    State(state): State<AppState>,
    Query(query): Query<FetchUserQuery>,
) -> Result<Json<AccountResponse>, AppError> {
    let email = query
        .email
        .ok_or_else(|| AppError::InvalidRequest("Email is required".to_string()))?;
    validation::require_email(&email)?;

    let account = state.accounts.get(&email).await?;

    Ok(Json(account.into()))
}

/// Create a new account.
///
/// # Endpoint
///
/// `POST /user/create`
///
/// # Request Body
///
/// ```json
/// {
///   "email": "ada@example.com",
///   "name": "Ada Lovelace"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: Returns the created account, balance 0
/// - **Error (400)**: Malformed body or email
/// - **Error (409)**: Account already exists (existing balance untouched)
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    let Json(request) =
        payload.map_err(|_| AppError::InvalidRequest("Invalid user request".to_string()))?;
    validation::require_email(&request.email)?;

    let account = state.accounts.create(request.into()).await?;

    Ok((StatusCode::CREATED, Json(account.into())))
}

/// Add funds to an account.
///
/// # Endpoint
///
/// `POST /user/fund`
///
/// # Request Body
///
/// ```json
/// {
///   "email": "ada@example.com",
///   "amount": 5000
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: `{"message": "Account Funding successful"}`
/// - **Error (400)**: Malformed body, email, or non-positive amount
/// - **Error (404)**: No account for this email
pub async fn fund_account(
    State(state): State<AppState>,
    payload: Result<Json<FundAccountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let Json(request) = payload
        .map_err(|_| AppError::InvalidRequest("Invalid fund account request".to_string()))?;
    validation::require_email(&request.email)?;
    validation::require_positive_amount(request.amount)?;

    state.accounts.fund(&request.email, request.amount).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Account Funding successful")),
    ))
}
