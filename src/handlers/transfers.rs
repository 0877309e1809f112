//! Transfer HTTP handler.
//!
//! - POST /transfer - Move money between two accounts

use crate::{
    app::AppState,
    error::AppError,
    models::transfer::{MessageResponse, TransferRequest},
    validation,
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

/// Transfer money between accounts.
///
/// # Request Body
///
/// ```json
/// {
///   "senderEmail": "ada@example.com",
///   "recipientEmail": "grace@example.com",
///   "amount": 2500
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: `{"message": "Transaction successful"}`
/// - **Error (400)**: Malformed body or email, non-positive amount, sender == recipient
/// - **Error (404)**: Either account does not exist
/// - **Error (422)**: Sender balance too low
/// - **Error (409)**: Lost every retry to concurrent writers
/// - **Error (500)**: Sender debited but recipient not credited (sequential commit only)
pub async fn create_transfer(
    State(state): State<AppState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let Json(request) = payload.map_err(|rejection| {
        AppError::InvalidRequest(format!("Invalid transfer request: {}", rejection.body_text()))
    })?;
    validation::require_email(&request.sender_email)?;
    validation::require_email(&request.recipient_email)?;
    validation::require_positive_amount(request.amount)?;

    // Prevent transferring to same account
    if request.sender_email == request.recipient_email {
        return Err(AppError::InvalidRequest(
            "Sender and recipient email cannot be same".to_string(),
        ));
    }

    state
        .transfers
        .transfer(&request.sender_email, &request.recipient_email, request.amount)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Transaction successful")),
    ))
}
