//! Error types and HTTP error response handling.
//!
//! Errors are layered the same way the code is:
//! - `StoreError`: what the key-value collaborator reported
//! - `AccountError`: the closed set of domain outcomes callers must handle
//! - `AppError`: the HTTP-facing wrapper, which owns all user-facing text

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Failure reported by an `AccountStore` adapter.
///
/// Surfaced unchanged by the repository; nothing at this layer retries.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The call did not complete within the configured deadline.
    #[error("store call `{operation}` timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    /// A conditional write found the record in a different state than expected.
    #[error("conditional write rejected for {identifier}")]
    Conflict { identifier: String },

    /// Database operation failed (connection, query, decoding).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Any other collaborator failure (throttling, network, malformed record).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Domain error kinds for account operations.
///
/// Every failure of fetch/create/fund/transfer is one of these variants;
/// message text for clients lives in `AppError`, not here.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// No record exists for the identifier.
    #[error("account {0} does not exist")]
    NotFound(String),

    /// Create was called for an identifier that already has a record.
    #[error("account {0} already exists")]
    AlreadyExists(String),

    /// Debit exceeds the balance read at validation time.
    #[error("account {identifier} holds {balance}, cannot debit {requested}")]
    InsufficientBalance {
        identifier: String,
        balance: i64,
        requested: i64,
    },

    /// The store call failed.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// The sender's debit was committed but the recipient's credit was not.
    ///
    /// Only produced by the sequential commit strategy. The accounts are left
    /// inconsistent and need reconciliation; this is not safe to retry.
    #[error("transfer {sender} -> {recipient} debited the sender but failed to credit the recipient: {cause}")]
    PartialTransferFailure {
        sender: String,
        recipient: String,
        #[source]
        cause: Box<AccountError>,
    },

    /// Every attempt lost a version race against a concurrent writer.
    #[error("gave up after {attempts} attempts lost to concurrent writers")]
    Contention { attempts: u32 },

    /// Applying the amount would overflow the balance.
    #[error("balance of {0} would overflow")]
    BalanceOverflow(String),
}

impl AccountError {
    /// Whether the caller may re-run the whole operation as-is.
    ///
    /// Every outcome is a clean abort except a partial transfer, which needs
    /// reconciliation first.
    pub fn is_safe_to_retry(&self) -> bool {
        !matches!(self, AccountError::PartialTransferFailure { .. })
    }
}

/// Application-wide error type returned by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// No route matched the request path.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Not implemented")]
    NotImplemented,

    /// A domain operation failed.
    #[error(transparent)]
    Account(#[from] AccountError),
}

impl AppError {
    /// Map an error to (HTTP status, error code, user-facing message).
    fn presentation(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::NotImplemented => (
                StatusCode::NOT_FOUND,
                "not_implemented",
                "Not implemented".to_string(),
            ),
            AppError::Account(err) => match err {
                AccountError::NotFound(_) => (
                    StatusCode::NOT_FOUND,
                    "user_not_found",
                    "User does not exist".to_string(),
                ),
                AccountError::AlreadyExists(_) => (
                    StatusCode::CONFLICT,
                    "user_already_exists",
                    "User already exists".to_string(),
                ),
                AccountError::InsufficientBalance { .. } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "insufficient_balance",
                    "Insufficient Balance".to_string(),
                ),
                AccountError::BalanceOverflow(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "balance_overflow",
                    "Amount would overflow the account balance".to_string(),
                ),
                AccountError::Contention { .. } => (
                    StatusCode::CONFLICT,
                    "concurrent_modification",
                    "Account is being modified concurrently, please retry".to_string(),
                ),
                AccountError::StoreUnavailable(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "store_unavailable",
                    "Account store is unavailable, please retry".to_string(),
                ),
                AccountError::PartialTransferFailure { .. } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "partial_transfer_failure",
                    "Transfer did not complete after the sender was debited".to_string(),
                ),
            },
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// Store and partial-transfer details are logged, never sent to the client.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.presentation();

        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
