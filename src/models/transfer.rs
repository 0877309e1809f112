//! Request/response types for balance-moving operations.
//!
//! This module defines:
//! - `FundAccountRequest`: credit an account from outside the system
//! - `TransferRequest`: move funds between two accounts
//! - `MessageResponse`: plain acknowledgement body

use serde::{Deserialize, Serialize};

/// Request to fund (add money to) an account.
///
/// # JSON Example
///
/// ```json
/// {
///   "email": "ada@example.com",
///   "amount": 5000
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct FundAccountRequest {
    pub email: String,
    pub amount: i64,
}

/// Request to transfer money between accounts.
///
/// # JSON Example
///
/// ```json
/// {
///   "senderEmail": "ada@example.com",
///   "recipientEmail": "grace@example.com",
///   "amount": 2500
/// }
/// ```
///
/// # Validation
///
/// - Both emails must be well formed
/// - Amount must be positive
/// - Sender and recipient must differ
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub sender_email: String,
    pub recipient_email: String,
    pub amount: i64,
}

/// Acknowledgement body for operations with no record to return.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
