//! Account data models and API request/response types.
//!
//! This module defines:
//! - `Account`: the stored record, keyed by its identifier (email)
//! - `NewAccount`: what a caller supplies to create an account
//! - `FetchUserQuery` / `CreateUserRequest`: request shapes for the user endpoints
//! - `AccountResponse`: the JSON shape returned to clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A balance-holding record keyed by a unique identifier.
///
/// # Balance Storage
///
/// Balances are whole minor units stored as `i64`. The non-negative rule is
/// enforced when funds move (fund/transfer), never by the store itself.
///
/// # Versioning
///
/// `version` is bumped by the store on every successful write. Conditional
/// writes compare it against the version the caller read, which is how stale
/// read-modify-write cycles get detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Unique key, immutable after creation
    pub identifier: String,

    /// Human-readable name
    pub display_name: String,

    /// Set once when the account is created
    pub created_at: DateTime<Utc>,

    /// Current balance in minor units
    pub balance: i64,

    /// Store-assigned write counter
    pub version: i64,
}

impl Account {
    /// Build a fresh, never-persisted account with a zero balance.
    pub fn open(new: NewAccount, created_at: DateTime<Utc>) -> Self {
        Self {
            identifier: new.identifier,
            display_name: new.display_name,
            created_at,
            balance: 0,
            version: 0,
        }
    }
}

/// Caller-supplied fields for a new account.
///
/// `created_at` and `balance` are always assigned by the repository.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub identifier: String,
    pub display_name: String,
}

/// Query string for `GET /user`.
#[derive(Debug, Deserialize)]
pub struct FetchUserQuery {
    pub email: Option<String>,
}

/// Request body for creating a new user account.
///
/// # JSON Example
///
/// ```json
/// {
///   "email": "ada@example.com",
///   "name": "Ada Lovelace"
/// }
/// ```
///
/// Any `createdAt` or `balance` a client sends is ignored.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,

    #[serde(default)]
    pub name: String,
}

impl From<CreateUserRequest> for NewAccount {
    fn from(request: CreateUserRequest) -> Self {
        Self {
            identifier: request.email,
            display_name: request.name,
        }
    }
}

/// Response body for user endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "email": "ada@example.com",
///   "name": "Ada Lovelace",
///   "createdAt": "2025-12-20T10:00:00Z",
///   "balance": 0
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub balance: i64,
}

/// Convert a stored Account to the API shape.
///
/// Drops the internal `version` field.
impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            email: account.identifier,
            name: account.display_name,
            created_at: account.created_at,
            balance: account.balance,
        }
    }
}
