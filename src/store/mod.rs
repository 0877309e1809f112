//! Account store adapters.
//!
//! An `AccountStore` is the external key-value collaborator: one record per
//! account identifier, read with `get` and written with `put`. Adapters
//! surface collaborator failures unchanged and never retry.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;

use crate::{error::StoreError, models::account::Account};

/// Precondition attached to a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteCondition {
    /// Overwrite whatever is there (last writer wins).
    Unconditional,

    /// Only write if no record exists for the identifier.
    MustNotExist,

    /// Only write if the stored record still carries this version.
    VersionEquals(i64),
}

/// Key-value store holding one `Account` per identifier.
///
/// Every successful write bumps the stored version (a new record starts at 1)
/// and returns the record as stored; the caller's `version` field is ignored.
/// A failed `WriteCondition` yields `StoreError::Conflict`.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Adapter name for logging
    fn name(&self) -> &'static str;

    /// Cheap reachability check used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Read the record for `identifier`, if any.
    async fn get(&self, identifier: &str) -> Result<Option<Account>, StoreError>;

    /// Write a single record.
    async fn put(&self, account: &Account, condition: WriteCondition)
    -> Result<Account, StoreError>;

    /// Write several records all-or-nothing.
    ///
    /// If any condition fails, nothing is written.
    async fn put_all(&self, writes: &[(Account, WriteCondition)])
    -> Result<Vec<Account>, StoreError>;
}
