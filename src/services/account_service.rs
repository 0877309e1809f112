//! Account repository - fetch, create, update and fund over an `AccountStore`.
//!
//! This service handles:
//! - "absent" vs "present" records as `Option`, never as an emptied struct
//! - AlreadyExists / NotFound semantics
//! - A deadline on every store call
//! - Versioned read-modify-write for funding
//!
//! Nothing here retries a failed store call; only lost version races are
//! re-run, and only by `fund`.

use std::{future::Future, sync::Arc, time::Duration};

use chrono::Utc;

use crate::{
    error::{AccountError, StoreError},
    models::account::{Account, NewAccount},
    store::{AccountStore, WriteCondition},
};

/// Repository over a shared store handle. Cheap to clone.
#[derive(Clone)]
pub struct AccountRepository {
    store: Arc<dyn AccountStore>,
    timeout: Duration,
    max_attempts: u32,
}

impl AccountRepository {
    /// # Arguments
    ///
    /// * `store` - Backing key-value store
    /// * `timeout` - Deadline applied to each individual store call
    /// * `max_attempts` - How many times `fund` re-reads after losing a version race
    pub fn new(store: Arc<dyn AccountStore>, timeout: Duration, max_attempts: u32) -> Self {
        Self {
            store,
            timeout,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    pub(crate) fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run one store call under the configured deadline.
    async fn call<T, F>(&self, operation: &'static str, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(store = self.store.name(), operation, "store call timed out");
                Err(StoreError::Timeout {
                    operation,
                    timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                })
            }
        }
    }

    /// Check the store is reachable.
    pub async fn ping(&self) -> Result<(), AccountError> {
        self.call("ping", self.store.ping()).await?;
        Ok(())
    }

    /// Fetch an account, `None` if no record exists.
    pub async fn fetch(&self, identifier: &str) -> Result<Option<Account>, AccountError> {
        Ok(self.call("get", self.store.get(identifier)).await?)
    }

    /// Fetch an account that must exist.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no record for `identifier`
    /// - `StoreUnavailable`: the store call failed or timed out
    pub async fn get(&self, identifier: &str) -> Result<Account, AccountError> {
        self.fetch(identifier)
            .await?
            .ok_or_else(|| AccountError::NotFound(identifier.to_string()))
    }

    /// Create an account with a zero balance and `created_at = now`.
    ///
    /// The existence check is backed by a `MustNotExist` write, so two
    /// concurrent creates for one identifier cannot both succeed.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists`: a record for the identifier exists (balance untouched)
    /// - `StoreUnavailable`: the store call failed or timed out
    pub async fn create(&self, new: NewAccount) -> Result<Account, AccountError> {
        if self.fetch(&new.identifier).await?.is_some() {
            return Err(AccountError::AlreadyExists(new.identifier));
        }

        let account = Account::open(new, Utc::now());
        match self
            .call("put", self.store.put(&account, WriteCondition::MustNotExist))
            .await
        {
            Ok(stored) => {
                tracing::info!(identifier = %stored.identifier, "account created");
                Ok(stored)
            }
            Err(StoreError::Conflict { identifier }) => Err(AccountError::AlreadyExists(identifier)),
            Err(err) => Err(err.into()),
        }
    }

    /// Overwrite an existing record in full (last writer wins).
    ///
    /// No version check: a concurrent writer's change made between the
    /// caller's read and this write is silently lost.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no record for the identifier
    /// - `StoreUnavailable`: the store call failed or timed out
    pub async fn update(&self, account: &Account) -> Result<Account, AccountError> {
        if self.fetch(&account.identifier).await?.is_none() {
            return Err(AccountError::NotFound(account.identifier.clone()));
        }

        let stored = self
            .call("put", self.store.put(account, WriteCondition::Unconditional))
            .await?;
        Ok(stored)
    }

    /// Overwrite a record only if it still carries `account.version`.
    ///
    /// Returns `Ok(None)` when the record changed (or vanished) since it
    /// was read; the caller decides whether to re-read.
    pub async fn update_if_unchanged(
        &self,
        account: &Account,
    ) -> Result<Option<Account>, AccountError> {
        let condition = WriteCondition::VersionEquals(account.version);
        match self.call("put", self.store.put(account, condition)).await {
            Ok(stored) => Ok(Some(stored)),
            Err(StoreError::Conflict { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Persist two records all-or-nothing, each conditioned on the version
    /// it was read at.
    ///
    /// Returns `Ok(None)` if either record changed since it was read, in
    /// which case neither was written.
    pub async fn update_pair_if_unchanged(
        &self,
        first: &Account,
        second: &Account,
    ) -> Result<Option<(Account, Account)>, AccountError> {
        let writes = [
            (first.clone(), WriteCondition::VersionEquals(first.version)),
            (second.clone(), WriteCondition::VersionEquals(second.version)),
        ];

        match self.call("put_all", self.store.put_all(&writes)).await {
            Ok(stored) => {
                let mut stored = stored.into_iter();
                match (stored.next(), stored.next()) {
                    (Some(first), Some(second)) => Ok(Some((first, second))),
                    _ => Err(StoreError::Unavailable(
                        "put_all returned fewer records than written".to_string(),
                    )
                    .into()),
                }
            }
            Err(StoreError::Conflict { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Add `amount` to an account's balance.
    ///
    /// `amount > 0` is the caller's responsibility. The read-modify-write is
    /// versioned, so a concurrent fund or transfer makes this re-read rather
    /// than overwrite the other change.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no record for `identifier`
    /// - `BalanceOverflow`: the new balance does not fit in an `i64`
    /// - `Contention`: every attempt lost a version race
    /// - `StoreUnavailable`: the store call failed or timed out
    pub async fn fund(&self, identifier: &str, amount: i64) -> Result<Account, AccountError> {
        for attempt in 1..=self.max_attempts {
            let mut account = self.get(identifier).await?;
            account.balance = account
                .balance
                .checked_add(amount)
                .ok_or_else(|| AccountError::BalanceOverflow(identifier.to_string()))?;

            if let Some(stored) = self.update_if_unchanged(&account).await? {
                tracing::info!(identifier, amount, balance = stored.balance, "account funded");
                return Ok(stored);
            }

            tracing::warn!(identifier, attempt, "fund lost a version race, re-reading");
        }

        Err(AccountError::Contention {
            attempts: self.max_attempts,
        })
    }
}
