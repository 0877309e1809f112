//! Process-local account store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{AccountStore, WriteCondition};
use crate::{error::StoreError, models::account::Account};

/// In-memory store backed by a mutex-guarded map.
///
/// The lock is only held for the duration of a single call, so `put_all`
/// is atomic with respect to every other call on the same store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Account>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Account>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

fn check(
    current: Option<&Account>,
    account: &Account,
    condition: WriteCondition,
) -> Result<(), StoreError> {
    let holds = match condition {
        WriteCondition::Unconditional => true,
        WriteCondition::MustNotExist => current.is_none(),
        WriteCondition::VersionEquals(expected) => {
            current.is_some_and(|stored| stored.version == expected)
        }
    };

    if holds {
        Ok(())
    } else {
        Err(StoreError::Conflict {
            identifier: account.identifier.clone(),
        })
    }
}

fn next_version(current: Option<&Account>, account: &Account) -> Account {
    Account {
        version: current.map_or(0, |stored| stored.version) + 1,
        ..account.clone()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }

    async fn get(&self, identifier: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.lock()?.get(identifier).cloned())
    }

    async fn put(
        &self,
        account: &Account,
        condition: WriteCondition,
    ) -> Result<Account, StoreError> {
        let mut records = self.lock()?;
        let current = records.get(&account.identifier);
        check(current, account, condition)?;
        let stored = next_version(current, account);
        records.insert(stored.identifier.clone(), stored.clone());
        Ok(stored)
    }

    async fn put_all(
        &self,
        writes: &[(Account, WriteCondition)],
    ) -> Result<Vec<Account>, StoreError> {
        let mut records = self.lock()?;

        // Writes are judged in order against the batch applied so far, so a
        // repeated identifier sees the version its earlier write produced.
        let mut staged: HashMap<String, Account> = HashMap::new();
        let mut stored = Vec::with_capacity(writes.len());
        for (account, condition) in writes {
            let current = staged
                .get(&account.identifier)
                .or_else(|| records.get(&account.identifier));
            check(current, account, *condition)?;
            let next = next_version(current, account);
            staged.insert(next.identifier.clone(), next.clone());
            stored.push(next);
        }

        records.extend(staged);
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(identifier: &str, balance: i64) -> Account {
        Account {
            identifier: identifier.to_string(),
            display_name: "Test".to_string(),
            created_at: Utc::now(),
            balance,
            version: 0,
        }
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_identifier() {
        let store = MemoryStore::new();
        assert!(store.get("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_bumps_version() {
        let store = MemoryStore::new();
        let stored = store
            .put(&account("a@example.com", 5), WriteCondition::MustNotExist)
            .await
            .unwrap();
        assert_eq!(stored.version, 1);

        let again = store
            .put(&stored, WriteCondition::VersionEquals(1))
            .await
            .unwrap();
        assert_eq!(again.version, 2);
        assert_eq!(store.get("a@example.com").await.unwrap(), Some(again));
    }

    #[tokio::test]
    async fn must_not_exist_rejects_second_create() {
        let store = MemoryStore::new();
        store
            .put(&account("a@example.com", 0), WriteCondition::MustNotExist)
            .await
            .unwrap();

        let err = store
            .put(&account("a@example.com", 99), WriteCondition::MustNotExist)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
        assert_eq!(store.get("a@example.com").await.unwrap().unwrap().balance, 0);
    }

    #[tokio::test]
    async fn stale_version_is_rejected() {
        let store = MemoryStore::new();
        let stored = store
            .put(&account("a@example.com", 0), WriteCondition::MustNotExist)
            .await
            .unwrap();
        store
            .put(&stored, WriteCondition::Unconditional)
            .await
            .unwrap();

        let err = store
            .put(&stored, WriteCondition::VersionEquals(stored.version))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn put_all_writes_nothing_when_one_condition_fails() {
        let store = MemoryStore::new();
        let a = store
            .put(&account("a@example.com", 10), WriteCondition::MustNotExist)
            .await
            .unwrap();
        let b = store
            .put(&account("b@example.com", 20), WriteCondition::MustNotExist)
            .await
            .unwrap();

        let writes = [
            (Account { balance: 0, ..a.clone() }, WriteCondition::VersionEquals(a.version)),
            (Account { balance: 30, ..b.clone() }, WriteCondition::VersionEquals(b.version + 7)),
        ];
        assert!(store.put_all(&writes).await.is_err());

        assert_eq!(store.get("a@example.com").await.unwrap().unwrap().balance, 10);
        assert_eq!(store.get("b@example.com").await.unwrap().unwrap().balance, 20);
    }

    #[tokio::test]
    async fn put_all_judges_repeated_identifier_in_order() {
        let store = MemoryStore::new();
        let a = store
            .put(&account("a@example.com", 100), WriteCondition::MustNotExist)
            .await
            .unwrap();

        let writes = [
            (Account { balance: 70, ..a.clone() }, WriteCondition::VersionEquals(a.version)),
            (Account { balance: 130, ..a.clone() }, WriteCondition::VersionEquals(a.version)),
        ];
        let err = store.put_all(&writes).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { ref identifier } if identifier == "a@example.com"));

        let stored = store.get("a@example.com").await.unwrap().unwrap();
        assert_eq!((stored.balance, stored.version), (100, a.version));
    }

    #[tokio::test]
    async fn put_all_chains_versions_for_repeated_identifier() {
        let store = MemoryStore::new();
        let a = store
            .put(&account("a@example.com", 100), WriteCondition::MustNotExist)
            .await
            .unwrap();

        let writes = [
            (Account { balance: 70, ..a.clone() }, WriteCondition::VersionEquals(a.version)),
            (Account { balance: 90, ..a.clone() }, WriteCondition::VersionEquals(a.version + 1)),
        ];
        let stored = store.put_all(&writes).await.unwrap();
        assert_eq!(stored[1].version, a.version + 2);
        assert_eq!(store.get("a@example.com").await.unwrap().unwrap().balance, 90);
    }
}
