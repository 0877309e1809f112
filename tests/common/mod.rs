//! Shared fixtures: a store wrapper that can fail, stall, or gate calls.

#![allow(dead_code)]

use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use banking_transfer_server::{
    config::CommitStrategy,
    error::StoreError,
    models::account::Account,
    services::{AccountRepository, TransferCoordinator},
    store::{AccountStore, MemoryStore, WriteCondition},
};
use chrono::Utc;
use tokio::sync::Barrier;

struct Gate {
    identifier: String,
    barrier: Arc<Barrier>,
    remaining: usize,
}

/// `MemoryStore` with fault injection and call counting.
#[derive(Default)]
pub struct TestStore {
    inner: MemoryStore,
    failing_puts: Mutex<HashSet<String>>,
    failing_gets: Mutex<HashSet<String>>,
    hanging_gets: Mutex<HashSet<String>>,
    get_delay: Mutex<Option<Duration>>,
    gate: Mutex<Option<Gate>>,
    reject_conditional: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl TestStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Insert a record directly, bypassing counters and faults.
    pub async fn seed(&self, identifier: &str, balance: i64) {
        let account = Account {
            identifier: identifier.to_string(),
            display_name: identifier.to_string(),
            created_at: Utc::now(),
            balance,
            version: 0,
        };
        self.inner
            .put(&account, WriteCondition::MustNotExist)
            .await
            .unwrap();
    }

    pub async fn balance(&self, identifier: &str) -> i64 {
        self.inner.get(identifier).await.unwrap().unwrap().balance
    }

    /// Reads served since creation (seeding and `balance` excluded).
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Records written since creation (seeding excluded).
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every conditional write lose, as if another writer always got there first.
    pub fn reject_conditional_writes(&self) {
        self.reject_conditional.store(true, Ordering::SeqCst);
    }

    pub fn fail_puts_for(&self, identifier: &str) {
        self.failing_puts.lock().unwrap().insert(identifier.to_string());
    }

    pub fn fail_gets_for(&self, identifier: &str) {
        self.failing_gets.lock().unwrap().insert(identifier.to_string());
    }

    pub fn hang_gets_for(&self, identifier: &str) {
        self.hanging_gets.lock().unwrap().insert(identifier.to_string());
    }

    pub fn delay_gets(&self, delay: Duration) {
        *self.get_delay.lock().unwrap() = Some(delay);
    }

    /// Hold the next `parties` reads of `identifier` until all of them have arrived.
    pub fn gate_gets(&self, identifier: &str, parties: usize) {
        *self.gate.lock().unwrap() = Some(Gate {
            identifier: identifier.to_string(),
            barrier: Arc::new(Barrier::new(parties)),
            remaining: parties,
        });
    }

    fn gate_for(&self, identifier: &str) -> Option<Arc<Barrier>> {
        let mut gate = self.gate.lock().unwrap();
        match gate.as_mut() {
            Some(gate) if gate.identifier == identifier && gate.remaining > 0 => {
                gate.remaining -= 1;
                Some(gate.barrier.clone())
            }
            _ => None,
        }
    }

    fn check_put(&self, identifier: &str, condition: WriteCondition) -> Result<(), StoreError> {
        if self.failing_puts.lock().unwrap().contains(identifier) {
            return Err(StoreError::Unavailable(format!("throttled writing {identifier}")));
        }
        if condition != WriteCondition::Unconditional
            && self.reject_conditional.load(Ordering::SeqCst)
        {
            return Err(StoreError::Conflict {
                identifier: identifier.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for TestStore {
    fn name(&self) -> &'static str {
        "test"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }

    async fn get(&self, identifier: &str) -> Result<Option<Account>, StoreError> {
        let hangs = self.hanging_gets.lock().unwrap().contains(identifier);
        if hangs {
            std::future::pending::<()>().await;
        }
        let fails = self.failing_gets.lock().unwrap().contains(identifier);
        if fails {
            return Err(StoreError::Unavailable(format!("throttled reading {identifier}")));
        }

        let delay = *self.get_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(barrier) = self.gate_for(identifier) {
            barrier.wait().await;
        }

        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(identifier).await
    }

    async fn put(
        &self,
        account: &Account,
        condition: WriteCondition,
    ) -> Result<Account, StoreError> {
        self.check_put(&account.identifier, condition)?;
        let stored = self.inner.put(account, condition).await?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(stored)
    }

    async fn put_all(
        &self,
        writes: &[(Account, WriteCondition)],
    ) -> Result<Vec<Account>, StoreError> {
        for (account, condition) in writes {
            self.check_put(&account.identifier, *condition)?;
        }
        let stored = self.inner.put_all(writes).await?;
        self.writes.fetch_add(stored.len(), Ordering::SeqCst);
        Ok(stored)
    }
}

pub fn repository(
    store: &Arc<TestStore>,
    timeout: Duration,
    max_attempts: u32,
) -> AccountRepository {
    let store: Arc<dyn AccountStore> = store.clone();
    AccountRepository::new(store, timeout, max_attempts)
}

pub fn coordinator(store: &Arc<TestStore>, strategy: CommitStrategy) -> TransferCoordinator {
    TransferCoordinator::new(repository(store, Duration::from_secs(1), 3), strategy)
}
