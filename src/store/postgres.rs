//! PostgreSQL-backed account store.
//!
//! Records live in the `banking_users` table, one row per email. Conditions
//! are pushed into the SQL itself (`ON CONFLICT DO NOTHING`, `WHERE version =`)
//! so a rejected write affects zero rows instead of racing a separate read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{AccountStore, WriteCondition};
use crate::{db::DbPool, error::StoreError, models::account::Account};

/// Row shape of the `banking_users` table.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    email: String,
    name: String,
    created_at: DateTime<Utc>,
    balance: i64,
    version: i64,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            identifier: row.email,
            display_name: row.name,
            created_at: row.created_at,
            balance: row.balance,
            version: row.version,
        }
    }
}

/// Store adapter over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: DbPool,
}

impl PostgresStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Execute one conditional write. `None` means the condition did not hold.
async fn write_one<'e, E>(
    executor: E,
    account: &Account,
    condition: WriteCondition,
) -> Result<Option<AccountRow>, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    let sql = match condition {
        WriteCondition::Unconditional => {
            r#"
            INSERT INTO banking_users (email, name, created_at, balance, version)
            VALUES ($1, $2, $3, $4, 1)
            ON CONFLICT (email) DO UPDATE
            SET name = EXCLUDED.name,
                created_at = EXCLUDED.created_at,
                balance = EXCLUDED.balance,
                version = banking_users.version + 1
            RETURNING email, name, created_at, balance, version
            "#
        }
        WriteCondition::MustNotExist => {
            r#"
            INSERT INTO banking_users (email, name, created_at, balance, version)
            VALUES ($1, $2, $3, $4, 1)
            ON CONFLICT (email) DO NOTHING
            RETURNING email, name, created_at, balance, version
            "#
        }
        WriteCondition::VersionEquals(_) => {
            r#"
            UPDATE banking_users
            SET name = $2, created_at = $3, balance = $4, version = version + 1
            WHERE email = $1 AND version = $5
            RETURNING email, name, created_at, balance, version
            "#
        }
    };

    let query = sqlx::query_as::<_, AccountRow>(sql)
        .bind(&account.identifier)
        .bind(&account.display_name)
        .bind(account.created_at)
        .bind(account.balance);

    let query = match condition {
        WriteCondition::VersionEquals(expected) => query.bind(expected),
        _ => query,
    };

    query.fetch_optional(executor).await
}

fn conflict(account: &Account) -> StoreError {
    StoreError::Conflict {
        identifier: account.identifier.clone(),
    }
}

#[async_trait]
impl AccountStore for PostgresStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get(&self, identifier: &str) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT email, name, created_at, balance, version FROM banking_users WHERE email = $1",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    async fn put(
        &self,
        account: &Account,
        condition: WriteCondition,
    ) -> Result<Account, StoreError> {
        write_one(&self.pool, account, condition)
            .await?
            .map(Account::from)
            .ok_or_else(|| conflict(account))
    }

    async fn put_all(
        &self,
        writes: &[(Account, WriteCondition)],
    ) -> Result<Vec<Account>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(writes.len());

        for (account, condition) in writes {
            match write_one(&mut *tx, account, *condition).await? {
                Some(row) => stored.push(Account::from(row)),
                None => {
                    tx.rollback().await?;
                    return Err(conflict(account));
                }
            }
        }

        // Commit all writes atomically
        tx.commit().await?;

        Ok(stored)
    }
}
