//! Database connection pool and migration management.
//!
//! Only used when the store backend is `postgres`.

use sqlx::{Pool, Postgres};

/// Type alias for PostgreSQL connection pool.
pub type DbPool = Pool<Postgres>;

/// Create a new PostgreSQL connection pool.
///
/// # Arguments
///
/// * `database_url` - PostgreSQL connection string
/// * `max_connections` - Upper bound on pooled connections
///
/// Both fetches of a transfer may hold a connection at once, so keep this
/// at least 2.
///
/// # Errors
///
/// Returns an error if the connection string is invalid or the server
/// cannot be reached.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Run database migrations from the `migrations/` directory.
///
/// Creates the `banking_users` table on first start. Migrations are tracked
/// in `_sqlx_migrations`, so each runs only once.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    // The macro reads migrations at compile time from ./migrations directory
    sqlx::migrate!("./migrations").run(pool).await
}
