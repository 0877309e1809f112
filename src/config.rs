//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use std::time::Duration;

use serde::Deserialize;

/// Which `AccountStore` adapter backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

/// How a transfer persists its two updated records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitStrategy {
    /// One all-or-nothing write conditioned on the versions read.
    /// Version conflicts restart the transfer.
    Atomic,

    /// Two sequential last-writer-wins updates, sender first.
    /// A failed recipient update leaves the sender debited.
    Sequential,
}

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `STORE_BACKEND` (optional): `memory` or `postgres`, defaults to `memory`
/// - `DATABASE_URL` (required for `postgres`): PostgreSQL connection string
/// - `DB_MAX_CONNECTIONS` (optional): pool size, defaults to 5
/// - `STORE_TIMEOUT_MS` (optional): deadline for each store call, defaults to 5000
/// - `TRANSFER_COMMIT` (optional): `atomic` or `sequential`, defaults to `atomic`
/// - `TRANSFER_MAX_ATTEMPTS` (optional): attempts before giving up on version conflicts, defaults to 3
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_backend")]
    pub store_backend: StoreBackend,

    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    #[serde(default = "default_commit")]
    pub transfer_commit: CommitStrategy,

    #[serde(default = "default_max_attempts")]
    pub transfer_max_attempts: u32,
}

fn default_port() -> u16 {
    3000
}

fn default_backend() -> StoreBackend {
    StoreBackend::Memory
}

fn default_max_connections() -> u32 {
    5
}

fn default_store_timeout_ms() -> u64 {
    5000
}

fn default_commit() -> CommitStrategy {
    CommitStrategy::Atomic
}

fn default_max_attempts() -> u32 {
    3
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if values cannot be parsed into the expected types.
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        Self::from_vars(std::env::vars())
    }

    /// Build configuration from explicit key/value pairs (upper-case keys).
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}
