//! Banking Transfer Service - Main Application Entry Point
//!
//! A REST API server for creating user accounts, funding them, and moving
//! funds between them.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Storage**: key-value `AccountStore`, in-memory or PostgreSQL via sqlx
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Build the configured account store (pool + migrations for PostgreSQL)
//! 3. Build HTTP router with routes and middleware
//! 4. Start server on configured port

use std::sync::Arc;

use anyhow::Context;
use banking_transfer_server::{
    app::{self, AppState},
    config::{Config, StoreBackend},
    db,
    store::{AccountStore, MemoryStore, PostgresStore},
};
use tracing_subscriber::EnvFilter;

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn AccountStore>> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required when STORE_BACKEND=postgres")?;

            let pool = db::create_pool(database_url, config.db_max_connections).await?;
            tracing::info!("Database pool created");

            db::run_migrations(&pool).await?;
            tracing::info!("Database migrations complete");

            Ok(Arc::new(PostgresStore::new(pool)))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        backend = ?config.store_backend,
        commit = ?config.transfer_commit,
        "Configuration loaded"
    );

    let store = build_store(&config).await?;
    let app = app::router(AppState::new(store, &config));

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
