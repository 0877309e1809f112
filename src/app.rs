//! Shared handler state and router construction.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{
    config::Config,
    handlers,
    services::{AccountRepository, TransferCoordinator},
    store::AccountStore,
};

/// State handed to every handler via `State` extraction.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountRepository,
    pub transfers: TransferCoordinator,
}

impl AppState {
    /// Wire the services over `store` using the timeouts and commit strategy from `config`.
    pub fn new(store: Arc<dyn AccountStore>, config: &Config) -> Self {
        let accounts =
            AccountRepository::new(store, config.store_timeout(), config.transfer_max_attempts);
        let transfers = TransferCoordinator::new(accounts.clone(), config.transfer_commit);

        Self {
            accounts,
            transfers,
        }
    }
}

/// Build the HTTP router.
///
/// Routes match the paths the service has always exposed; anything else
/// falls through to a 404 `not_implemented` response.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/user", get(handlers::users::fetch_user))
        .route("/user/create", post(handlers::users::create_user))
        .route("/user/fund", post(handlers::users::fund_account))
        .route("/transfer", post(handlers::transfers::create_transfer))
        .fallback(handlers::not_implemented)
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
