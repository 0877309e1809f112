//! Account operations over a remote key-value store.
//!
//! Accounts are keyed by email and carry a balance. The interesting part is
//! the transfer: two concurrent reads, a balance check, and two writes that
//! the store can only make atomic when asked to (see `config::CommitStrategy`).
//!
//! # Layers
//!
//! - `store`: `AccountStore` adapters (in-memory, PostgreSQL)
//! - `services`: `AccountRepository` and `TransferCoordinator`
//! - `handlers` / `app`: the axum HTTP surface

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;
pub mod validation;
