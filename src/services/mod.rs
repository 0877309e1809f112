//! Business logic services.
//!
//! Services contain the account logic separated from HTTP handlers.
//! They own existence checks, balance validation and commit ordering.

pub mod account_service;
pub mod transfer_service;

pub use account_service::AccountRepository;
pub use transfer_service::{TransferCoordinator, TransferReceipt};
