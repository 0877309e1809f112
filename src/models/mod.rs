//! Data models representing stored records and API payloads.

/// Account record and user endpoint payloads
pub mod account;
/// Fund and transfer payloads
pub mod transfer;
