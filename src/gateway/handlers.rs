//! HTTP handlers
//!
//! - [`account`]: open account, balance, transfer history
//! - [`transfer`]: create transfer
//! - [`health`]: liveness

pub mod account;
pub mod health;
pub mod transfer;

pub use account::{create_account, get_account, list_account_transactions};
pub use health::{HealthResponse, health_check};
pub use transfer::create_transaction;

