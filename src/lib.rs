//! Transfer Ledger - accounts and atomic transfers
//!
//! # Modules
//!
//! - [`money`] - Exact decimal amounts (5 fractional digits)
//! - [`error`] - Ledger error kinds and their HTTP mapping
//! - [`store`] - Storage seam with PostgreSQL and in-memory backends
//! - [`account`] - Account store
//! - [`ledger`] - Append-only transfer log
//! - [`validation`] - Request validation
//! - [`transfer`] - Lock-ordered transfer engine
//! - [`service`] - Facade used by the gateway
//! - [`gateway`] - HTTP API (axum)
//! - [`db`] - PostgreSQL pool and schema

// Core types - must be first!
pub mod error;
pub mod money;

// Storage
pub mod db;
pub mod store;

// Ledger components
pub mod account;
pub mod ledger;
pub mod service;
pub mod transfer;
pub mod validation;

// Process
pub mod config;
pub mod gateway;
pub mod logging;

// Convenient re-exports at crate root
pub use account::{Account, AccountStore, AccountView};
pub use error::LedgerError;
pub use ledger::{Transfer, TransferLedger, TransferView};
pub use money::Money;
pub use service::{LedgerApi, LedgerService};
pub use store::{LedgerBackend, MemoryBackend, PgBackend, UnitOfWork};
pub use transfer::{TransferAttempt, TransferEngine, TransferState};
