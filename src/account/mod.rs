//! Account management module
//!
//! Durable storage and lookup of accounts. Balance writes from the transfer
//! engine also pass through [`AccountStore`] so the non-negative invariant is
//! checked on every mutation path.

pub mod models;
pub mod store;

// Re-export commonly used types
pub use models::{Account, AccountView};
pub use store::AccountStore;
