//! Storage seam
//!
//! The ledger talks to its persistence backend through two traits:
//!
//! - [`LedgerBackend`]: the shared handle (a connection pool, or the
//!   in-process tables). Unlocked reads and opening units of work.
//! - [`UnitOfWork`]: one atomic, isolated transaction. Row locks taken with
//!   [`UnitOfWork::lock_account`] are held until `commit` or `rollback`.
//!   Dropping a unit of work without committing rolls it back.
//!
//! Implementations:
//! - [`postgres::PgBackend`]: PostgreSQL via sqlx (`SELECT ... FOR UPDATE`)
//! - [`memory::MemoryBackend`]: in-process tables with per-row async locks

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::account::Account;
use crate::error::LedgerError;
use crate::ledger::Transfer;
use crate::money::Money;

pub use memory::MemoryBackend;
pub use postgres::PgBackend;

/// Shared persistence handle
#[async_trait]
pub trait LedgerBackend: Send + Sync + 'static {
    type Tx: UnitOfWork;

    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Open an atomic unit of work
    async fn begin(&self) -> Result<Self::Tx, LedgerError>;

    /// Non-locking lookup against committed state
    async fn find_account(&self, account_number: i64) -> Result<Option<Account>, LedgerError>;

    /// Non-locking lookup by internal id
    async fn find_account_by_id(&self, internal_id: i64) -> Result<Option<Account>, LedgerError>;

    /// Committed transfers touching `internal_id` on either side, newest first
    async fn transfers_for(
        &self,
        internal_id: i64,
        limit: i64,
    ) -> Result<Vec<Transfer>, LedgerError>;

    /// Liveness probe
    async fn ping(&self) -> Result<(), LedgerError>;
}

/// One atomic unit of work
#[async_trait]
pub trait UnitOfWork: Send {
    /// Non-locking lookup that also sees this unit's own writes
    async fn find_account(&mut self, account_number: i64) -> Result<Option<Account>, LedgerError>;

    /// Insert a new account row
    ///
    /// Fails with `AlreadyExists` when the account number is taken, including
    /// by a concurrent unit of work that committed first.
    async fn insert_account(
        &mut self,
        account_number: i64,
        balance: Money,
    ) -> Result<Account, LedgerError>;

    /// Exclusively lock an account row by internal id and return its current state
    ///
    /// Blocks until the lock is granted. `None` if the row does not exist.
    async fn lock_account(&mut self, internal_id: i64) -> Result<Option<Account>, LedgerError>;

    /// Overwrite the balance of a row locked by this unit of work
    async fn write_balance(&mut self, internal_id: i64, balance: Money) -> Result<(), LedgerError>;

    /// Insert a transfer record
    async fn insert_transfer(
        &mut self,
        source_internal_id: i64,
        destination_internal_id: i64,
        amount: Money,
    ) -> Result<Transfer, LedgerError>;

    async fn commit(self) -> Result<(), LedgerError>;

    async fn rollback(self) -> Result<(), LedgerError>;
}

/// Roll back a failed unit of work; rollback errors are logged, `cause` is what the caller reports
pub async fn abort<T: UnitOfWork>(tx: T, cause: &LedgerError) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(cause = %cause, error = %e, "Rollback failed");
    }
}
