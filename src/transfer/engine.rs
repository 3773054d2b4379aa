//! Transfer execution
//!
//! 1. unlocked probe of both accounts to learn their internal ids
//! 2. open a unit of work, lock both rows in ascending internal id order
//! 3. check the locked source balance
//! 4. write both balances and append the ledger entry in the same unit
//! 5. commit, or roll back on any failure

use std::sync::Arc;

use crate::account::{Account, AccountStore};
use crate::error::LedgerError;
use crate::ledger::{Transfer, TransferLedger};
use crate::money::Money;
use crate::store::{self, LedgerBackend, UnitOfWork};

use super::state::{TransferAttempt, TransferState};

/// Global lock order for a pair of rows: lowest internal id first
#[inline]
pub fn lock_order(a: i64, b: i64) -> (i64, i64) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Executes transfers against a [`LedgerBackend`]
pub struct TransferEngine<B: LedgerBackend> {
    backend: Arc<B>,
    accounts: AccountStore<B>,
    ledger: TransferLedger<B>,
}

impl<B: LedgerBackend> TransferEngine<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            accounts: AccountStore::new(backend.clone()),
            ledger: TransferLedger::new(backend.clone()),
            backend,
        }
    }

    /// Move `amount` from source to destination atomically
    ///
    /// Inputs are expected to be validated already; self-transfer and the
    /// amount sign are re-checked anyway. No retry on any failure.
    pub async fn execute(
        &self,
        source_account_number: i64,
        destination_account_number: i64,
        amount: Money,
    ) -> Result<Transfer, LedgerError> {
        let mut attempt = TransferAttempt::new(source_account_number, destination_account_number);

        let result = self
            .run(
                &mut attempt,
                source_account_number,
                destination_account_number,
                amount,
            )
            .await;

        match &result {
            Ok(transfer) => {
                tracing::info!(
                    transfer_id = transfer.id,
                    source = source_account_number,
                    destination = destination_account_number,
                    amount = %amount,
                    "Transfer committed"
                );
            }
            Err(e) => {
                let reached = attempt.state();
                attempt.abort();
                tracing::info!(
                    source = source_account_number,
                    destination = destination_account_number,
                    amount = %amount,
                    state = %reached,
                    code = e.code(),
                    "Transfer aborted"
                );
            }
        }
        result
    }

    async fn run(
        &self,
        attempt: &mut TransferAttempt,
        source_account_number: i64,
        destination_account_number: i64,
        amount: Money,
    ) -> Result<Transfer, LedgerError> {
        if source_account_number == destination_account_number {
            return Err(LedgerError::SelfTransfer(source_account_number));
        }
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount {
                field: "amount",
                reason: "must be greater than 0",
            });
        }

        let source = self
            .accounts
            .find(source_account_number)
            .await?
            .ok_or_else(|| LedgerError::not_found("source", source_account_number))?;
        let destination = self
            .accounts
            .find(destination_account_number)
            .await?
            .ok_or_else(|| LedgerError::not_found("destination", destination_account_number))?;

        attempt.advance(TransferState::Locking)?;
        let mut tx = self.backend.begin().await?;

        match self
            .apply(&mut tx, attempt, &source, &destination, amount)
            .await
        {
            Ok(transfer) => {
                tx.commit().await?;
                attempt.advance(TransferState::Committed)?;
                Ok(transfer)
            }
            Err(e) => {
                store::abort(tx, &e).await;
                Err(e)
            }
        }
    }

    /// Steps inside the unit of work; the caller commits or rolls back
    async fn apply(
        &self,
        tx: &mut B::Tx,
        attempt: &mut TransferAttempt,
        source_probe: &Account,
        destination_probe: &Account,
        amount: Money,
    ) -> Result<Transfer, LedgerError> {
        let (first, second) = lock_order(source_probe.internal_id, destination_probe.internal_id);

        let first_row = tx.lock_account(first).await?;
        let second_row = tx.lock_account(second).await?;

        let (source, destination) = if first == source_probe.internal_id {
            (first_row, second_row)
        } else {
            (second_row, first_row)
        };
        // Vanished between probe and lock
        let source = source
            .ok_or_else(|| LedgerError::not_found("source", source_probe.account_number))?;
        let destination = destination.ok_or_else(|| {
            LedgerError::not_found("destination", destination_probe.account_number)
        })?;
        attempt.advance(TransferState::Locked)?;

        if source.balance < amount {
            return Err(LedgerError::InsufficientBalance);
        }
        attempt.advance(TransferState::Checked)?;

        let new_source_balance = source.balance - amount;
        let new_destination_balance = destination.balance + amount;

        self.accounts
            .write_balance(tx, &source, new_source_balance)
            .await?;
        self.accounts
            .write_balance(tx, &destination, new_destination_balance)
            .await?;

        self.ledger
            .append(tx, source.internal_id, destination.internal_id, amount)
            .await
    }
}
