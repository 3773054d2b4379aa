//! Transfer Ledger
//!
//! Append-only record of committed transfers. Appending needs an open
//! [`UnitOfWork`] so a ledger entry can only be written together with the
//! balance changes it documents.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::LedgerError;
use crate::money::Money;
use crate::store::{LedgerBackend, UnitOfWork};

/// Upper bound for history queries
pub const MAX_HISTORY_LIMIT: i64 = 100;

/// Committed transfer record (immutable)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub id: i64,
    pub source_account_id: i64,
    pub destination_account_id: i64,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
}

/// Client-facing transfer record, referencing accounts by account number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TransferView {
    #[schema(example = 1)]
    pub transaction_id: i64,
    #[schema(example = 1)]
    pub source_account_id: i64,
    #[schema(example = 2)]
    pub destination_account_id: i64,
    #[schema(example = "30.5")]
    pub amount: String,
    pub created_at: DateTime<Utc>,
}

impl TransferView {
    pub fn new(transfer: &Transfer, source_number: i64, destination_number: i64) -> Self {
        Self {
            transaction_id: transfer.id,
            source_account_id: source_number,
            destination_account_id: destination_number,
            amount: transfer.amount.to_string(),
            created_at: transfer.created_at,
        }
    }
}

/// Append-only transfer log
pub struct TransferLedger<B: LedgerBackend> {
    backend: Arc<B>,
}

impl<B: LedgerBackend> TransferLedger<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Append a transfer inside the caller's unit of work
    ///
    /// Sign and distinctness are re-checked here as well as by the storage
    /// constraints.
    pub async fn append(
        &self,
        tx: &mut B::Tx,
        source_internal_id: i64,
        destination_internal_id: i64,
        amount: Money,
    ) -> Result<Transfer, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount {
                field: "amount",
                reason: "must be greater than 0",
            });
        }
        if source_internal_id == destination_internal_id {
            return Err(LedgerError::PersistenceFailure(format!(
                "ledger entry would reference internal account {} twice",
                source_internal_id
            )));
        }

        let transfer = tx
            .insert_transfer(source_internal_id, destination_internal_id, amount)
            .await?;

        tracing::debug!(
            transfer_id = transfer.id,
            source = source_internal_id,
            destination = destination_internal_id,
            amount = %amount,
            "Ledger entry appended"
        );
        Ok(transfer)
    }

    /// Committed transfers touching an account, newest first
    ///
    /// `limit` is clamped to `1..=MAX_HISTORY_LIMIT`.
    pub async fn history(&self, internal_id: i64, limit: i64) -> Result<Vec<Transfer>, LedgerError> {
        let limit = limit.clamp(1, MAX_HISTORY_LIMIT);
        self.backend.transfers_for(internal_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;

    #[tokio::test]
    async fn test_append_visible_only_after_commit() {
        let backend = Arc::new(MemoryBackend::new());
        let ledger = TransferLedger::new(backend.clone());

        let (a, b) = {
            let mut tx = backend.begin().await.unwrap();
            let a = tx.insert_account(1, Money::from_units(10)).await.unwrap();
            let b = tx.insert_account(2, Money::ZERO).await.unwrap();
            tx.commit().await.unwrap();
            (a, b)
        };

        let mut tx = backend.begin().await.unwrap();
        let t = ledger
            .append(&mut tx, a.internal_id, b.internal_id, Money::from_units(3))
            .await
            .unwrap();
        assert!(ledger.history(a.internal_id, 10).await.unwrap().is_empty());
        tx.commit().await.unwrap();

        let history = ledger.history(b.internal_id, 10).await.unwrap();
        assert_eq!(history, vec![t]);
    }

    #[tokio::test]
    async fn test_append_dropped_with_rollback() {
        let backend = Arc::new(MemoryBackend::new());
        let ledger = TransferLedger::new(backend.clone());

        let mut tx = backend.begin().await.unwrap();
        let a = tx.insert_account(1, Money::from_units(10)).await.unwrap();
        let b = tx.insert_account(2, Money::ZERO).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = backend.begin().await.unwrap();
        ledger
            .append(&mut tx, a.internal_id, b.internal_id, Money::from_units(3))
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        assert!(ledger.history(a.internal_id, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_rejects_non_positive_amount() {
        let backend = Arc::new(MemoryBackend::new());
        let ledger = TransferLedger::new(backend.clone());
        let mut tx = backend.begin().await.unwrap();

        let err = ledger.append(&mut tx, 1, 2, Money::ZERO).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_AMOUNT");

        let err = ledger
            .append(&mut tx, 1, 1, Money::from_units(1))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "PERSISTENCE_FAILURE");
    }
}
