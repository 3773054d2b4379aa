//! Ledger service facade
//!
//! Entry point used by the gateway. Runs validation, then hands the request
//! to the account store or the transfer engine. Mutating calls run under a
//! request deadline; when it fires the in-flight future is dropped, which
//! rolls back its unit of work.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::account::{AccountStore, AccountView};
use crate::error::LedgerError;
use crate::ledger::{Transfer, TransferLedger, TransferView};
use crate::store::LedgerBackend;
use crate::transfer::TransferEngine;
use crate::validation;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Default page size for transfer history
pub const DEFAULT_HISTORY_LIMIT: i64 = 20;

/// Object-safe view of the ledger for the HTTP layer
#[async_trait]
pub trait LedgerApi: Send + Sync {
    async fn create_account(&self, account_number: i64, initial_balance: &str) -> Result<(), LedgerError>;

    async fn get_account(&self, account_number: i64) -> Result<AccountView, LedgerError>;

    async fn create_transfer(
        &self,
        source_account_number: i64,
        destination_account_number: i64,
        amount: &str,
    ) -> Result<Transfer, LedgerError>;

    /// Newest first, both directions
    async fn list_transfers(&self, account_number: i64, limit: i64) -> Result<Vec<TransferView>, LedgerError>;

    /// Storage liveness
    async fn health(&self) -> Result<(), LedgerError>;

    fn backend_name(&self) -> &'static str;
}

pub struct LedgerService<B: LedgerBackend> {
    backend: Arc<B>,
    accounts: AccountStore<B>,
    ledger: TransferLedger<B>,
    engine: TransferEngine<B>,
    request_timeout: Duration,
}

impl<B: LedgerBackend> LedgerService<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            accounts: AccountStore::new(backend.clone()),
            ledger: TransferLedger::new(backend.clone()),
            engine: TransferEngine::new(backend.clone()),
            backend,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    async fn with_deadline<T, F>(&self, operation: &'static str, fut: F) -> Result<T, LedgerError>
    where
        F: Future<Output = Result<T, LedgerError>>,
    {
        match tokio::time::timeout(self.request_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = self.request_timeout.as_millis() as u64,
                    "Request deadline exceeded"
                );
                Err(LedgerError::DeadlineExceeded)
            }
        }
    }

    async fn account_number_of(
        &self,
        cache: &mut HashMap<i64, i64>,
        internal_id: i64,
    ) -> Result<i64, LedgerError> {
        if let Some(number) = cache.get(&internal_id) {
            return Ok(*number);
        }
        let account = self.accounts.find_by_id(internal_id).await?.ok_or_else(|| {
            LedgerError::PersistenceFailure(format!(
                "transfer references missing account row {}",
                internal_id
            ))
        })?;
        cache.insert(internal_id, account.account_number);
        Ok(account.account_number)
    }
}

#[async_trait]
impl<B: LedgerBackend> LedgerApi for LedgerService<B> {
    async fn create_account(&self, account_number: i64, initial_balance: &str) -> Result<(), LedgerError> {
        self.with_deadline("create_account", async {
            let req =
                validation::validate_create_account(&self.accounts, account_number, initial_balance)
                    .await?;
            self.accounts
                .create(req.account_number, req.initial_balance)
                .await
        })
        .await
    }

    async fn get_account(&self, account_number: i64) -> Result<AccountView, LedgerError> {
        let account_number = validation::check_account_number("account_id", account_number)?;
        let account = self.accounts.get_by_account_number(account_number).await?;
        Ok(AccountView::from(&account))
    }

    async fn create_transfer(
        &self,
        source_account_number: i64,
        destination_account_number: i64,
        amount: &str,
    ) -> Result<Transfer, LedgerError> {
        self.with_deadline("create_transfer", async {
            let req = validation::validate_transfer(
                &self.accounts,
                source_account_number,
                destination_account_number,
                amount,
            )
            .await?;
            self.engine
                .execute(
                    req.source_account_number,
                    req.destination_account_number,
                    req.amount,
                )
                .await
        })
        .await
    }

    async fn list_transfers(&self, account_number: i64, limit: i64) -> Result<Vec<TransferView>, LedgerError> {
        let account_number = validation::check_account_number("account_id", account_number)?;
        let account = self.accounts.get_by_account_number(account_number).await?;
        let history = self.ledger.history(account.internal_id, limit).await?;

        let mut numbers = HashMap::from([(account.internal_id, account.account_number)]);
        let mut views = Vec::with_capacity(history.len());
        for transfer in &history {
            let source = self
                .account_number_of(&mut numbers, transfer.source_account_id)
                .await?;
            let destination = self
                .account_number_of(&mut numbers, transfer.destination_account_id)
                .await?;
            views.push(TransferView::new(transfer, source, destination));
        }
        Ok(views)
    }

    async fn health(&self) -> Result<(), LedgerError> {
        self.backend.ping().await
    }

    fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;

    fn service() -> LedgerService<MemoryBackend> {
        LedgerService::new(Arc::new(MemoryBackend::new()))
    }

    #[tokio::test]
    async fn test_account_round_trip_renders_normalized_balance() {
        let svc = service();
        svc.create_account(1, "100.00000").await.unwrap();

        let view = svc.get_account(1).await.unwrap();
        assert_eq!(view.account_id, 1);
        assert_eq!(view.balance, "100");
    }

    #[tokio::test]
    async fn test_duplicate_account_rejected() {
        let svc = service();
        svc.create_account(7, "1").await.unwrap();
        assert_eq!(
            svc.create_account(7, "2").await.unwrap_err(),
            LedgerError::AlreadyExists(7)
        );
        assert_eq!(svc.get_account(7).await.unwrap().balance, "1");
    }

    #[tokio::test]
    async fn test_get_account_errors() {
        let svc = service();
        assert_eq!(svc.get_account(0).await.unwrap_err().code(), "INVALID_IDENTITY");
        assert_eq!(
            svc.get_account(42).await.unwrap_err(),
            LedgerError::not_found("account", 42)
        );
    }

    #[tokio::test]
    async fn test_transfer_scenario() {
        let svc = service();
        svc.create_account(1, "100.00000").await.unwrap();
        svc.create_account(2, "0").await.unwrap();

        let transfer = svc.create_transfer(1, 2, "30.5").await.unwrap();
        assert_eq!(transfer.amount.to_string(), "30.5");
        assert_eq!(svc.get_account(1).await.unwrap().balance, "69.5");
        assert_eq!(svc.get_account(2).await.unwrap().balance, "30.5");

        assert_eq!(
            svc.create_transfer(1, 2, "100").await.unwrap_err(),
            LedgerError::InsufficientBalance
        );
        assert_eq!(svc.get_account(1).await.unwrap().balance, "69.5");
    }

    #[tokio::test]
    async fn test_list_transfers_uses_account_numbers() {
        let svc = service();
        svc.create_account(10, "50").await.unwrap();
        svc.create_account(20, "50").await.unwrap();
        svc.create_account(30, "0").await.unwrap();

        svc.create_transfer(10, 20, "1").await.unwrap();
        svc.create_transfer(20, 30, "2").await.unwrap();
        svc.create_transfer(10, 30, "3").await.unwrap();

        let history = svc.list_transfers(10, DEFAULT_HISTORY_LIMIT).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].destination_account_id, 30);
        assert_eq!(history[0].amount, "3");
        assert_eq!(history[1].destination_account_id, 20);

        let history = svc.list_transfers(30, 1).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].source_account_id, 10);

        assert!(svc.list_transfers(99, 10).await.is_err());
    }

    #[tokio::test]
    async fn test_deadline_exceeded_rolls_back() {
        let backend = Arc::new(MemoryBackend::new());
        let svc = LedgerService::new(backend.clone()).with_request_timeout(Duration::from_millis(50));
        svc.create_account(1, "10").await.unwrap();
        svc.create_account(2, "0").await.unwrap();

        // Hold the row lock of account 1 so the transfer blocks
        let accounts = AccountStore::new(backend.clone());
        let source = accounts.get_by_account_number(1).await.unwrap();
        let mut blocker = backend.begin().await.unwrap();
        {
            use crate::store::UnitOfWork;
            blocker.lock_account(source.internal_id).await.unwrap();
        }

        assert_eq!(
            svc.create_transfer(1, 2, "5").await.unwrap_err(),
            LedgerError::DeadlineExceeded
        );
        drop(blocker);

        assert_eq!(svc.get_account(1).await.unwrap().balance, "10");
        assert_eq!(svc.get_account(2).await.unwrap().balance, "0");
        assert!(svc.list_transfers(1, 10).await.unwrap().is_empty());

        // Locks were released by the dropped attempt
        svc.create_transfer(1, 2, "5").await.unwrap();
        assert_eq!(svc.get_account(2).await.unwrap().balance, "5");
    }

    #[tokio::test]
    async fn test_health_and_backend_name() {
        let svc = service();
        svc.health().await.unwrap();
        assert_eq!(svc.backend_name(), "memory");
    }
}
