//! Account Store
//!
//! Creation, lookup and balance writes for accounts. Every write path calls
//! [`AccountStore::guard_balance`] before touching storage.

use std::sync::Arc;

use crate::error::LedgerError;
use crate::money::Money;
use crate::store::{self, LedgerBackend, UnitOfWork};

use super::models::Account;

/// Account repository over a [`LedgerBackend`]
pub struct AccountStore<B: LedgerBackend> {
    backend: Arc<B>,
}

impl<B: LedgerBackend> AccountStore<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Storage-boundary invariant: balances are non-negative and fit `NUMERIC(20,5)`
    pub fn guard_balance(balance: Money) -> Result<(), LedgerError> {
        if balance.is_negative() {
            return Err(LedgerError::InvalidBalance(format!(
                "balance cannot be negative: {}",
                balance
            )));
        }
        if !Money::fits_storage(balance.as_decimal()) {
            return Err(LedgerError::InvalidBalance(format!(
                "balance exceeds storage precision: {}",
                balance
            )));
        }
        Ok(())
    }

    /// Create an account
    ///
    /// The existence probe and the insert share one unit of work; a racing
    /// creator that commits first surfaces as `AlreadyExists` from the insert
    /// or the commit.
    pub async fn create(&self, account_number: i64, initial_balance: Money) -> Result<(), LedgerError> {
        Self::guard_balance(initial_balance)?;

        let mut tx = self.backend.begin().await?;
        let account = match Self::insert_new(&mut tx, account_number, initial_balance).await {
            Ok(account) => account,
            Err(e) => {
                store::abort(tx, &e).await;
                return Err(e);
            }
        };
        tx.commit().await?;

        tracing::info!(
            account_number,
            internal_id = account.internal_id,
            balance = %account.balance,
            "Account created"
        );
        Ok(())
    }

    async fn insert_new(
        tx: &mut B::Tx,
        account_number: i64,
        initial_balance: Money,
    ) -> Result<Account, LedgerError> {
        if tx.find_account(account_number).await?.is_some() {
            return Err(LedgerError::AlreadyExists(account_number));
        }
        Self::guard_balance(initial_balance)?;
        tx.insert_account(account_number, initial_balance).await
    }

    /// Non-locking existence probe
    pub async fn exists(&self, account_number: i64) -> Result<bool, LedgerError> {
        Ok(self.backend.find_account(account_number).await?.is_some())
    }

    /// Non-locking lookup
    pub async fn find(&self, account_number: i64) -> Result<Option<Account>, LedgerError> {
        self.backend.find_account(account_number).await
    }

    pub async fn find_by_id(&self, internal_id: i64) -> Result<Option<Account>, LedgerError> {
        self.backend.find_account_by_id(internal_id).await
    }

    pub async fn get_by_account_number(&self, account_number: i64) -> Result<Account, LedgerError> {
        self.find(account_number)
            .await?
            .ok_or_else(|| LedgerError::not_found("account", account_number))
    }

    /// Persist a new balance for a row the caller has locked in `tx`
    pub async fn write_balance(
        &self,
        tx: &mut B::Tx,
        account: &Account,
        new_balance: Money,
    ) -> Result<(), LedgerError> {
        Self::guard_balance(new_balance)?;
        tx.write_balance(account.internal_id, new_balance).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;

    fn store() -> AccountStore<MemoryBackend> {
        AccountStore::new(Arc::new(MemoryBackend::new()))
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = store();
        store
            .create(1, Money::parse("100.00000").unwrap())
            .await
            .unwrap();

        assert!(store.exists(1).await.unwrap());
        let account = store.get_by_account_number(1).await.unwrap();
        assert_eq!(account.account_number, 1);
        assert_eq!(account.balance.to_string(), "100");
    }

    #[tokio::test]
    async fn test_create_duplicate_fails() {
        let store = store();
        store.create(1, Money::ZERO).await.unwrap();

        let err = store.create(1, Money::from_units(5)).await.unwrap_err();
        assert_eq!(err, LedgerError::AlreadyExists(1));
        // First balance untouched
        assert_eq!(
            store.get_by_account_number(1).await.unwrap().balance,
            Money::ZERO
        );
    }

    #[tokio::test]
    async fn test_create_negative_balance_rejected() {
        let store = store();
        let err = store
            .create(1, Money::parse("-0.5").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidBalance(_)));
        assert!(!store.exists(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_missing_account() {
        let store = store();
        assert_eq!(
            store.get_by_account_number(42).await.unwrap_err(),
            LedgerError::not_found("account", 42)
        );
        assert!(!store.exists(42).await.unwrap());
    }

    #[test]
    fn test_guard_balance() {
        assert!(AccountStore::<MemoryBackend>::guard_balance(Money::ZERO).is_ok());
        assert!(AccountStore::<MemoryBackend>::guard_balance(Money::from_units(1)).is_ok());
        assert!(
            AccountStore::<MemoryBackend>::guard_balance(Money::parse("-0.00001").unwrap())
                .is_err()
        );
        let huge = Money::from_units(999_999_999_999_999) + Money::from_units(1);
        assert!(AccountStore::<MemoryBackend>::guard_balance(huge).is_err());
    }
}
