//! In-memory backend
//!
//! Behaves like the PostgreSQL backend for everything the ledger relies on:
//!
//! - per-row exclusive locks that block until released (`tokio::sync::Mutex`)
//! - writes staged in the unit of work and applied at commit, so nothing is
//!   visible to other readers before commit and a dropped unit leaves no trace
//! - unique account numbers, non-negative balances, positive amounts, distinct
//!   transfer sides and existing referenced accounts, re-checked at commit
//!
//! Used by the test suite and for running the service without a database.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::{LedgerBackend, UnitOfWork};
use crate::account::Account;
use crate::error::LedgerError;
use crate::ledger::Transfer;
use crate::money::Money;

#[derive(Default)]
struct Tables {
    accounts: BTreeMap<i64, Account>,
    by_number: HashMap<i64, i64>,
    transfers: Vec<Transfer>,
}

struct Shared {
    tables: Mutex<Tables>,
    row_locks: DashMap<i64, Arc<AsyncMutex<()>>>,
    next_account_id: AtomicI64,
    next_transfer_id: AtomicI64,
}

impl Shared {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        // Tables are only mutated in `commit`, which cannot panic halfway
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// In-process ledger storage
#[derive(Clone)]
pub struct MemoryBackend {
    shared: Arc<Shared>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                tables: Mutex::new(Tables::default()),
                row_locks: DashMap::new(),
                next_account_id: AtomicI64::new(1),
                next_transfer_id: AtomicI64::new(1),
            }),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerBackend for MemoryBackend {
    type Tx = MemoryUnitOfWork;

    fn name(&self) -> &'static str {
        "memory"
    }

    async fn begin(&self) -> Result<Self::Tx, LedgerError> {
        Ok(MemoryUnitOfWork {
            shared: self.shared.clone(),
            held: HashMap::new(),
            new_accounts: Vec::new(),
            balances: HashMap::new(),
            transfers: Vec::new(),
        })
    }

    async fn find_account(&self, account_number: i64) -> Result<Option<Account>, LedgerError> {
        let tables = self.shared.tables();
        Ok(tables
            .by_number
            .get(&account_number)
            .and_then(|id| tables.accounts.get(id))
            .cloned())
    }

    async fn find_account_by_id(&self, internal_id: i64) -> Result<Option<Account>, LedgerError> {
        Ok(self.shared.tables().accounts.get(&internal_id).cloned())
    }

    async fn transfers_for(
        &self,
        internal_id: i64,
        limit: i64,
    ) -> Result<Vec<Transfer>, LedgerError> {
        let tables = self.shared.tables();
        Ok(tables
            .transfers
            .iter()
            .rev()
            .filter(|t| {
                t.source_account_id == internal_id || t.destination_account_id == internal_id
            })
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), LedgerError> {
        Ok(())
    }
}

/// Unit of work over [`MemoryBackend`]
///
/// Row locks live in `held` and are released when the unit is committed,
/// rolled back or dropped.
pub struct MemoryUnitOfWork {
    shared: Arc<Shared>,
    held: HashMap<i64, OwnedMutexGuard<()>>,
    new_accounts: Vec<Account>,
    balances: HashMap<i64, Money>,
    transfers: Vec<Transfer>,
}

impl MemoryUnitOfWork {
    /// Committed row with this unit's staged writes applied
    fn visible(&self, internal_id: i64) -> Option<Account> {
        if let Some(account) = self.new_accounts.iter().find(|a| a.internal_id == internal_id) {
            return Some(account.clone());
        }
        let mut account = self.shared.tables().accounts.get(&internal_id).cloned()?;
        if let Some(balance) = self.balances.get(&internal_id) {
            account.balance = *balance;
        }
        Some(account)
    }

    fn is_new(&self, internal_id: i64) -> bool {
        self.new_accounts.iter().any(|a| a.internal_id == internal_id)
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn find_account(&mut self, account_number: i64) -> Result<Option<Account>, LedgerError> {
        if let Some(account) = self
            .new_accounts
            .iter()
            .find(|a| a.account_number == account_number)
        {
            return Ok(Some(account.clone()));
        }
        let internal_id = self.shared.tables().by_number.get(&account_number).copied();
        Ok(internal_id.and_then(|id| self.visible(id)))
    }

    async fn insert_account(
        &mut self,
        account_number: i64,
        balance: Money,
    ) -> Result<Account, LedgerError> {
        if balance.is_negative() {
            return Err(LedgerError::InvalidBalance(format!(
                "balance {} violates non-negative constraint",
                balance
            )));
        }
        let taken = self.shared.tables().by_number.contains_key(&account_number)
            || self.new_accounts.iter().any(|a| a.account_number == account_number);
        if taken {
            return Err(LedgerError::AlreadyExists(account_number));
        }

        let account = Account {
            internal_id: self.shared.next_account_id.fetch_add(1, Ordering::SeqCst),
            account_number,
            balance,
        };
        self.new_accounts.push(account.clone());
        Ok(account)
    }

    async fn lock_account(&mut self, internal_id: i64) -> Result<Option<Account>, LedgerError> {
        if self.held.contains_key(&internal_id) || self.is_new(internal_id) {
            return Ok(self.visible(internal_id));
        }
        if !self.shared.tables().accounts.contains_key(&internal_id) {
            return Ok(None);
        }

        let row_lock = self
            .shared
            .row_locks
            .entry(internal_id)
            .or_default()
            .value()
            .clone();
        let guard = row_lock.lock_owned().await;
        self.held.insert(internal_id, guard);

        // Read after the lock so the previous holder's commit is visible
        Ok(self.visible(internal_id))
    }

    async fn write_balance(&mut self, internal_id: i64, balance: Money) -> Result<(), LedgerError> {
        if balance.is_negative() {
            return Err(LedgerError::InvalidBalance(format!(
                "balance {} violates non-negative constraint",
                balance
            )));
        }
        if let Some(account) = self
            .new_accounts
            .iter_mut()
            .find(|a| a.internal_id == internal_id)
        {
            account.balance = balance;
            return Ok(());
        }
        if !self.held.contains_key(&internal_id) {
            return Err(LedgerError::PersistenceFailure(format!(
                "balance write on unlocked account row {}",
                internal_id
            )));
        }
        self.balances.insert(internal_id, balance);
        Ok(())
    }

    async fn insert_transfer(
        &mut self,
        source_internal_id: i64,
        destination_internal_id: i64,
        amount: Money,
    ) -> Result<Transfer, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::PersistenceFailure(
                "transfer amount violates positive constraint".to_string(),
            ));
        }
        if source_internal_id == destination_internal_id {
            return Err(LedgerError::PersistenceFailure(
                "transfer violates no-self-transfer constraint".to_string(),
            ));
        }
        for id in [source_internal_id, destination_internal_id] {
            if self.visible(id).is_none() {
                return Err(LedgerError::PersistenceFailure(format!(
                    "transfer references missing account row {}",
                    id
                )));
            }
        }

        let transfer = Transfer {
            id: self.shared.next_transfer_id.fetch_add(1, Ordering::SeqCst),
            source_account_id: source_internal_id,
            destination_account_id: destination_internal_id,
            amount,
            created_at: Utc::now(),
        };
        self.transfers.push(transfer.clone());
        Ok(transfer)
    }

    async fn commit(self) -> Result<(), LedgerError> {
        let mut tables = self.shared.tables();

        // Verify everything before applying anything
        for account in &self.new_accounts {
            if tables.by_number.contains_key(&account.account_number) {
                return Err(LedgerError::AlreadyExists(account.account_number));
            }
        }
        for (id, balance) in &self.balances {
            if balance.is_negative() {
                return Err(LedgerError::InvalidBalance(format!(
                    "balance {} violates non-negative constraint",
                    balance
                )));
            }
            if !tables.accounts.contains_key(id) {
                return Err(LedgerError::PersistenceFailure(format!(
                    "update of missing account row {}",
                    id
                )));
            }
        }

        for account in &self.new_accounts {
            tables
                .by_number
                .insert(account.account_number, account.internal_id);
            tables.accounts.insert(account.internal_id, account.clone());
        }
        for (id, balance) in &self.balances {
            if let Some(account) = tables.accounts.get_mut(id) {
                account.balance = *balance;
            }
        }
        tables.transfers.extend(self.transfers.iter().cloned());

        // Row locks in `self.held` drop after the tables guard
        drop(tables);
        Ok(())
    }

    async fn rollback(self) -> Result<(), LedgerError> {
        Ok(())
    }
}
