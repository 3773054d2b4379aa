//! Request validation
//!
//! Structural checks that run before any lock is taken. Order is fixed and
//! the first failure wins:
//!
//! 1. identity (positive account numbers, distinct transfer sides)
//! 2. amount parsing
//! 3. amount sign, then scale
//! 4. existence probes against the store (fast reject only; the store and
//!    the engine re-check under their own unit of work)

use std::cmp::Ordering;

use crate::account::AccountStore;
use crate::error::LedgerError;
use crate::money::{self, Money};
use crate::store::LedgerBackend;

/// Account creation request that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedAccount {
    pub account_number: i64,
    pub initial_balance: Money,
}

/// Transfer request that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedTransfer {
    pub source_account_number: i64,
    pub destination_account_number: i64,
    pub amount: Money,
}

/// Sign rule for an amount field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignRule {
    NonNegative,
    Positive,
}

pub fn check_account_number(field: &'static str, value: i64) -> Result<i64, LedgerError> {
    if value <= 0 {
        return Err(LedgerError::InvalidIdentity { field, value });
    }
    Ok(value)
}

pub fn check_distinct(source: i64, destination: i64) -> Result<(), LedgerError> {
    if source == destination {
        return Err(LedgerError::SelfTransfer(source));
    }
    Ok(())
}

/// Parse an amount string: format, then sign, then scale
pub fn parse_amount(field: &'static str, raw: &str, rule: SignRule) -> Result<Money, LedgerError> {
    let sign = money::literal_sign(raw).map_err(|e| LedgerError::malformed(field, e))?;

    match (rule, sign) {
        (SignRule::NonNegative, Ordering::Less) => {
            return Err(LedgerError::InvalidAmount {
                field,
                reason: "must be non-negative",
            });
        }
        (SignRule::Positive, Ordering::Less | Ordering::Equal) => {
            return Err(LedgerError::InvalidAmount {
                field,
                reason: "must be greater than 0",
            });
        }
        _ => {}
    }

    Money::parse(raw).map_err(|e| LedgerError::malformed(field, e))
}

/// Identity, balance format/sign/scale, then the duplicate fast-reject
pub async fn validate_create_account<B: LedgerBackend>(
    accounts: &AccountStore<B>,
    account_number: i64,
    initial_balance: &str,
) -> Result<ValidatedAccount, LedgerError> {
    let account_number = check_account_number("account_id", account_number)?;
    let initial_balance = parse_amount("initial_balance", initial_balance, SignRule::NonNegative)?;

    if accounts.exists(account_number).await? {
        return Err(LedgerError::AlreadyExists(account_number));
    }

    Ok(ValidatedAccount {
        account_number,
        initial_balance,
    })
}

/// Identities, amount format/sign/scale, then both existence probes
pub async fn validate_transfer<B: LedgerBackend>(
    accounts: &AccountStore<B>,
    source_account_number: i64,
    destination_account_number: i64,
    amount: &str,
) -> Result<ValidatedTransfer, LedgerError> {
    let source = check_account_number("source_account_id", source_account_number)?;
    let destination = check_account_number("destination_account_id", destination_account_number)?;
    check_distinct(source, destination)?;

    let amount = parse_amount("amount", amount, SignRule::Positive)?;

    if !accounts.exists(source).await? {
        return Err(LedgerError::not_found("source", source));
    }
    if !accounts.exists(destination).await? {
        return Err(LedgerError::not_found("destination", destination));
    }

    Ok(ValidatedTransfer {
        source_account_number: source,
        destination_account_number: destination,
        amount,
    })
}
