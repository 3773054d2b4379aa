//! Data models for accounts

use serde::Serialize;
use utoipa::ToSchema;

use crate::money::Money;

/// Account row
///
/// `internal_id` is assigned by storage and only used for lock ordering and
/// ledger references; clients only ever see `account_number`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub internal_id: i64,
    pub account_number: i64,
    pub balance: Money,
}

/// Client-facing account snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AccountView {
    /// External account number
    #[schema(example = 1)]
    pub account_id: i64,
    /// Balance as an exact decimal string
    #[schema(example = "69.5")]
    pub balance: String,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.account_number,
            balance: account.balance.to_string(),
        }
    }
}
