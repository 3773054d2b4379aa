//! Request bodies and query parameters
//!
//! Amounts stay strings here; parsing and validation happen in the ledger.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAccountRequest {
    #[schema(example = 1)]
    pub account_id: i64,
    /// Non-negative decimal, at most 5 fractional digits
    #[schema(example = "100.00000")]
    pub initial_balance: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccountCreated {
    #[schema(example = 1)]
    pub account_id: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTransferRequest {
    #[schema(example = 1)]
    pub source_account_id: i64,
    #[schema(example = 2)]
    pub destination_account_id: i64,
    /// Positive decimal, at most 5 fractional digits
    #[schema(example = "30.5")]
    pub amount: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Max records, clamped to 1..=100 (default 20)
    pub limit: Option<i64>,
}
