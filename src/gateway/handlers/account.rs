//! Account handlers (open account, balance, history)

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};

use super::super::state::AppState;
use super::super::types::{
    AccountCreated, ApiResult, CreateAccountRequest, HistoryQuery, created, ok,
};
use crate::account::AccountView;
use crate::ledger::TransferView;
use crate::service::DEFAULT_HISTORY_LIMIT;

/// Open an account
///
/// POST /api/v1/accounts
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created", body = AccountCreated, content_type = "application/json"),
        (status = 400, description = "Invalid account id or initial balance"),
        (status = 409, description = "Account already exists"),
        (status = 504, description = "Request deadline exceeded")
    ),
    tag = "Account"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> ApiResult<AccountCreated> {
    let Json(req) = payload?;

    state
        .ledger
        .create_account(req.account_id, &req.initial_balance)
        .await?;

    created(AccountCreated {
        account_id: req.account_id,
    })
}

/// Get account balance
///
/// GET /api/v1/accounts/{account_id}
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_id}",
    params(
        ("account_id" = i64, Path, description = "Account number")
    ),
    responses(
        (status = 200, description = "Account snapshot", body = AccountView, content_type = "application/json"),
        (status = 400, description = "Invalid account id"),
        (status = 404, description = "Account not found")
    ),
    tag = "Account"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    account_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<AccountView> {
    let Path(account_id) = account_id?;
    let account = state.ledger.get_account(account_id).await?;
    ok(account)
}

/// Transfer history of an account, newest first
///
/// GET /api/v1/accounts/{account_id}/transactions?limit=20
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_id}/transactions",
    params(
        ("account_id" = i64, Path, description = "Account number"),
        HistoryQuery
    ),
    responses(
        (status = 200, description = "Transfers touching the account", body = [TransferView], content_type = "application/json"),
        (status = 400, description = "Invalid account id or limit"),
        (status = 404, description = "Account not found")
    ),
    tag = "Account"
)]
pub async fn list_account_transactions(
    State(state): State<Arc<AppState>>,
    account_id: Result<Path<i64>, PathRejection>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<Vec<TransferView>> {
    let Path(account_id) = account_id?;
    let Query(query) = query?;

    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let history = state.ledger.list_transfers(account_id, limit).await?;
    ok(history)
}
