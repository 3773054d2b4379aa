//! Transfer handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use super::super::state::AppState;
use super::super::types::{ApiResult, CreateTransferRequest, ok};
use crate::ledger::TransferView;

/// Move funds between two accounts
///
/// POST /api/v1/transactions
///
/// Either both balances change and the transfer is recorded, or nothing
/// changes. Failed transfers are not retried.
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    request_body = CreateTransferRequest,
    responses(
        (status = 200, description = "Transfer committed", body = TransferView, content_type = "application/json"),
        (status = 400, description = "Invalid amount, account id, or self transfer"),
        (status = 404, description = "Source or destination account not found"),
        (status = 422, description = "Insufficient balance"),
        (status = 504, description = "Request deadline exceeded")
    ),
    tag = "Transfer"
)]
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateTransferRequest>, JsonRejection>,
) -> ApiResult<TransferView> {
    let Json(req) = payload?;

    let transfer = state
        .ledger
        .create_transfer(
            req.source_account_id,
            req.destination_account_id,
            &req.amount,
        )
        .await?;

    ok(TransferView::new(
        &transfer,
        req.source_account_id,
        req.destination_account_id,
    ))
}
