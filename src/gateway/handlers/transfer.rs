//! Transfer handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use crate::transfer::{TransferId, TransferRecord, TransferResponse};

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, TransferApiRequest, TransferStatusRequest, ok};

fn parse_transfer_id(raw: &str) -> Result<TransferId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid transfer ID format"))
}

/// POST /wallets/transfers
///
/// A denied request is still a successful call: `data.current_status` is
/// "denied" and `data.message` says why.
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TransferApiRequest>,
) -> ApiResult<TransferResponse> {
    ok(state.service.request_transfer(req.into()).await?)
}

/// GET /wallets/transfers/{transfer_id}
pub async fn get_transfer(
    State(state): State<Arc<AppState>>,
    Path(transfer_id): Path<String>,
) -> ApiResult<TransferRecord> {
    let transfer_id = parse_transfer_id(&transfer_id)?;
    ok(state.service.get_transfer(transfer_id).await?)
}

/// PATCH /wallets/transfers/{transfer_id}
///
/// Admin status update. Approving settles the transfer in the same call.
pub async fn update_transfer_status(
    State(state): State<Arc<AppState>>,
    Path(transfer_id): Path<String>,
    Json(req): Json<TransferStatusRequest>,
) -> ApiResult<TransferRecord> {
    let transfer_id = parse_transfer_id(&transfer_id)?;
    let new_status = req.status()?;
    ok(state
        .service
        .update_transfer_status(transfer_id, new_status)
        .await?)
}

/// GET /wallets/transfers/reconciliation
pub async fn get_reconciliation_backlog(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<TransferRecord>> {
    ok(state.service.transfers_needing_reconciliation().await?)
}
