//! Wallet handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core_types::UserId;
use crate::wallet::{Wallet, WalletId};

use super::super::state::AppState;
use super::super::types::{AdjustBalanceRequest, ApiError, ApiResult, NewWalletRequest, ok};

fn parse_wallet_id(raw: &str) -> Result<WalletId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid wallet ID format"))
}

/// POST /wallets
pub async fn create_wallet(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewWalletRequest>,
) -> ApiResult<Wallet> {
    let wallet_type = req.wallet_type()?;
    ok(state.service.create_wallet(req.user_id, wallet_type).await?)
}

/// GET /wallets/{wallet_id}
pub async fn get_wallet(
    State(state): State<Arc<AppState>>,
    Path(wallet_id): Path<String>,
) -> ApiResult<Wallet> {
    let wallet_id = parse_wallet_id(&wallet_id)?;
    ok(state.service.get_wallet(wallet_id).await?)
}

/// GET /wallets/users/{user_id}
pub async fn get_user_wallets(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> ApiResult<Vec<Wallet>> {
    ok(state.service.get_wallets_for_user(user_id).await?)
}

/// PATCH /wallets/funds/{wallet_id}
pub async fn adjust_balance(
    State(state): State<Arc<AppState>>,
    Path(wallet_id): Path<String>,
    Json(req): Json<AdjustBalanceRequest>,
) -> ApiResult<Wallet> {
    let wallet_id = parse_wallet_id(&wallet_id)?;
    ok(state
        .service
        .adjust_balance(wallet_id, req.action, req.amount.inner())
        .await?)
}
