//! HTTP handlers
//!
//! Thin shims: parse ids and bodies, call [`crate::service::WalletService`],
//! wrap the result in `ApiResponse`.

pub mod health;
pub mod transfer;
pub mod wallet;

pub use health::health_check;
pub use transfer::{create_transfer, get_reconciliation_backlog, get_transfer, update_transfer_status};
pub use wallet::{adjust_balance, create_wallet, get_user_wallets, get_wallet};

#[cfg(test)]
pub(crate) fn test_state() -> std::sync::Arc<super::state::AppState> {
    use crate::service::WalletService;
    use crate::store::InMemoryStore;
    use crate::transfer::SettlementPolicy;
    use std::sync::Arc;

    let service = WalletService::new(Arc::new(InMemoryStore::new()), SettlementPolicy::default());
    Arc::new(super::state::AppState::new(Arc::new(service), None))
}
