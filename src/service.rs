//! Wallet Service
//!
//! The operations exposed upward to the HTTP layer. Owns the store handle,
//! the balance engine and the transfer components, all wired to the same
//! injected store.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::config::SettlementConfig;
use crate::core_types::UserId;
use crate::store::WalletStore;
use crate::transfer::{
    NewTransfer, SettlementPolicy, TransferCoordinator, TransferId, TransferRecord,
    TransferResponse, TransferStatus, TransferWorkflow,
};
use crate::wallet::{BalanceAction, BalanceEngine, Wallet, WalletError, WalletId, WalletType};

pub struct WalletService {
    store: Arc<dyn WalletStore>,
    engine: Arc<BalanceEngine>,
    workflow: TransferWorkflow,
    coordinator: TransferCoordinator,
}

impl WalletService {
    pub fn new(store: Arc<dyn WalletStore>, policy: SettlementPolicy) -> Self {
        let engine = Arc::new(BalanceEngine::with_retries(
            store.clone(),
            policy.max_conflict_retries,
        ));
        Self {
            workflow: TransferWorkflow::new(store.clone()),
            coordinator: TransferCoordinator::new(store.clone(), engine.clone(), policy),
            engine,
            store,
        }
    }

    pub fn from_config(store: Arc<dyn WalletStore>, config: &SettlementConfig) -> Self {
        Self::new(store, config.policy())
    }

    /// Name of the backing store ("memory", "postgres")
    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    // === Wallets ===

    /// Create an empty wallet (zero balance, no entries)
    pub async fn create_wallet(
        &self,
        user_id: UserId,
        wallet_type: WalletType,
    ) -> Result<Wallet, WalletError> {
        let wallet = self
            .store
            .create_wallet(&Wallet::new(user_id, wallet_type))
            .await?;
        info!(wallet_id = %wallet.id, user_id, wallet_type = %wallet_type, "Wallet created");
        Ok(wallet)
    }

    pub async fn get_wallet(&self, wallet_id: WalletId) -> Result<Wallet, WalletError> {
        self.store
            .get_wallet(wallet_id)
            .await?
            .ok_or(WalletError::WalletNotFound(wallet_id))
    }

    /// All readable wallets of a user (undecodable records are skipped)
    pub async fn get_wallets_for_user(&self, user_id: UserId) -> Result<Vec<Wallet>, WalletError> {
        Ok(self.store.get_wallets_by_owner(user_id).await?)
    }

    pub async fn adjust_balance(
        &self,
        wallet_id: WalletId,
        action: BalanceAction,
        amount: Decimal,
    ) -> Result<Wallet, WalletError> {
        self.engine.adjust(wallet_id, action, amount).await
    }

    // === Transfers ===

    pub async fn request_transfer(
        &self,
        request: NewTransfer,
    ) -> Result<TransferResponse, WalletError> {
        self.workflow.request_transfer(request).await
    }

    /// Admin status update; APPROVED settles and returns the settled transfer
    pub async fn update_transfer_status(
        &self,
        transfer_id: TransferId,
        new_status: TransferStatus,
    ) -> Result<TransferRecord, WalletError> {
        self.coordinator.update_status(transfer_id, new_status).await
    }

    pub async fn get_transfer(&self, transfer_id: TransferId) -> Result<TransferRecord, WalletError> {
        self.store
            .get_transfer(transfer_id)
            .await?
            .ok_or(WalletError::TransferNotFound(transfer_id))
    }

    /// Transfers whose settlement left funds in flight
    pub async fn transfers_needing_reconciliation(
        &self,
    ) -> Result<Vec<TransferRecord>, WalletError> {
        Ok(self
            .store
            .list_transfers_by_status(TransferStatus::NeedsReconciliation)
            .await?)
    }
}
