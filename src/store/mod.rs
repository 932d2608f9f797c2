//! Wallet Store
//!
//! Durable keyed storage for wallets and transfer records. The wallet core
//! only talks to the [`WalletStore`] trait; the store is injected at
//! construction time.
//!
//! # Concurrency contract
//!
//! `replace_*` is conditional: it succeeds only if the stored record still has
//! the `version` carried by the argument, and the stored copy gets
//! `version + 1`. Otherwise it fails with [`StoreError::Conflict`] and nothing
//! is written.

pub mod memory;
#[cfg(test)]
pub mod mock;
pub mod postgres;
pub mod records;

pub use memory::InMemoryStore;
pub use postgres::PgStore;
pub use records::{TransferRow, WalletRow};

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::core_types::UserId;
use crate::transfer::{TransferId, TransferRecord, TransferStatus};
use crate::wallet::{Wallet, WalletId};

/// Storage error types
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} {id} is missing or was modified concurrently")]
    Conflict { entity: &'static str, id: String },

    #[error("{entity} {id} already exists")]
    Duplicate { entity: &'static str, id: String },

    #[error("Invalid wallet type: {0}")]
    InvalidWalletType(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Storage collaborator for the wallet core
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Store name for logging
    fn name(&self) -> &'static str;

    /// Fetch one wallet. An unrecognized wallet type is an error here.
    async fn get_wallet(&self, id: WalletId) -> Result<Option<Wallet>, StoreError>;

    /// All wallets owned by `user_id`, oldest first
    ///
    /// Records with an unrecognized wallet type are skipped with a warning.
    async fn get_wallets_by_owner(&self, user_id: UserId) -> Result<Vec<Wallet>, StoreError>;

    /// Insert a new wallet and return the stored form
    async fn create_wallet(&self, wallet: &Wallet) -> Result<Wallet, StoreError>;

    /// Version-checked full replace; returns the stored form
    async fn replace_wallet(&self, wallet: &Wallet) -> Result<Wallet, StoreError>;

    /// Insert a new transfer record and return the stored form
    async fn create_transfer(&self, transfer: &TransferRecord)
    -> Result<TransferRecord, StoreError>;

    async fn get_transfer(&self, id: TransferId) -> Result<Option<TransferRecord>, StoreError>;

    /// Version-checked full replace; returns the stored form
    async fn replace_transfer(
        &self,
        transfer: &TransferRecord,
    ) -> Result<TransferRecord, StoreError>;

    /// Transfers currently in `status`, oldest first
    async fn list_transfers_by_status(
        &self,
        status: TransferStatus,
    ) -> Result<Vec<TransferRecord>, StoreError>;
}

/// Decode owner-listing rows, skipping records with an unknown wallet type
pub(crate) fn decode_owned_wallets(
    user_id: UserId,
    rows: impl IntoIterator<Item = WalletRow>,
) -> Result<Vec<Wallet>, StoreError> {
    let mut wallets = Vec::new();
    for row in rows {
        let wallet_id = row.wallet_id.clone();
        match row.into_wallet() {
            Ok(wallet) => wallets.push(wallet),
            Err(StoreError::InvalidWalletType(tag)) => {
                warn!(
                    user_id = user_id,
                    wallet_id = %wallet_id,
                    wallet_type = %tag,
                    "Skipping wallet with invalid type"
                );
            }
            Err(e) => return Err(e),
        }
    }
    wallets.sort_by_key(|w| (w.created, w.id));
    Ok(wallets)
}
