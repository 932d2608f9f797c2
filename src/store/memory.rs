//! In-memory Wallet Store
//!
//! Keeps storage rows (not domain values) so that reads go through the same
//! decode boundary as the PostgreSQL store. Used when no database is
//! configured, and by tests.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::core_types::UserId;
use crate::transfer::{TransferId, TransferRecord, TransferStatus};
use crate::wallet::{Wallet, WalletId};

use super::records::{TransferRow, WalletRow, to_db_int};
use super::{StoreError, WalletStore, decode_owned_wallets};

/// DashMap-backed store
#[derive(Default)]
pub struct InMemoryStore {
    wallets: DashMap<WalletId, WalletRow>,
    transfers: DashMap<TransferId, TransferRow>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw row as-is (lets tests plant undecodable records)
    #[cfg(test)]
    pub(crate) fn insert_wallet_row(&self, id: WalletId, row: WalletRow) {
        self.wallets.insert(id, row);
    }

    pub fn wallet_count(&self) -> usize {
        self.wallets.len()
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.len()
    }
}

#[async_trait]
impl WalletStore for InMemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_wallet(&self, id: WalletId) -> Result<Option<Wallet>, StoreError> {
        let row = self.wallets.get(&id).map(|r| r.value().clone());
        row.map(WalletRow::into_wallet).transpose()
    }

    async fn get_wallets_by_owner(&self, user_id: UserId) -> Result<Vec<Wallet>, StoreError> {
        // No stored row can carry an id outside BIGINT
        let Ok(owner) = to_db_int("user_id", user_id) else {
            return Ok(Vec::new());
        };
        let rows: Vec<WalletRow> = self
            .wallets
            .iter()
            .filter(|r| r.user_id == owner)
            .map(|r| r.value().clone())
            .collect();
        decode_owned_wallets(user_id, rows)
    }

    async fn create_wallet(&self, wallet: &Wallet) -> Result<Wallet, StoreError> {
        let row = WalletRow::from_wallet(wallet)?;
        match self.wallets.entry(wallet.id) {
            Entry::Occupied(_) => Err(StoreError::Duplicate {
                entity: "wallet",
                id: wallet.id.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(row.clone());
                row.into_wallet()
            }
        }
    }

    async fn replace_wallet(&self, wallet: &Wallet) -> Result<Wallet, StoreError> {
        let mut row = WalletRow::from_wallet(wallet)?;
        let expected = row.version;
        row.version += 1;

        let conflict = || StoreError::Conflict {
            entity: "wallet",
            id: wallet.id.to_string(),
        };
        let mut stored = self.wallets.get_mut(&wallet.id).ok_or_else(conflict)?;
        if stored.version != expected {
            return Err(conflict());
        }
        *stored = row.clone();
        drop(stored);

        row.into_wallet()
    }

    async fn create_transfer(
        &self,
        transfer: &TransferRecord,
    ) -> Result<TransferRecord, StoreError> {
        let row = TransferRow::from_record(transfer)?;
        match self.transfers.entry(transfer.id) {
            Entry::Occupied(_) => Err(StoreError::Duplicate {
                entity: "transfer",
                id: transfer.id.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(row.clone());
                row.into_record()
            }
        }
    }

    async fn get_transfer(&self, id: TransferId) -> Result<Option<TransferRecord>, StoreError> {
        let row = self.transfers.get(&id).map(|r| r.value().clone());
        row.map(TransferRow::into_record).transpose()
    }

    async fn replace_transfer(
        &self,
        transfer: &TransferRecord,
    ) -> Result<TransferRecord, StoreError> {
        let mut row = TransferRow::from_record(transfer)?;
        let expected = row.version;
        row.version += 1;

        let conflict = || StoreError::Conflict {
            entity: "transfer",
            id: transfer.id.to_string(),
        };
        let mut stored = self.transfers.get_mut(&transfer.id).ok_or_else(conflict)?;
        if stored.version != expected {
            return Err(conflict());
        }
        *stored = row.clone();
        drop(stored);

        row.into_record()
    }

    async fn list_transfers_by_status(
        &self,
        status: TransferStatus,
    ) -> Result<Vec<TransferRecord>, StoreError> {
        let rows: Vec<TransferRow> = self
            .transfers
            .iter()
            .filter(|r| r.status == status.as_str())
            .map(|r| r.value().clone())
            .collect();

        let mut records = rows
            .into_iter()
            .map(TransferRow::into_record)
            .collect::<Result<Vec<_>, _>>()?;
        records.sort_by_key(|r| (r.submitted, r.id));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::NewTransfer;
    use crate::wallet::WalletType;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_create_and_get_wallet() {
        let store = InMemoryStore::new();
        let wallet = Wallet::new(1, WalletType::DonatableFunds);

        let created = store.create_wallet(&wallet).await.unwrap();
        assert_eq!(created, wallet);
        assert_eq!(store.get_wallet(wallet.id).await.unwrap(), Some(wallet));
        assert_eq!(store.get_wallet(WalletId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_wallet_rejected() {
        let store = InMemoryStore::new();
        let wallet = Wallet::new(1, WalletType::DonatableFunds);
        store.create_wallet(&wallet).await.unwrap();

        let err = store.create_wallet(&wallet).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_replace_wallet_bumps_version() {
        let store = InMemoryStore::new();
        let mut wallet = store
            .create_wallet(&Wallet::new(1, WalletType::DonatableFunds))
            .await
            .unwrap();

        wallet.total_balance = dec!(100);
        let stored = store.replace_wallet(&wallet).await.unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.total_balance, dec!(100));
    }

    #[tokio::test]
    async fn test_stale_replace_is_conflict() {
        let store = InMemoryStore::new();
        let original = store
            .create_wallet(&Wallet::new(1, WalletType::DonatableFunds))
            .await
            .unwrap();

        let mut first = original.clone();
        first.total_balance = dec!(10);
        store.replace_wallet(&first).await.unwrap();

        // Second writer still holds version 0
        let mut second = original.clone();
        second.total_balance = dec!(20);
        let err = store.replace_wallet(&second).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { entity: "wallet", .. }));

        let current = store.get_wallet(original.id).await.unwrap().unwrap();
        assert_eq!(current.total_balance, dec!(10));
    }

    #[tokio::test]
    async fn test_replace_missing_wallet_is_conflict() {
        let store = InMemoryStore::new();
        let wallet = Wallet::new(1, WalletType::LoanBalance);
        assert!(matches!(
            store.replace_wallet(&wallet).await,
            Err(StoreError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn test_owner_listing_skips_invalid_types() {
        let store = InMemoryStore::new();
        let good = store
            .create_wallet(&Wallet::new(5, WalletType::LoanBalance))
            .await
            .unwrap();
        store
            .create_wallet(&Wallet::new(6, WalletType::LoanBalance))
            .await
            .unwrap();

        let bad = Wallet::new(5, WalletType::DonatableFunds);
        let mut row = WalletRow::from_wallet(&bad).unwrap();
        row.wallet_type = "savings".into();
        store.insert_wallet_row(bad.id, row);

        let wallets = store.get_wallets_by_owner(5).await.unwrap();
        assert_eq!(wallets, vec![good]);

        // Single get of the same record is fatal
        assert!(matches!(
            store.get_wallet(bad.id).await,
            Err(StoreError::InvalidWalletType(_))
        ));
    }

    #[tokio::test]
    async fn test_transfer_lifecycle() {
        let store = InMemoryStore::new();
        let req = NewTransfer::new(1, WalletId::new(), WalletId::new(), dec!(5));
        let record = store
            .create_transfer(&TransferRecord::submitted(&req))
            .await
            .unwrap();

        let approved = store
            .replace_transfer(&record.with_status(TransferStatus::Approved))
            .await
            .unwrap();
        assert_eq!(approved.version, 1);

        // Replaying the old version fails
        assert!(matches!(
            store
                .replace_transfer(&record.with_status(TransferStatus::Denied))
                .await,
            Err(StoreError::Conflict { entity: "transfer", .. })
        ));

        let listed = store
            .list_transfers_by_status(TransferStatus::Approved)
            .await
            .unwrap();
        assert_eq!(listed, vec![approved]);
        assert!(
            store
                .list_transfers_by_status(TransferStatus::Submitted)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
