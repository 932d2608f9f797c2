//! Failure-injecting store wrapper for tests
//!
//! Delegates to an inner store and fails selected operations on demand, the
//! way a mock adapter simulates a misbehaving downstream service.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::core_types::UserId;
use crate::transfer::{TransferId, TransferRecord, TransferStatus};
use crate::wallet::{Wallet, WalletId};

use super::{InMemoryStore, StoreError, WalletStore};

pub struct FaultyStore {
    inner: InMemoryStore,
    /// Wallet id -> replaces still allowed before failing
    wallet_replace_budget: Mutex<HashMap<WalletId, usize>>,
    fail_create_transfer: AtomicBool,
    /// Replaces writing this status fail
    fail_transfer_replace_to: Mutex<Option<TransferStatus>>,
    /// Bump the stored version before the next replace of this wallet
    interfere_once: Mutex<Option<WalletId>>,
    wallet_replace_count: AtomicUsize,
    transfer_create_count: AtomicUsize,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryStore::new(),
            wallet_replace_budget: Mutex::new(HashMap::new()),
            fail_create_transfer: AtomicBool::new(false),
            fail_transfer_replace_to: Mutex::new(None),
            interfere_once: Mutex::new(None),
            wallet_replace_count: AtomicUsize::new(0),
            transfer_create_count: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    /// Every replace of `id` fails from now on
    pub fn fail_wallet_replace(&self, id: WalletId) {
        self.fail_wallet_replace_after(id, 0);
    }

    /// Allow `successes` more replaces of `id`, then fail
    pub fn fail_wallet_replace_after(&self, id: WalletId, successes: usize) {
        self.wallet_replace_budget
            .lock()
            .unwrap()
            .insert(id, successes);
    }

    pub fn heal_wallet_replace(&self, id: WalletId) {
        self.wallet_replace_budget.lock().unwrap().remove(&id);
    }

    pub fn set_fail_create_transfer(&self, fail: bool) {
        self.fail_create_transfer.store(fail, Ordering::SeqCst);
    }

    /// Every transfer replace that writes `status` fails until healed
    pub fn fail_transfer_replace_to(&self, status: TransferStatus) {
        *self.fail_transfer_replace_to.lock().unwrap() = Some(status);
    }

    pub fn heal_transfer_replace(&self) {
        *self.fail_transfer_replace_to.lock().unwrap() = None;
    }

    /// Simulate another writer touching `id` right before our next replace
    pub fn interfere_with_next_replace(&self, id: WalletId) {
        *self.interfere_once.lock().unwrap() = Some(id);
    }

    pub fn wallet_replace_count(&self) -> usize {
        self.wallet_replace_count.load(Ordering::SeqCst)
    }

    pub fn transfer_create_count(&self) -> usize {
        self.transfer_create_count.load(Ordering::SeqCst)
    }

    fn take_replace_permission(&self, id: WalletId) -> bool {
        let mut budget = self.wallet_replace_budget.lock().unwrap();
        match budget.get_mut(&id) {
            None => true,
            Some(0) => false,
            Some(left) => {
                *left -= 1;
                true
            }
        }
    }
}

#[async_trait]
impl WalletStore for FaultyStore {
    fn name(&self) -> &'static str {
        "faulty"
    }

    async fn get_wallet(&self, id: WalletId) -> Result<Option<Wallet>, StoreError> {
        self.inner.get_wallet(id).await
    }

    async fn get_wallets_by_owner(&self, user_id: UserId) -> Result<Vec<Wallet>, StoreError> {
        self.inner.get_wallets_by_owner(user_id).await
    }

    async fn create_wallet(&self, wallet: &Wallet) -> Result<Wallet, StoreError> {
        self.inner.create_wallet(wallet).await
    }

    async fn replace_wallet(&self, wallet: &Wallet) -> Result<Wallet, StoreError> {
        self.wallet_replace_count.fetch_add(1, Ordering::SeqCst);

        if !self.take_replace_permission(wallet.id) {
            return Err(StoreError::Unavailable(format!(
                "injected replace failure for wallet {}",
                wallet.id
            )));
        }

        let interfere = {
            let mut slot = self.interfere_once.lock().unwrap();
            if *slot == Some(wallet.id) {
                slot.take()
            } else {
                None
            }
        };
        if let Some(id) = interfere
            && let Some(current) = self.inner.get_wallet(id).await?
        {
            // Another writer lands first: same content, newer version
            self.inner.replace_wallet(&current).await?;
        }

        self.inner.replace_wallet(wallet).await
    }

    async fn create_transfer(
        &self,
        transfer: &TransferRecord,
    ) -> Result<TransferRecord, StoreError> {
        self.transfer_create_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_create_transfer.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "injected transfer insert failure".into(),
            ));
        }
        self.inner.create_transfer(transfer).await
    }

    async fn get_transfer(&self, id: TransferId) -> Result<Option<TransferRecord>, StoreError> {
        self.inner.get_transfer(id).await
    }

    async fn replace_transfer(
        &self,
        transfer: &TransferRecord,
    ) -> Result<TransferRecord, StoreError> {
        if *self.fail_transfer_replace_to.lock().unwrap() == Some(transfer.status) {
            return Err(StoreError::Unavailable(format!(
                "injected transfer replace failure ({})",
                transfer.status
            )));
        }
        self.inner.replace_transfer(transfer).await
    }

    async fn list_transfers_by_status(
        &self,
        status: TransferStatus,
    ) -> Result<Vec<TransferRecord>, StoreError> {
        self.inner.list_transfers_by_status(status).await
    }
}
