//! Balance Engine
//!
//! The ONLY place wallet balances change. Every adjustment is a
//! read-modify-write that runs under the wallet's lock and is persisted with a
//! version-checked replace, so concurrent adjustments of one wallet serialize
//! instead of losing updates.
//!
//! Retrying a call after an error is safe only if the caller knows whether the
//! persist step completed; there is no internal deduplication.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::core_types::now_ms;
use crate::locks::KeyedLocks;
use crate::money;
use crate::store::{StoreError, WalletStore};

use super::error::WalletError;
use super::types::{BalanceAction, Wallet, WalletId};

/// Default number of version-conflict retries per adjustment
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;

/// Compute the balance after an adjustment
///
/// # Errors
/// - `InsufficientBalance` if a DECREASE would drive the balance negative
pub fn apply_adjustment(
    wallet_id: WalletId,
    balance: Decimal,
    action: BalanceAction,
    amount: Decimal,
) -> Result<Decimal, WalletError> {
    match action {
        BalanceAction::Increase => Ok(balance + amount),
        BalanceAction::Decrease if balance >= amount => Ok(balance - amount),
        BalanceAction::Decrease => Err(WalletError::InsufficientBalance {
            wallet_id,
            balance,
            requested: amount,
        }),
    }
}

/// Applies INCREASE/DECREASE adjustments to single wallets
pub struct BalanceEngine {
    store: Arc<dyn WalletStore>,
    locks: KeyedLocks<WalletId>,
    max_conflict_retries: u32,
}

impl BalanceEngine {
    pub fn new(store: Arc<dyn WalletStore>) -> Self {
        Self::with_retries(store, DEFAULT_MAX_CONFLICT_RETRIES)
    }

    pub fn with_retries(store: Arc<dyn WalletStore>, max_conflict_retries: u32) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
            max_conflict_retries,
        }
    }

    /// Adjust one wallet's balance and return the refreshed wallet
    ///
    /// A failed DECREASE leaves the stored wallet untouched. On a version
    /// conflict (another process wrote in between) the wallet is re-read and
    /// the adjustment re-applied, up to the configured retry count.
    pub async fn adjust(
        &self,
        wallet_id: WalletId,
        action: BalanceAction,
        amount: Decimal,
    ) -> Result<Wallet, WalletError> {
        money::ensure_non_negative(amount)?;
        money::ensure_scale(amount)?;

        let _guard = self.locks.acquire(&wallet_id).await;

        let mut attempt = 0;
        loop {
            let wallet = self
                .store
                .get_wallet(wallet_id)
                .await?
                .ok_or(WalletError::WalletNotFound(wallet_id))?;

            let new_balance = apply_adjustment(wallet_id, wallet.total_balance, action, amount)?;

            let updated = Wallet {
                total_balance: new_balance,
                last_updated: now_ms(),
                ..wallet
            };

            match self.store.replace_wallet(&updated).await {
                Ok(stored) => {
                    debug!(
                        wallet_id = %wallet_id,
                        action = %action,
                        amount = %amount,
                        balance = %stored.total_balance,
                        version = stored.version,
                        "Balance adjusted"
                    );
                    return Ok(stored);
                }
                Err(StoreError::Conflict { .. }) if attempt < self.max_conflict_retries => {
                    attempt += 1;
                    warn!(
                        wallet_id = %wallet_id,
                        attempt = attempt,
                        "Wallet modified concurrently, retrying adjustment"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
