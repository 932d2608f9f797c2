//! Transfer Coordinator
//!
//! Drives admin status updates and the settlement that an APPROVED update
//! triggers in the same call.
//!
//! # Settlement
//!
//! ```text
//! debit source ──fail──▶ error (rollback: not_needed), stays APPROVED
//!      │
//! credit target ──fail──▶ re-credit source ──ok──▶ error (rollback: completed), stays APPROVED
//!      │                        └──fail──▶ NEEDS_RECONCILIATION, error (rollback: failed)
//!      ▼
//! record COMPLETED ──fail──▶ NEEDS_RECONCILIATION, error (leg: completion)
//!      │
//!      ▼
//! COMPLETED
//! ```
//!
//! The two legs are separate single-wallet writes. A crash between them leaves
//! the source debited with the transfer still APPROVED; nothing recovers that
//! automatically.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{error, info, warn};

use crate::locks::KeyedLocks;
use crate::store::WalletStore;
use crate::wallet::balance::DEFAULT_MAX_CONFLICT_RETRIES;
use crate::wallet::{BalanceAction, BalanceEngine, RollbackOutcome, SettlementLeg, WalletError};

use super::state::TransferStatus;
use super::types::{TransferId, TransferRecord};

/// Settlement rules taken from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementPolicy {
    /// Reject every status update on a DENIED transfer
    pub denied_is_terminal: bool,
    /// Version-conflict retries per balance adjustment
    pub max_conflict_retries: u32,
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        Self {
            denied_is_terminal: true,
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
        }
    }
}

pub struct TransferCoordinator {
    store: Arc<dyn WalletStore>,
    engine: Arc<BalanceEngine>,
    locks: KeyedLocks<TransferId>,
    policy: SettlementPolicy,
}

impl TransferCoordinator {
    pub fn new(
        store: Arc<dyn WalletStore>,
        engine: Arc<BalanceEngine>,
        policy: SettlementPolicy,
    ) -> Self {
        Self {
            store,
            engine,
            locks: KeyedLocks::new(),
            policy,
        }
    }

    pub fn policy(&self) -> SettlementPolicy {
        self.policy
    }

    /// Set a transfer's status; APPROVED settles immediately
    ///
    /// Returns the stored transfer after the update, or after settlement when
    /// approving (COMPLETED on success). Updates of one transfer are serialized,
    /// so concurrent approvals settle at most once.
    ///
    /// # Errors
    /// - `TransferNotFound`
    /// - `TransferState` if the transfer no longer accepts this update
    /// - `InvalidStateTransition` for NEEDS_RECONCILIATION (settlement only)
    /// - `Settlement` if approving and fund movement failed
    pub async fn update_status(
        &self,
        transfer_id: TransferId,
        new_status: TransferStatus,
    ) -> Result<TransferRecord, WalletError> {
        if !new_status.is_requestable() {
            return Err(WalletError::InvalidStateTransition(format!(
                "{new_status} is set by settlement only"
            )));
        }

        let _guard = self.locks.acquire(&transfer_id).await;

        let current = self
            .store
            .get_transfer(transfer_id)
            .await?
            .ok_or(WalletError::TransferNotFound(transfer_id))?;

        self.check_transition(&current, new_status)?;

        let updated = self
            .store
            .replace_transfer(&current.with_status(new_status))
            .await?;
        info!(
            transfer_id = %transfer_id,
            from = %current.status,
            to = %new_status,
            "Transfer status updated"
        );

        if new_status == TransferStatus::Approved {
            return self.settle(updated).await;
        }
        Ok(updated)
    }

    fn check_transition(
        &self,
        current: &TransferRecord,
        new_status: TransferStatus,
    ) -> Result<(), WalletError> {
        let blocked = current.status.is_terminal(self.policy.denied_is_terminal)
            || (current.status == TransferStatus::NeedsReconciliation
                && new_status == TransferStatus::Approved);

        if blocked {
            warn!(
                transfer_id = %current.id,
                status = %current.status,
                requested = %new_status,
                "Rejected status update"
            );
            return Err(WalletError::TransferState {
                transfer_id: current.id,
                status: current.status,
            });
        }
        Ok(())
    }

    /// Move the funds of an APPROVED transfer (caller holds its lock)
    async fn settle(&self, transfer: TransferRecord) -> Result<TransferRecord, WalletError> {
        debug_assert_eq!(transfer.status, TransferStatus::Approved);
        let amount = transfer.amount;

        // Step 1: debit source
        if let Err(e) = self
            .engine
            .adjust(transfer.source_wallet_id, BalanceAction::Decrease, amount)
            .await
        {
            let cause = e.to_string();
            error!(
                transfer_id = %transfer.id,
                leg = %SettlementLeg::Debit,
                rollback = %RollbackOutcome::NotNeeded,
                error = %cause,
                "Settlement failed"
            );
            self.record_failure(transfer.clone(), TransferStatus::Approved, &cause)
                .await;
            return Err(settlement_error(
                &transfer,
                SettlementLeg::Debit,
                RollbackOutcome::NotNeeded,
                cause,
            ));
        }

        // Step 2: credit target, compensating the debit on failure
        if let Err(credit_err) = self
            .engine
            .adjust(transfer.target_wallet_id, BalanceAction::Increase, amount)
            .await
        {
            return Err(self.compensate(transfer, amount, credit_err).await);
        }

        // Step 3: mark completed
        match self
            .store
            .replace_transfer(&transfer.with_status(TransferStatus::Completed))
            .await
        {
            Ok(completed) => {
                info!(transfer_id = %completed.id, "Transfer completed: {}", completed);
                Ok(completed)
            }
            Err(e) => {
                let cause = format!("funds moved but completion was not recorded: {e}");
                error!(
                    transfer_id = %transfer.id,
                    leg = %SettlementLeg::Completion,
                    source = %transfer.source_wallet_id,
                    target = %transfer.target_wallet_id,
                    amount = %amount,
                    error = %e,
                    "Funds moved but completion was not recorded, transfer needs reconciliation"
                );
                // Still APPROVED at the pre-completion version: park it so a
                // second approval cannot move the funds again
                self.record_failure(
                    transfer.clone(),
                    TransferStatus::NeedsReconciliation,
                    &cause,
                )
                .await;
                Err(settlement_error(
                    &transfer,
                    SettlementLeg::Completion,
                    RollbackOutcome::NotNeeded,
                    cause,
                ))
            }
        }
    }

    /// Re-credit the source after a failed credit leg
    async fn compensate(
        &self,
        transfer: TransferRecord,
        amount: Decimal,
        credit_err: WalletError,
    ) -> WalletError {
        match self
            .engine
            .adjust(transfer.source_wallet_id, BalanceAction::Increase, amount)
            .await
        {
            Ok(_) => {
                let cause = credit_err.to_string();
                warn!(
                    transfer_id = %transfer.id,
                    leg = %SettlementLeg::Credit,
                    rollback = %RollbackOutcome::Completed,
                    error = %cause,
                    "Settlement failed, source wallet restored"
                );
                self.record_failure(transfer.clone(), TransferStatus::Approved, &cause)
                    .await;
                settlement_error(
                    &transfer,
                    SettlementLeg::Credit,
                    RollbackOutcome::Completed,
                    cause,
                )
            }
            Err(rollback_err) => {
                let cause = format!("{credit_err}; rollback: {rollback_err}");
                error!(
                    transfer_id = %transfer.id,
                    leg = %SettlementLeg::Credit,
                    rollback = %RollbackOutcome::Failed,
                    source = %transfer.source_wallet_id,
                    amount = %amount,
                    error = %cause,
                    "Settlement failed and source rollback failed, transfer needs reconciliation"
                );
                self.record_failure(
                    transfer.clone(),
                    TransferStatus::NeedsReconciliation,
                    &cause,
                )
                .await;
                settlement_error(
                    &transfer,
                    SettlementLeg::Credit,
                    RollbackOutcome::Failed,
                    cause,
                )
            }
        }
    }

    /// Best-effort: persist the failure cause (and status) on the transfer
    async fn record_failure(&self, transfer: TransferRecord, status: TransferStatus, cause: &str) {
        let id = transfer.id;
        let failed = TransferRecord {
            last_error: Some(cause.to_string()),
            ..transfer.with_status(status)
        };
        if let Err(e) = self.store.replace_transfer(&failed).await {
            error!(
                transfer_id = %id,
                status = %status,
                error = %e,
                "Failed to record settlement failure"
            );
        }
    }
}

fn settlement_error(
    transfer: &TransferRecord,
    leg: SettlementLeg,
    rollback: RollbackOutcome,
    cause: String,
) -> WalletError {
    WalletError::Settlement {
        transfer_id: transfer.id,
        leg,
        rollback,
        cause,
    }
}
