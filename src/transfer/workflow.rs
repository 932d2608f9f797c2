//! Transfer Workflow
//!
//! Validates a transfer request and records it as SUBMITTED. Rule violations
//! are DENIED responses, not errors; only wallet lookups fail the call.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::money;
use crate::store::WalletStore;
use crate::wallet::{Wallet, WalletError, WalletId, WalletType};

use super::types::{DenialReason, NewTransfer, TransferRecord, TransferResponse};

pub struct TransferWorkflow {
    store: Arc<dyn WalletStore>,
}

impl TransferWorkflow {
    pub fn new(store: Arc<dyn WalletStore>) -> Self {
        Self { store }
    }

    /// Validate and record a transfer request
    ///
    /// # Rules (first failure wins)
    /// 1. Amount must be positive, with at most 8 decimals
    /// 2. Donatable funds wallet -> loan balance wallet
    /// 3. Source and target owned by different users
    /// 4. Initiator owns the source wallet
    /// 5. Source balance covers the amount
    ///
    /// Nothing is persisted for a denied request. A storage failure while
    /// recording the transfer is logged with its cause and returned as an
    /// infrastructure denial.
    ///
    /// # Errors
    /// - `WalletNotFound` if either wallet does not exist
    /// - `Storage` / `InvalidWalletType` if a wallet cannot be read
    pub async fn request_transfer(
        &self,
        request: NewTransfer,
    ) -> Result<TransferResponse, WalletError> {
        let source = self.fetch_wallet(request.source_wallet_id).await?;
        let target = self.fetch_wallet(request.target_wallet_id).await?;

        if let Some(reason) = check_rules(&request, &source, &target) {
            info!(
                source = %request.source_wallet_id,
                target = %request.target_wallet_id,
                initiator = request.initiator_user,
                amount = %request.amount,
                reason = reason.message(),
                "Transfer denied"
            );
            return Ok(TransferResponse::denied(reason));
        }

        let record = TransferRecord::submitted(&request);
        match self.store.create_transfer(&record).await {
            Ok(stored) => {
                info!(transfer_id = %stored.id, "Transfer submitted: {}", stored);
                Ok(TransferResponse::from_record(stored))
            }
            Err(e) => {
                error!(
                    transfer_id = %record.id,
                    source = %request.source_wallet_id,
                    target = %request.target_wallet_id,
                    error = %e,
                    "Failed to record transfer request"
                );
                Ok(TransferResponse::denied(DenialReason::Infrastructure {
                    cause: e.to_string(),
                }))
            }
        }
    }

    async fn fetch_wallet(&self, id: WalletId) -> Result<Wallet, WalletError> {
        let wallet = self
            .store
            .get_wallet(id)
            .await?
            .ok_or(WalletError::WalletNotFound(id))?;
        debug!(wallet_id = %id, "Fetched {}", wallet);
        Ok(wallet)
    }
}

/// Business rules of a transfer request, in order
fn check_rules(request: &NewTransfer, source: &Wallet, target: &Wallet) -> Option<DenialReason> {
    if money::ensure_positive(request.amount)
        .and_then(money::ensure_scale)
        .is_err()
    {
        return Some(DenialReason::InvalidAmount);
    }

    let (source_type, target_type) = (source.wallet_type(), target.wallet_type());
    if source_type != WalletType::DonatableFunds || target_type != WalletType::LoanBalance {
        return Some(DenialReason::WrongWalletTypes {
            source: source_type,
            target: target_type,
        });
    }

    if source.user_id == target.user_id {
        return Some(DenialReason::SelfTransfer);
    }

    if request.initiator_user != source.user_id {
        return Some(DenialReason::InitiatorNotOwner);
    }

    if source.total_balance < request.amount {
        return Some(DenialReason::InsufficientFunds {
            available: source.total_balance,
            requested: request.amount,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::store::mock::FaultyStore;
    use crate::transfer::TransferStatus;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    async fn wallet(
        store: &dyn WalletStore,
        user_id: u64,
        wallet_type: WalletType,
        balance: Decimal,
    ) -> Wallet {
        let mut w = Wallet::new(user_id, wallet_type);
        w.total_balance = balance;
        store.create_wallet(&w).await.unwrap()
    }

    fn denial(resp: &TransferResponse) -> &DenialReason {
        assert!(resp.is_denied());
        resp.denial.as_ref().unwrap()
    }

    #[tokio::test]
    async fn test_valid_request_is_submitted() {
        let store = Arc::new(InMemoryStore::new());
        let a = wallet(store.as_ref(), 1, WalletType::DonatableFunds, dec!(100)).await;
        let b = wallet(store.as_ref(), 2, WalletType::LoanBalance, dec!(0)).await;
        let workflow = TransferWorkflow::new(store.clone());

        let resp = workflow
            .request_transfer(NewTransfer::new(1, a.id, b.id, dec!(40)))
            .await
            .unwrap();

        assert_eq!(resp.current_status, TransferStatus::Submitted);
        let id = resp.transfer_id.unwrap();
        let stored = store.get_transfer(id).await.unwrap().unwrap();
        assert_eq!(stored.amount, dec!(40));
        assert_eq!(stored.status, TransferStatus::Submitted);

        // Requesting moves no funds
        let a_after = store.get_wallet(a.id).await.unwrap().unwrap();
        assert_eq!(a_after.total_balance, dec!(100));
    }

    #[tokio::test]
    async fn test_wrong_types_denied_regardless_of_balance() {
        let store = Arc::new(InMemoryStore::new());
        let loan = wallet(store.as_ref(), 1, WalletType::LoanBalance, dec!(1000)).await;
        let donatable = wallet(store.as_ref(), 2, WalletType::DonatableFunds, dec!(0)).await;
        let other_loan = wallet(store.as_ref(), 3, WalletType::LoanBalance, dec!(0)).await;
        let workflow = TransferWorkflow::new(store.clone());

        let reversed = workflow
            .request_transfer(NewTransfer::new(1, loan.id, donatable.id, dec!(1)))
            .await
            .unwrap();
        assert!(matches!(
            denial(&reversed),
            DenialReason::WrongWalletTypes { .. }
        ));

        let loan_to_loan = workflow
            .request_transfer(NewTransfer::new(1, loan.id, other_loan.id, dec!(1)))
            .await
            .unwrap();
        assert!(matches!(
            denial(&loan_to_loan),
            DenialReason::WrongWalletTypes { .. }
        ));
        assert_eq!(store.transfer_count(), 0);
    }

    #[tokio::test]
    async fn test_self_transfer_denied() {
        let store = Arc::new(InMemoryStore::new());
        let a = wallet(store.as_ref(), 7, WalletType::DonatableFunds, dec!(100)).await;
        let b = wallet(store.as_ref(), 7, WalletType::LoanBalance, dec!(0)).await;
        let workflow = TransferWorkflow::new(store.clone());

        let resp = workflow
            .request_transfer(NewTransfer::new(7, a.id, b.id, dec!(10)))
            .await
            .unwrap();
        assert_eq!(denial(&resp), &DenialReason::SelfTransfer);
        assert_eq!(
            resp.message.as_deref(),
            Some("Users may not transfer funds between their own wallets")
        );
    }

    #[tokio::test]
    async fn test_initiator_must_own_source() {
        let store = Arc::new(InMemoryStore::new());
        let a = wallet(store.as_ref(), 1, WalletType::DonatableFunds, dec!(100)).await;
        let b = wallet(store.as_ref(), 2, WalletType::LoanBalance, dec!(0)).await;
        let workflow = TransferWorkflow::new(store.clone());

        // Target owner pulling funds
        let resp = workflow
            .request_transfer(NewTransfer::new(2, a.id, b.id, dec!(10)))
            .await
            .unwrap();
        assert_eq!(denial(&resp), &DenialReason::InitiatorNotOwner);
        assert_eq!(store.transfer_count(), 0);
    }

    #[tokio::test]
    async fn test_insufficient_funds_denied() {
        let store = Arc::new(InMemoryStore::new());
        let a = wallet(store.as_ref(), 1, WalletType::DonatableFunds, dec!(100)).await;
        let b = wallet(store.as_ref(), 2, WalletType::LoanBalance, dec!(0)).await;
        let workflow = TransferWorkflow::new(store.clone());

        let resp = workflow
            .request_transfer(NewTransfer::new(1, a.id, b.id, dec!(150)))
            .await
            .unwrap();
        assert_eq!(
            denial(&resp),
            &DenialReason::InsufficientFunds {
                available: dec!(100),
                requested: dec!(150),
            }
        );
        assert_eq!(store.transfer_count(), 0);
    }

    #[tokio::test]
    async fn test_non_positive_amount_denied_first() {
        let store = Arc::new(InMemoryStore::new());
        // Wrong types too; the amount rule wins
        let a = wallet(store.as_ref(), 1, WalletType::LoanBalance, dec!(100)).await;
        let b = wallet(store.as_ref(), 1, WalletType::LoanBalance, dec!(0)).await;
        let workflow = TransferWorkflow::new(store.clone());

        for amount in [dec!(0), dec!(-5)] {
            let resp = workflow
                .request_transfer(NewTransfer::new(1, a.id, b.id, amount))
                .await
                .unwrap();
            assert_eq!(denial(&resp), &DenialReason::InvalidAmount);
        }
    }

    #[tokio::test]
    async fn test_excess_precision_denied() {
        let store = Arc::new(InMemoryStore::new());
        let a = wallet(store.as_ref(), 1, WalletType::DonatableFunds, dec!(100)).await;
        let b = wallet(store.as_ref(), 2, WalletType::LoanBalance, dec!(0)).await;
        let workflow = TransferWorkflow::new(store.clone());

        let resp = workflow
            .request_transfer(NewTransfer::new(1, a.id, b.id, dec!(0.000000001)))
            .await
            .unwrap();
        assert_eq!(denial(&resp), &DenialReason::InvalidAmount);
        assert_eq!(store.transfer_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_wallet_is_error() {
        let store = Arc::new(InMemoryStore::new());
        let a = wallet(store.as_ref(), 1, WalletType::DonatableFunds, dec!(100)).await;
        let workflow = TransferWorkflow::new(store.clone());
        let ghost = WalletId::new();

        let result = workflow
            .request_transfer(NewTransfer::new(1, a.id, ghost, dec!(1)))
            .await;
        assert!(matches!(result, Err(WalletError::WalletNotFound(id)) if id == ghost));
    }

    #[tokio::test]
    async fn test_storage_failure_becomes_infrastructure_denial() {
        let store = Arc::new(FaultyStore::new());
        let a = wallet(store.as_ref(), 1, WalletType::DonatableFunds, dec!(100)).await;
        let b = wallet(store.as_ref(), 2, WalletType::LoanBalance, dec!(0)).await;
        store.set_fail_create_transfer(true);
        let workflow = TransferWorkflow::new(store.clone());

        let resp = workflow
            .request_transfer(NewTransfer::new(1, a.id, b.id, dec!(10)))
            .await
            .unwrap();

        let reason = denial(&resp);
        assert!(reason.is_infrastructure());
        match reason {
            DenialReason::Infrastructure { cause } => {
                assert!(cause.contains("injected transfer insert failure"))
            }
            other => panic!("unexpected denial {other:?}"),
        }
        assert_eq!(store.transfer_create_count(), 1);
        assert_eq!(store.inner().transfer_count(), 0);
    }
}
