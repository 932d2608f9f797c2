//! Wallet Error Types
//!
//! One error type for the whole wallet core. Business-rule rejections of a
//! transfer request are NOT errors; they come back as DENIED responses.

use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::money::MoneyError;
use crate::store::StoreError;
use crate::transfer::{TransferId, TransferStatus};

use super::types::WalletId;

/// Which side of a settlement failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementLeg {
    /// Debit of the source wallet
    Debit,
    /// Credit of the target wallet
    Credit,
    /// Recording COMPLETED after both wallets were updated
    Completion,
}

impl fmt::Display for SettlementLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SettlementLeg::Debit => "debit",
            SettlementLeg::Credit => "credit",
            SettlementLeg::Completion => "completion",
        })
    }
}

/// What happened to the source wallet after a failed settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackOutcome {
    /// Nothing was debited, nothing to undo
    NotNeeded,
    /// Source re-credited to its pre-debit balance
    Completed,
    /// Re-credit failed: funds are in flight, manual reconciliation required
    Failed,
}

impl fmt::Display for RollbackOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RollbackOutcome::NotNeeded => "not_needed",
            RollbackOutcome::Completed => "completed",
            RollbackOutcome::Failed => "failed",
        })
    }
}

/// Wallet core error types
#[derive(Error, Debug, Clone)]
pub enum WalletError {
    // === Lookup ===
    #[error("Wallet not found: {0}")]
    WalletNotFound(WalletId),

    #[error("Transfer not found: {0}")]
    TransferNotFound(TransferId),

    #[error("Invalid wallet type: {0}")]
    InvalidWalletType(String),

    // === Balance ===
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] MoneyError),

    #[error(
        "Cannot decrease wallet {wallet_id} into negative balance (balance {balance}, requested {requested})"
    )]
    InsufficientBalance {
        wallet_id: WalletId,
        balance: Decimal,
        requested: Decimal,
    },

    #[error(
        "Settlement of transfer {transfer_id} failed on {leg} leg (rollback: {rollback}): {cause}"
    )]
    Settlement {
        transfer_id: TransferId,
        leg: SettlementLeg,
        rollback: RollbackOutcome,
        cause: String,
    },

    // === Transfer state ===
    #[error("Transfer {transfer_id} is {status} and cannot be updated")]
    TransferState {
        transfer_id: TransferId,
        status: TransferStatus,
    },

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    // === Infrastructure ===
    #[error("Concurrent modification: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl WalletError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            WalletError::WalletNotFound(_) => "WALLET_NOT_FOUND",
            WalletError::TransferNotFound(_) => "TRANSFER_NOT_FOUND",
            WalletError::InvalidWalletType(_) => "INVALID_WALLET_TYPE",
            WalletError::InvalidAmount(_) => "INVALID_AMOUNT",
            WalletError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            WalletError::Settlement { .. } => "SETTLEMENT_FAILED",
            WalletError::TransferState { .. } => "TRANSFER_STATE",
            WalletError::InvalidStateTransition(_) => "INVALID_STATE_TRANSITION",
            WalletError::Conflict(_) => "CONFLICT",
            WalletError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            WalletError::WalletNotFound(_) | WalletError::TransferNotFound(_) => 404,
            WalletError::InvalidWalletType(_)
            | WalletError::InvalidAmount(_)
            | WalletError::InvalidStateTransition(_) => 400,
            WalletError::TransferState { .. } | WalletError::Conflict(_) => 409,
            WalletError::InsufficientBalance { .. } | WalletError::Settlement { .. } => 422,
            WalletError::Storage(_) => 503,
        }
    }

    /// Balance errors: a decrease below zero or a failed settlement
    pub fn is_balance_error(&self) -> bool {
        matches!(
            self,
            WalletError::InsufficientBalance { .. } | WalletError::Settlement { .. }
        )
    }
}

impl From<StoreError> for WalletError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidWalletType(tag) => WalletError::InvalidWalletType(tag),
            StoreError::Conflict { .. } => WalletError::Conflict(e.to_string()),
            other => WalletError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            WalletError::WalletNotFound(WalletId::new()).code(),
            "WALLET_NOT_FOUND"
        );
        assert_eq!(
            WalletError::InvalidAmount(MoneyError::NotPositive).code(),
            "INVALID_AMOUNT"
        );
        assert_eq!(WalletError::Storage("x".into()).code(), "STORAGE_ERROR");
    }

    #[test]
    fn test_http_status() {
        assert_eq!(
            WalletError::TransferNotFound(TransferId::new()).http_status(),
            404
        );
        assert_eq!(
            WalletError::TransferState {
                transfer_id: TransferId::new(),
                status: TransferStatus::Completed
            }
            .http_status(),
            409
        );
        assert_eq!(WalletError::Storage("down".into()).http_status(), 503);
    }

    #[test]
    fn test_settlement_display_names_leg_and_rollback() {
        let err = WalletError::Settlement {
            transfer_id: TransferId::new(),
            leg: SettlementLeg::Credit,
            rollback: RollbackOutcome::Completed,
            cause: "target unavailable".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("credit leg"));
        assert!(msg.contains("rollback: completed"));
        assert!(msg.contains("target unavailable"));
        assert!(err.is_balance_error());
    }

    #[test]
    fn test_store_error_mapping() {
        let err: WalletError = StoreError::InvalidWalletType("savings".into()).into();
        assert!(matches!(err, WalletError::InvalidWalletType(ref t) if t == "savings"));

        let err: WalletError = StoreError::Conflict {
            entity: "wallet",
            id: "01H".into(),
        }
        .into();
        assert!(matches!(err, WalletError::Conflict(_)));

        let err: WalletError = StoreError::Unavailable("pool closed".into()).into();
        assert!(matches!(err, WalletError::Storage(_)));
    }
}
