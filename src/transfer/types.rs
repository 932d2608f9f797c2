//! Transfer Core Types

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core_types::{TimestampMs, UserId, now_ms};
use crate::wallet::{WalletId, WalletType};

use super::state::TransferStatus;

crate::ulid_id!(
    /// Transfer ID - ULID, also the storage primary key
    TransferId
);

/// Transfer request as submitted by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransfer {
    /// Must own the source wallet
    pub initiator_user: UserId,
    pub source_wallet_id: WalletId,
    pub target_wallet_id: WalletId,
    pub amount: Decimal,
}

impl NewTransfer {
    pub fn new(
        initiator_user: UserId,
        source_wallet_id: WalletId,
        target_wallet_id: WalletId,
        amount: Decimal,
    ) -> Self {
        Self {
            initiator_user,
            source_wallet_id,
            target_wallet_id,
            amount,
        }
    }
}

/// Transfer record kept in the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub id: TransferId,
    pub initiator_user: UserId,
    pub source_wallet_id: WalletId,
    pub target_wallet_id: WalletId,
    pub amount: Decimal,
    pub status: TransferStatus,
    pub submitted: TimestampMs,
    pub last_updated: TimestampMs,
    /// Optimistic concurrency token
    #[serde(default)]
    pub version: u64,
    /// Last settlement failure (for reconciliation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl TransferRecord {
    /// Create a new record in SUBMITTED state
    pub fn submitted(request: &NewTransfer) -> Self {
        let now = now_ms();
        Self {
            id: TransferId::new(),
            initiator_user: request.initiator_user,
            source_wallet_id: request.source_wallet_id,
            target_wallet_id: request.target_wallet_id,
            amount: request.amount,
            status: TransferStatus::Submitted,
            submitted: now,
            last_updated: now,
            version: 0,
            last_error: None,
        }
    }

    /// Copy with a new status and a fresh `last_updated`
    pub fn with_status(&self, status: TransferStatus) -> Self {
        Self {
            status,
            last_updated: now_ms(),
            ..self.clone()
        }
    }
}

impl fmt::Display for TransferRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer[{}] {} -> {} user={} amount={} status={}",
            self.id,
            self.source_wallet_id,
            self.target_wallet_id,
            self.initiator_user,
            self.amount,
            self.status
        )
    }
}

/// Why a transfer request was denied
///
/// The `Infrastructure` cause is for operators only and is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenialReason {
    InvalidAmount,
    WrongWalletTypes {
        source: WalletType,
        target: WalletType,
    },
    SelfTransfer,
    InitiatorNotOwner,
    InsufficientFunds {
        available: Decimal,
        requested: Decimal,
    },
    Infrastructure {
        #[serde(skip)]
        cause: String,
    },
}

impl DenialReason {
    /// Human-readable message for the requesting user
    pub fn message(&self) -> &'static str {
        match self {
            DenialReason::InvalidAmount => "Transfer amount must be greater than zero",
            DenialReason::WrongWalletTypes { .. } => {
                "Transfers must be from a donatable funds wallet to a loan wallet"
            }
            DenialReason::SelfTransfer => "Users may not transfer funds between their own wallets",
            DenialReason::InitiatorNotOwner => "Initiator user must be owner of the source wallet",
            DenialReason::InsufficientFunds { .. } => {
                "Source wallet does not have enough funds to cover transfer amount."
            }
            DenialReason::Infrastructure { .. } => {
                "Transfer request failed due to an internal server error, please try again later."
            }
        }
    }

    /// True when the denial came from a failure, not a business rule
    #[inline]
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, DenialReason::Infrastructure { .. })
    }
}

/// Result of a transfer request or settlement (not persisted)
#[derive(Debug, Clone, Serialize)]
pub struct TransferResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<TransferId>,
    pub current_status: TransferStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_request: Option<TransferRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denial: Option<DenialReason>,
    pub last_updated: TimestampMs,
}

impl TransferResponse {
    /// Wrap a persisted record (SUBMITTED or COMPLETED)
    pub fn from_record(record: TransferRecord) -> Self {
        Self {
            transfer_id: Some(record.id),
            current_status: record.status,
            message: None,
            last_updated: record.last_updated,
            original_request: Some(record),
            denial: None,
        }
    }

    /// Denied by rule or by a swallowed infrastructure failure
    pub fn denied(reason: DenialReason) -> Self {
        Self {
            transfer_id: None,
            current_status: TransferStatus::Denied,
            message: Some(reason.message().to_string()),
            original_request: None,
            denial: Some(reason),
            last_updated: now_ms(),
        }
    }

    #[inline]
    pub fn is_denied(&self) -> bool {
        self.current_status == TransferStatus::Denied
    }
}
