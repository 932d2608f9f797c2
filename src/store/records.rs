//! Storage row forms
//!
//! The boundary where stored data becomes typed domain values. The wallet
//! type tag is checked here: an unknown tag yields
//! [`StoreError::InvalidWalletType`], never a panic or a default.

use rust_decimal::Decimal;

use crate::core_types::TimestampMs;
use crate::transfer::{TransferRecord, TransferStatus};
use crate::wallet::{Wallet, WalletKind, WalletType};

use super::StoreError;

/// Domain `u64` (user ids, versions) into a storage `BIGINT`
pub(crate) fn to_db_int(field: &str, value: u64) -> Result<i64, StoreError> {
    i64::try_from(value)
        .map_err(|_| StoreError::Corrupt(format!("{field} {value} exceeds the storable range")))
}

fn from_db_int(field: &str, value: i64) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::Corrupt(format!("{field} {value} is negative")))
}

/// Wallet as stored (one row of `wallets_tb`)
#[derive(Debug, Clone, PartialEq)]
pub struct WalletRow {
    pub wallet_id: String,
    pub user_id: i64,
    pub wallet_type: String,
    pub total_balance: Decimal,
    /// JSON of the variant-specific collections
    pub contents: String,
    pub created_at: TimestampMs,
    pub updated_at: TimestampMs,
    pub version: i64,
}

impl WalletRow {
    pub fn from_wallet(wallet: &Wallet) -> Result<Self, StoreError> {
        Ok(Self {
            wallet_id: wallet.id.to_string(),
            user_id: to_db_int("user_id", wallet.user_id)?,
            wallet_type: wallet.wallet_type().as_str().to_string(),
            total_balance: wallet.total_balance,
            contents: serde_json::to_string(&wallet.kind)?,
            created_at: wallet.created,
            updated_at: wallet.last_updated,
            version: to_db_int("version", wallet.version)?,
        })
    }

    pub fn into_wallet(self) -> Result<Wallet, StoreError> {
        let wallet_type: WalletType = self
            .wallet_type
            .parse()
            .map_err(|_| StoreError::InvalidWalletType(self.wallet_type.clone()))?;

        let kind: WalletKind = serde_json::from_str(&self.contents)?;
        if kind.wallet_type() != wallet_type {
            return Err(StoreError::Corrupt(format!(
                "wallet {} tagged {} but contents are {}",
                self.wallet_id,
                wallet_type,
                kind.wallet_type()
            )));
        }

        let id = self
            .wallet_id
            .parse()
            .map_err(|e: ulid::DecodeError| {
                StoreError::Corrupt(format!("wallet id {}: {}", self.wallet_id, e))
            })?;

        Ok(Wallet {
            id,
            user_id: from_db_int("user_id", self.user_id)?,
            kind,
            total_balance: self.total_balance,
            created: self.created_at,
            last_updated: self.updated_at,
            version: from_db_int("version", self.version)?,
        })
    }
}

/// Transfer as stored (one row of `transfers_tb`)
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRow {
    pub transfer_id: String,
    pub initiator_user: i64,
    pub source_wallet_id: String,
    pub target_wallet_id: String,
    pub amount: Decimal,
    pub status: String,
    pub submitted_at: TimestampMs,
    pub updated_at: TimestampMs,
    pub version: i64,
    pub last_error: Option<String>,
}

impl TransferRow {
    pub fn from_record(record: &TransferRecord) -> Result<Self, StoreError> {
        Ok(Self {
            transfer_id: record.id.to_string(),
            initiator_user: to_db_int("initiator_user", record.initiator_user)?,
            source_wallet_id: record.source_wallet_id.to_string(),
            target_wallet_id: record.target_wallet_id.to_string(),
            amount: record.amount,
            status: record.status.as_str().to_string(),
            submitted_at: record.submitted,
            updated_at: record.last_updated,
            version: to_db_int("version", record.version)?,
            last_error: record.last_error.clone(),
        })
    }

    pub fn into_record(self) -> Result<TransferRecord, StoreError> {
        let corrupt = |field: &str, e: String| {
            StoreError::Corrupt(format!("transfer {} {}: {}", self.transfer_id, field, e))
        };

        let status: TransferStatus = self.status.parse().map_err(|e| corrupt("status", e))?;
        let id = self
            .transfer_id
            .parse()
            .map_err(|e: ulid::DecodeError| corrupt("id", e.to_string()))?;
        let source_wallet_id = self
            .source_wallet_id
            .parse()
            .map_err(|e: ulid::DecodeError| corrupt("source_wallet_id", e.to_string()))?;
        let target_wallet_id = self
            .target_wallet_id
            .parse()
            .map_err(|e: ulid::DecodeError| corrupt("target_wallet_id", e.to_string()))?;

        Ok(TransferRecord {
            id,
            initiator_user: from_db_int("initiator_user", self.initiator_user)?,
            source_wallet_id,
            target_wallet_id,
            amount: self.amount,
            status,
            submitted: self.submitted_at,
            last_updated: self.updated_at,
            version: from_db_int("version", self.version)?,
            last_error: self.last_error,
        })
    }
}
