//! Request DTOs for wallet and transfer endpoints

use serde::{Deserialize, Serialize};

use crate::core_types::UserId;
use crate::transfer::{NewTransfer, TransferStatus};
use crate::wallet::{BalanceAction, WalletId, WalletType};

use super::money::StrictDecimal;
use super::response::ApiError;

/// POST /wallets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWalletRequest {
    pub user_id: UserId,
    /// "donatable_funds" | "loan_balance"
    #[serde(rename = "type")]
    pub wallet_type: String,
}

impl NewWalletRequest {
    pub fn wallet_type(&self) -> Result<WalletType, ApiError> {
        Ok(self.wallet_type.parse::<WalletType>()?)
    }
}

/// PATCH /wallets/funds/{wallet_id}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustBalanceRequest {
    pub action: BalanceAction,
    pub amount: StrictDecimal,
}

/// POST /wallets/transfers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferApiRequest {
    pub initiator_user: UserId,
    pub source_wallet_id: WalletId,
    pub target_wallet_id: WalletId,
    pub amount: StrictDecimal,
}

impl From<TransferApiRequest> for NewTransfer {
    fn from(req: TransferApiRequest) -> Self {
        NewTransfer::new(
            req.initiator_user,
            req.source_wallet_id,
            req.target_wallet_id,
            req.amount.inner(),
        )
    }
}

/// PATCH /wallets/transfers/{transfer_id}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferStatusRequest {
    pub new_status: String,
}

impl TransferStatusRequest {
    pub fn status(&self) -> Result<TransferStatus, ApiError> {
        self.new_status.parse().map_err(ApiError::bad_request)
    }
}
