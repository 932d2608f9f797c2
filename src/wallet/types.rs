//! Wallet Core Types

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core_types::{TimestampMs, UserId, now_ms};

use super::error::WalletError;

crate::ulid_id!(
    /// Wallet ID - ULID, also the storage primary key
    WalletId
);

/// Wallet variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletType {
    /// Holds funds a user is willing to give away
    DonatableFunds,
    /// Tracks what a user owes; receives donations
    LoanBalance,
}

impl WalletType {
    /// Tag used in storage and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletType::DonatableFunds => "donatable_funds",
            WalletType::LoanBalance => "loan_balance",
        }
    }
}

impl fmt::Display for WalletType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WalletType {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "donatable_funds" => Ok(WalletType::DonatableFunds),
            "loan_balance" => Ok(WalletType::LoanBalance),
            other => Err(WalletError::InvalidWalletType(other.to_string())),
        }
    }
}

/// Donation entry kept on a wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub amount: Decimal,
    /// Wallet on the other side of the donation, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<WalletId>,
    pub created: TimestampMs,
}

/// Loan entry kept on a loan wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lender: Option<String>,
    pub created: TimestampMs,
}

/// Variant-specific wallet contents
///
/// Serialized with the `type` tag inline, so a stored wallet looks like
/// `{"type": "loan_balance", "loans": [], "donations": [], ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WalletKind {
    DonatableFunds {
        #[serde(default)]
        donations_given: Vec<Donation>,
    },
    LoanBalance {
        #[serde(default)]
        loans: Vec<Loan>,
        #[serde(default)]
        donations: Vec<Donation>,
    },
}

impl WalletKind {
    /// Empty contents for a freshly created wallet
    pub fn empty(wallet_type: WalletType) -> Self {
        match wallet_type {
            WalletType::DonatableFunds => WalletKind::DonatableFunds {
                donations_given: Vec::new(),
            },
            WalletType::LoanBalance => WalletKind::LoanBalance {
                loans: Vec::new(),
                donations: Vec::new(),
            },
        }
    }

    #[inline]
    pub fn wallet_type(&self) -> WalletType {
        match self {
            WalletKind::DonatableFunds { .. } => WalletType::DonatableFunds,
            WalletKind::LoanBalance { .. } => WalletType::LoanBalance,
        }
    }
}

/// A user's wallet
///
/// # Invariants
/// - `total_balance` is never driven negative by a DECREASE adjustment
/// - `version` increases by one on every successful store replace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub user_id: UserId,
    #[serde(flatten)]
    pub kind: WalletKind,
    /// Accumulated donations minus loans (signed)
    pub total_balance: Decimal,
    pub created: TimestampMs,
    pub last_updated: TimestampMs,
    /// Optimistic concurrency token
    #[serde(default)]
    pub version: u64,
}

impl Wallet {
    /// Create an empty wallet (zero balance, empty collections)
    pub fn new(user_id: UserId, wallet_type: WalletType) -> Self {
        let now = now_ms();
        Self {
            id: WalletId::new(),
            user_id,
            kind: WalletKind::empty(wallet_type),
            total_balance: Decimal::ZERO,
            created: now,
            last_updated: now,
            version: 0,
        }
    }

    #[inline]
    pub fn wallet_type(&self) -> WalletType {
        self.kind.wallet_type()
    }
}

impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wallet[{}] user={} type={} balance={} v{}",
            self.id,
            self.user_id,
            self.wallet_type(),
            self.total_balance,
            self.version
        )
    }
}

/// Direction of a balance adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceAction {
    Increase,
    Decrease,
}

impl BalanceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceAction::Increase => "increase",
            BalanceAction::Decrease => "decrease",
        }
    }
}

impl fmt::Display for BalanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
