//! Transfer Status Definitions
//!
//! Wire/storage names are snake_case and match the stored `status` column.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Transfer request status
///
/// ```text
/// SUBMITTED → IN_REVIEW → APPROVED ──settle──▶ COMPLETED
///      │           │          │
///      └───────────┴──▶ DENIED └──(credit + rollback failed)──▶ NEEDS_RECONCILIATION
/// ```
///
/// Transitions other than settlement are driven by an admin actor.
/// COMPLETED is always terminal; DENIED is terminal when the settlement
/// policy says so.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    /// Validated and recorded, waiting for review
    Submitted,
    /// An admin is looking at it
    InReview,
    /// Approved; settlement runs in the same call
    Approved,
    /// Rejected, no funds moved
    Denied,
    /// Terminal: funds moved from source to target
    Completed,
    /// Credit leg and source rollback both failed; funds are in flight
    NeedsReconciliation,
}

impl TransferStatus {
    pub const ALL: [TransferStatus; 6] = [
        TransferStatus::Submitted,
        TransferStatus::InReview,
        TransferStatus::Approved,
        TransferStatus::Denied,
        TransferStatus::Completed,
        TransferStatus::NeedsReconciliation,
    ];

    /// Check if no further status update is accepted
    #[inline]
    pub fn is_terminal(&self, denied_is_terminal: bool) -> bool {
        match self {
            TransferStatus::Completed => true,
            TransferStatus::Denied => denied_is_terminal,
            _ => false,
        }
    }

    /// Statuses an admin may request directly
    ///
    /// NEEDS_RECONCILIATION is reserved for settlement.
    #[inline]
    pub fn is_requestable(&self) -> bool {
        !matches!(self, TransferStatus::NeedsReconciliation)
    }

    /// Get the storage/wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Submitted => "submitted",
            TransferStatus::InReview => "in_review",
            TransferStatus::Approved => "approved",
            TransferStatus::Denied => "denied",
            TransferStatus::Completed => "completed",
            TransferStatus::NeedsReconciliation => "needs_reconciliation",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransferStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransferStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown transfer status: {}", s))
    }
}
