//! Wallet Transfers
//!
//! A transfer moves money from a donatable funds wallet to another user's
//! loan balance wallet, after an admin approves it.
//!
//! # Flow
//!
//! ```text
//! TransferWorkflow::request_transfer   validate rules → SUBMITTED (or DENIED, nothing stored)
//!          │
//! TransferCoordinator::update_status   admin: IN_REVIEW / DENIED / APPROVED
//!          │ APPROVED
//!          ▼
//!       settle                          debit source → credit target → COMPLETED
//! ```
//!
//! # Guarantees
//!
//! 1. **COMPLETED is final**: no update is accepted afterwards
//! 2. **Single settlement**: updates of one transfer are serialized and
//!    versioned, so an approval race cannot move funds twice
//! 3. **Compensation**: a failed credit re-credits the source; if that fails
//!    too the transfer is parked in NEEDS_RECONCILIATION

pub mod coordinator;
pub mod state;
pub mod types;
pub mod workflow;


pub use coordinator::{SettlementPolicy, TransferCoordinator};
pub use state::TransferStatus;
pub use types::{DenialReason, NewTransfer, TransferId, TransferRecord, TransferResponse};
pub use workflow::TransferWorkflow;
