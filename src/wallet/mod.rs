//! Wallets
//!
//! Two wallet variants share one record shape:
//! - **Donatable funds**: money a user is willing to give
//! - **Loan balance**: what a user owes; receives donations
//!
//! Balances only change through [`BalanceEngine`].

pub mod balance;
pub mod error;
pub mod types;

pub use balance::{BalanceEngine, apply_adjustment};
pub use error::{RollbackOutcome, SettlementLeg, WalletError};
pub use types::{BalanceAction, Donation, Loan, Wallet, WalletId, WalletKind, WalletType};
