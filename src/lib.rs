//! Boost Wallets - donation and loan wallets with approval-driven transfers
//!
//! # Modules
//!
//! - [`core_types`] - Shared aliases (UserId, timestamps) and the ULID id macro
//! - [`money`] - Exact-decimal amount parsing and validation
//! - [`locks`] - Per-key async locks
//! - [`wallet`] - Wallet model, errors and the balance engine
//! - [`transfer`] - Transfer requests, status updates and settlement
//! - [`store`] - Storage trait with in-memory and PostgreSQL backends
//! - [`service`] - `WalletService`, the operations offered to callers
//! - [`gateway`] - axum HTTP surface
//! - [`config`] / [`logging`] / [`db`] - process wiring

// Core types - must be first!
pub mod core_types;

pub mod locks;
pub mod money;

// Domain
pub mod store;
pub mod transfer;
pub mod wallet;

pub mod service;

// Process wiring
pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;

// Convenient re-exports at crate root
pub use core_types::UserId;
pub use service::WalletService;
pub use store::{InMemoryStore, PgStore, StoreError, WalletStore};
pub use transfer::{
    DenialReason, NewTransfer, SettlementPolicy, TransferId, TransferRecord, TransferResponse,
    TransferStatus,
};
pub use wallet::{BalanceAction, Wallet, WalletError, WalletId, WalletType};
