//! Gateway types module
//!
//! ## Input Types
//! - [`StrictDecimal`]: Format-validated amount for API input
//! - Request DTOs in [`wallet`]
//!
//! ## Output Types
//! - [`ApiResponse<T>`]: Unified API response wrapper
//! - [`ApiError`]: Error response carrying the HTTP status

pub mod money;
pub mod response;
pub mod wallet;

pub use money::StrictDecimal;
pub use response::{ApiError, ApiResponse, ApiResult, error_codes, ok};
pub use wallet::{AdjustBalanceRequest, NewWalletRequest, TransferApiRequest, TransferStatusRequest};
