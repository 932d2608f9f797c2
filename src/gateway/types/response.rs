//! API Response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `ApiError`: Error response with HTTP status
//! - `error_codes`: Standard error code constants

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::wallet::WalletError;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Wrap data in a success response
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

// ============================================================================
// ApiError
// ============================================================================

/// Handler error, rendered as `ApiResponse<()>` with an HTTP status
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER, msg)
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            error_codes::SERVICE_UNAVAILABLE,
            msg,
        )
    }

    pub fn into_err<T>(self) -> Result<T, Self> {
        Err(self)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiResponse::<()>::error(self.code, self.msg));
        (self.status, body).into_response()
    }
}

impl From<WalletError> for ApiError {
    fn from(e: WalletError) -> Self {
        let status =
            StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let code = match &e {
            WalletError::WalletNotFound(_) => error_codes::WALLET_NOT_FOUND,
            WalletError::TransferNotFound(_) => error_codes::TRANSFER_NOT_FOUND,
            WalletError::InvalidWalletType(_) => error_codes::INVALID_WALLET_TYPE,
            WalletError::InvalidAmount(_) | WalletError::InvalidStateTransition(_) => {
                error_codes::INVALID_PARAMETER
            }
            WalletError::InsufficientBalance { .. } => error_codes::INSUFFICIENT_BALANCE,
            WalletError::Settlement { .. } => error_codes::SETTLEMENT_FAILED,
            WalletError::TransferState { .. } => error_codes::TRANSFER_STATE,
            WalletError::Conflict(_) => error_codes::CONFLICT,
            WalletError::Storage(_) => error_codes::SERVICE_UNAVAILABLE,
        };

        // Storage details stay in the log
        let msg = match &e {
            WalletError::Storage(cause) => {
                tracing::error!(error = %cause, "Storage failure");
                "Service temporarily unavailable, please try again later".to_string()
            }
            other => other.to_string(),
        };

        Self::new(status, code, msg)
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INSUFFICIENT_BALANCE: i32 = 1002;
    pub const INVALID_WALLET_TYPE: i32 = 1003;

    // Resource errors (4xxx)
    pub const WALLET_NOT_FOUND: i32 = 4001;
    pub const TRANSFER_NOT_FOUND: i32 = 4002;
    pub const TRANSFER_STATE: i32 = 4091;
    pub const CONFLICT: i32 = 4092;
    pub const SETTLEMENT_FAILED: i32 = 4221;

    // Server errors (5xxx)
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
}
