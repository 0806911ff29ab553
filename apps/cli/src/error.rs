//! # API Error Type
//!
//! Unified error type for the commands layer.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Divvy                                  │
//! │                                                                         │
//! │  Front-end                   Commands Layer                             │
//! │  ─────────                   ──────────────                             │
//! │                                                                         │
//! │  finalize_bill(id)                                                      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Unassigned items? ─ CoreError::IncompleteAssignment ──┐        │  │
//! │  │         │                                              │        │  │
//! │  │         ▼                                              ▼        │  │
//! │  │  Bad input? ─── CoreError::Validation ─────────── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  e.code    = "INCOMPLETE_ASSIGNMENT"                                    │
//! │  e.message = "1 item(s) have no assignee: …"                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! `ApiError` serializes to a machine-readable `code` and a human-readable
//! `message`, which is also what `--format json` prints on failure.

use divvy_core::CoreError;
use serde::Serialize;

use crate::config::ConfigError;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Transfer not found: 6f1c…"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
///
/// ## Usage in Front-end
/// ```typescript
/// switch (e.code) {
///   case 'INCOMPLETE_ASSIGNMENT':
///     highlightUnassignedRows(e.message);
///     break;
///   case 'PAYMENT_ERROR':
///     showRetry();
///     break;
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bill, item, surcharge, transfer or participant not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Business rule violated (finalized bill, missing payer, totals)
    BusinessLogic,

    /// Items without an assignee block the split
    IncompleteAssignment,

    /// Transfer state machine rejected the change
    PaymentError,

    /// Configuration could not be loaded
    ConfigError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::UnknownParticipant(id) => ApiError::not_found("Participant", &id),
            CoreError::ItemNotFound(id) => ApiError::not_found("Item", &id),
            CoreError::SurchargeNotFound(id) => ApiError::not_found("Surcharge", &id),
            CoreError::TransferNotFound(id) => ApiError::not_found("Transfer", &id),
            CoreError::IncompleteAssignment { .. } => {
                ApiError::new(ErrorCode::IncompleteAssignment, message)
            }
            CoreError::TransferAlreadyTerminal { .. } => {
                ApiError::new(ErrorCode::PaymentError, message)
            }
            CoreError::CurrencyMismatch { .. }
            | CoreError::DuplicateParticipant(_)
            | CoreError::InvalidSurchargePolicy { .. }
            | CoreError::Validation(_) => ApiError::validation(message),
            CoreError::BillFinalized(_)
            | CoreError::BillNotFinalized(_)
            | CoreError::MissingPayer(_)
            | CoreError::TotalMismatch { .. } => ApiError::new(ErrorCode::BusinessLogic, message),
            CoreError::ImbalancedBalances(_) => {
                tracing::error!(error = %message, "Netting received imbalanced balances");
                ApiError::internal(message)
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
