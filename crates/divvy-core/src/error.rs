//! # Error Types
//!
//! Domain-specific error types for divvy-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  divvy-core errors (this file)                                         │
//! │  ├── CoreError        - Splitting / settlement rule violations         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  apps/cli errors                                                       │
//! │  ├── ConfigError      - Config file / environment problems             │
//! │  └── ApiError         - What the front-end sees (code + message)       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Front-end              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item id, participant id, amounts)
//! 3. Caller-recoverable conditions are `Err` values, never panics
//! 4. Arithmetic invariant violations are debug assertions, not variants

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations in the splitting and
/// settlement flow. They should be surfaced to the UI layer for correction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Two amounts in different currencies were combined.
    #[error("Currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: String, actual: String },

    /// A participant id is not part of the bill (or group).
    ///
    /// ## When This Occurs
    /// - Assigning an item to someone who was never added to the bill
    /// - Setting a payer that is not a participant
    /// - Adding a bill to a group whose members do not include all of its
    ///   participants
    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    /// A participant with the same id was already added.
    #[error("Participant {0} already exists")]
    DuplicateParticipant(String),

    /// One or more items have no assignee.
    ///
    /// ## User Workflow
    /// ```text
    /// Assign screen: "Service Tax" has nobody selected
    ///      │
    ///      ▼
    /// compute_allocation()
    ///      │
    ///      ▼
    /// IncompleteAssignment { item_ids: ["…"] }
    ///      │
    ///      ▼
    /// UI highlights the unassigned rows
    /// ```
    #[error("{} item(s) have no assignee: {}", item_ids.len(), item_ids.join(", "))]
    IncompleteAssignment { item_ids: Vec<String> },

    /// A surcharge cannot be distributed with its policy.
    #[error("Surcharge {surcharge_id} cannot be distributed: {reason}")]
    InvalidSurchargePolicy {
        surcharge_id: String,
        reason: String,
    },

    /// A transfer already reached `completed` or `failed`.
    #[error("Transfer {transfer_id} is already {status}")]
    TransferAlreadyTerminal { transfer_id: String, status: String },

    /// Line item cannot be found.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Surcharge cannot be found.
    #[error("Surcharge not found: {0}")]
    SurchargeNotFound(String),

    /// Transfer cannot be found.
    #[error("Transfer not found: {0}")]
    TransferNotFound(String),

    /// The bill is finalized; items, assignments and surcharges are frozen.
    #[error("Bill {0} is finalized and can no longer be edited")]
    BillFinalized(String),

    /// The operation needs a finalized bill.
    #[error("Bill {0} is still a draft")]
    BillNotFinalized(String),

    /// The bill has no payer.
    #[error("Bill {0} has no payer")]
    MissingPayer(String),

    /// Items plus surcharges do not reconcile with the printed total.
    #[error("Bill total {computed} does not match stated total {stated}")]
    TotalMismatch { stated: String, computed: String },

    /// Net balances handed to the resolver do not sum to zero.
    #[error("Balances do not net to zero (off by {0} minor units)")]
    ImbalancedBalances(i64),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed amount, unknown currency code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
