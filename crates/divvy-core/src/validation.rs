//! # Validation Module
//!
//! Input validation utilities for Divvy.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Mobile front-end                                             │
//! │  ├── Basic format checks (empty fields, numeric keyboard)              │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Shell / command layer                                        │
//! │  ├── Type validation (deserialization of bill files)                   │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Engine invariants                                            │
//! │  └── Exact-split debug assertions                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use divvy_core::validation::{validate_description, validate_quantity};
//!
//! validate_description("Pizza Margherita").unwrap();
//! validate_quantity(2).unwrap();
//! ```

use crate::error::ValidationError;
use crate::{MAX_BILL_ITEMS, MAX_ITEM_QUANTITY, MAX_PARTICIPANTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a participant display name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 80 characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 80 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 80,
        });
    }

    Ok(())
}

/// Validates a line item description or bill title.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use divvy_core::validation::validate_description;
///
/// assert!(validate_description("Caesar Salad").is_ok());
/// assert!(validate_description("").is_err());
/// ```
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a caller-chosen participant id.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - No whitespace (ids appear in CLI flags and JSON keys)
pub fn validate_participant_id(id: &str) -> ValidationResult<()> {
    if id.is_empty() {
        return Err(ValidationError::Required {
            field: "participant id".to_string(),
        });
    }

    if id.chars().count() > 64 {
        return Err(ValidationError::TooLong {
            field: "participant id".to_string(),
            max: 64,
        });
    }

    if id.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "participant id".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price or surcharge amount in minor units.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (a comped item still shows on the receipt)
///
/// ## Example
/// ```rust
/// use divvy_core::validation::validate_amount_minor;
///
/// assert!(validate_amount_minor("price", 1850).is_ok());
/// assert!(validate_amount_minor("price", 0).is_ok());
/// assert!(validate_amount_minor("price", -100).is_err());
/// ```
pub fn validate_amount_minor(field: &str, minor: i64) -> ValidationResult<()> {
    if minor < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more item fits on the bill.
pub fn validate_item_count(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_BILL_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "bill items".to_string(),
            min: 0,
            max: MAX_BILL_ITEMS as i64,
        });
    }

    Ok(())
}

/// Validates that one more participant fits on the bill.
pub fn validate_participant_count(current: usize) -> ValidationResult<()> {
    if current >= MAX_PARTICIPANTS {
        return Err(ValidationError::OutOfRange {
            field: "participants".to_string(),
            min: 0,
            max: MAX_PARTICIPANTS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Sarah").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"A".repeat(81)).is_err());
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description("Coca Cola x2").is_ok());
        assert!(validate_description("").is_err());
        assert!(validate_description(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_participant_id() {
        assert!(validate_participant_id("alex").is_ok());
        assert!(validate_participant_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_participant_id("").is_err());
        assert!(validate_participant_id("has space").is_err());
        assert!(validate_participant_id(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_amount_minor() {
        assert!(validate_amount_minor("price", 0).is_ok());
        assert!(validate_amount_minor("price", 1099).is_ok());
        assert!(validate_amount_minor("price", -1).is_err());
    }

    #[test]
    fn test_validate_rate_bps() {
        assert!(validate_rate_bps(0).is_ok());
        assert!(validate_rate_bps(1500).is_ok());
        assert!(validate_rate_bps(10_000).is_ok());
        assert!(validate_rate_bps(10_001).is_err());
    }

    #[test]
    fn test_collection_limits() {
        assert!(validate_item_count(0).is_ok());
        assert!(validate_item_count(MAX_BILL_ITEMS).is_err());
        assert!(validate_participant_count(MAX_PARTICIPANTS - 1).is_ok());
        assert!(validate_participant_count(MAX_PARTICIPANTS).is_err());
    }
}
