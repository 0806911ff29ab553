//! # Bill Files
//!
//! The JSON document `divvy split` and `divvy settle` read. Amounts are
//! decimal strings in the bill's currency so no precision is lost.
//!
//! ## Format
//! ```json
//! {
//!   "title": "Pizza night",
//!   "currency": "USD",
//!   "date": "2024-03-14T19:30:00Z",
//!   "payer": "alex",
//!   "participants": [
//!     { "id": "alex",  "name": "Alex" },
//!     { "id": "sarah", "name": "Sarah" }
//!   ],
//!   "items": [
//!     { "description": "Pizza Margherita", "unit_price": "18.50", "assigned_to": ["alex", "sarah"] },
//!     { "description": "Garlic bread", "unit_price": "4.00", "quantity": 2, "shared": true }
//!   ],
//!   "surcharges": [
//!     { "kind": "tax", "amount": "3.05" },
//!     { "kind": "tip", "rate_bps": 1500, "policy": "equal" }
//!   ],
//!   "stated_total": "41.60"
//! }
//! ```
//!
//! `currency` falls back to the configured default. A scanned `receipt`
//! may stand in for (or precede) `items`; its lines are assigned through
//! `receipt_assignments` by zero-based line index.

use chrono::{DateTime, Utc};
use divvy_core::ReceiptScan;
use serde::{Deserialize, Serialize};

use crate::commands::bill::SurchargeInput;
use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantEntry {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEntry {
    pub description: String,
    pub unit_price: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub assigned_to: Vec<String>,
    /// Shared by every participant; overrides `assigned_to`.
    #[serde(default)]
    pub shared: bool,
}

fn default_quantity() -> i64 {
    1
}

/// Assignees for one scanned receipt line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAssignment {
    pub line: usize,
    #[serde(default)]
    pub assigned_to: Vec<String>,
    #[serde(default)]
    pub shared: bool,
}

/// A complete bill as written by hand or exported by the mobile app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillFile {
    pub title: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    pub payer: String,
    pub participants: Vec<ParticipantEntry>,
    #[serde(default)]
    pub items: Vec<ItemEntry>,
    #[serde(default)]
    pub surcharges: Vec<SurchargeInput>,
    #[serde(default)]
    pub stated_total: Option<String>,
    #[serde(default)]
    pub receipt: Option<ReceiptScan>,
    #[serde(default)]
    pub receipt_assignments: Vec<LineAssignment>,
}

impl BillFile {
    /// Parses a bill file. Syntax and shape errors are validation errors.
    pub fn from_json(contents: &str) -> Result<Self, ApiError> {
        serde_json::from_str(contents)
            .map_err(|e| ApiError::validation(format!("invalid bill file: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use divvy_core::types::{SurchargeKind, SurchargePolicy};

    #[test]
    fn test_parse_with_defaults() {
        let file = BillFile::from_json(
            r#"{
                "title": "Pizza night",
                "payer": "a",
                "participants": [{"id": "a", "name": "Alex"}],
                "items": [{"description": "Pizza", "unit_price": "18.50", "assigned_to": ["a"]}],
                "surcharges": [{"kind": "service_fee", "rate_bps": 700, "policy": "equal"}]
            }"#,
        )
        .unwrap();

        assert!(file.currency.is_none());
        assert_eq!(file.items[0].quantity, 1);
        assert!(!file.items[0].shared);
        assert_eq!(file.surcharges[0].kind, SurchargeKind::ServiceFee);
        assert_eq!(file.surcharges[0].policy, Some(SurchargePolicy::Equal));
        assert!(file.receipt.is_none());
    }

    #[test]
    fn test_parse_receipt_block() {
        let file = BillFile::from_json(
            r#"{
                "title": "Café",
                "currency": "TND",
                "date": "2024-03-14T09:00:00Z",
                "payer": "amira",
                "participants": [{"id": "amira", "name": "Amira"}],
                "receipt": {"lines": [{"description": "Café direct", "unit_price_minor": 1500, "quantity": 3}], "tip_minor": 1000},
                "receipt_assignments": [{"line": 0, "shared": true}]
            }"#,
        )
        .unwrap();

        let receipt = file.receipt.unwrap();
        assert_eq!(receipt.lines[0].quantity, 3);
        assert_eq!(receipt.tip_minor, Some(1_000));
        assert!(file.receipt_assignments[0].shared);
        assert!(file.date.is_some());
    }

    #[test]
    fn test_missing_payer_is_validation_error() {
        let err = BillFile::from_json(r#"{"title": "x", "participants": []}"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("payer"));
    }
}
