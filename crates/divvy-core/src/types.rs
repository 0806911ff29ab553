//! # Domain Types
//!
//! Core value types used throughout Divvy.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Participant    │   │   Surcharge     │   │     Rate        │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  bps (u32)      │       │
//! │  │  name           │   │  kind           │   │  825 = 8.25%    │       │
//! │  └─────────────────┘   │  basis          │   └─────────────────┘       │
//! │                        │  policy         │                              │
//! │                        └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  SurchargeKind  │   │ SurchargePolicy │   │ TransferStatus  │       │
//! │  │  Tax            │   │  Proportional   │   │  Pending        │       │
//! │  │  Tip            │   │  Equal          │   │  Completed      │       │
//! │  │  ServiceFee     │   └─────────────────┘   │  Failed         │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identifiers
//! Every entity id is a string newtype. Bills, items, surcharges and
//! transfers get UUID v4 ids; participant ids are chosen by the caller
//! (a user id, a contact handle) and their lexicographic order decides who
//! absorbs rounding remainders.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{validate_name, validate_rate_bps};

// =============================================================================
// Identifiers
// =============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier.
            pub fn new(id: impl Into<String>) -> Self {
                $name(id.into())
            }

            /// Generates a fresh UUID v4 identifier.
            pub fn generate() -> Self {
                $name(Uuid::new_v4().to_string())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                $name(id.to_string())
            }
        }
    };
}

string_id!(
    /// Identifies a participant within a bill or group.
    ParticipantId
);
string_id!(
    /// Identifies a bill.
    BillId
);
string_id!(
    /// Identifies a line item on a bill.
    ItemId
);
string_id!(
    /// Identifies a surcharge on a bill.
    SurchargeId
);
string_id!(
    /// Identifies a transfer.
    TransferId
);
string_id!(
    /// Identifies a group.
    GroupId
);
string_id!(
    /// Payment provider handling a transfer (e.g. `flouci`, `orange_money`).
    PaymentProvider
);

// =============================================================================
// Rate
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1500 bps = 15% (a typical tip), 700 bps = 7% (service tax)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// Participant
// =============================================================================

/// Someone taking part in a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Participant {
    pub id: ParticipantId,
    /// Display name shown on the split summary.
    pub name: String,
}

impl Participant {
    /// Creates a participant after validating the display name.
    pub fn new(id: ParticipantId, name: &str) -> CoreResult<Self> {
        validate_name(name)?;
        Ok(Participant {
            id,
            name: name.trim().to_string(),
        })
    }
}

// =============================================================================
// Surcharges
// =============================================================================

/// What a surcharge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SurchargeKind {
    Tax,
    Tip,
    ServiceFee,
}

impl fmt::Display for SurchargeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurchargeKind::Tax => write!(f, "tax"),
            SurchargeKind::Tip => write!(f, "tip"),
            SurchargeKind::ServiceFee => write!(f, "service fee"),
        }
    }
}

/// How a surcharge is distributed among participants.
///
/// ## Policy Comparison
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Subtotals: A = 21.25, B = 9.25      Surcharge: 3.05                    │
/// │                                                                         │
/// │  PROPORTIONAL                        │  EQUAL                           │
/// │  ────────────                        │  ─────                           │
/// │  A: 3.05 × 21.25/30.50 = 2.13        │  A: 1.53                         │
/// │  B: 3.05 ×  9.25/30.50 = 0.92        │  B: 1.52                         │
/// │  (zero subtotal → zero share)        │  (everyone pays, even at zero)   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SurchargePolicy {
    /// Weighted by each participant's item subtotal.
    Proportional,
    /// Split equally across every participant on the bill.
    Equal,
}

impl fmt::Display for SurchargePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurchargePolicy::Proportional => write!(f, "proportional"),
            SurchargePolicy::Equal => write!(f, "equal"),
        }
    }
}

impl FromStr for SurchargePolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "proportional" | "proportional_to_subtotal" => Ok(SurchargePolicy::Proportional),
            "equal" | "equal_split" => Ok(SurchargePolicy::Equal),
            other => Err(CoreError::InvalidSurchargePolicy {
                surcharge_id: "-".to_string(),
                reason: format!(
                    "unknown policy '{}'. Valid options: proportional, equal",
                    other
                ),
            }),
        }
    }
}

/// The amount of a surcharge: fixed, or a rate on the bill's item total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SurchargeBasis {
    /// A fixed amount, e.g. the tax line printed on a receipt.
    Fixed(Money),
    /// A percentage of the item total, e.g. a 15% tip.
    Rate(Rate),
}

/// An amount added to a bill that is not tied to specific items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Surcharge {
    pub id: SurchargeId,
    pub kind: SurchargeKind,
    pub basis: SurchargeBasis,
    pub policy: SurchargePolicy,
}

impl Surcharge {
    /// A fixed-amount surcharge.
    pub fn fixed(kind: SurchargeKind, amount: Money, policy: SurchargePolicy) -> Self {
        Surcharge {
            id: SurchargeId::generate(),
            kind,
            basis: SurchargeBasis::Fixed(amount),
            policy,
        }
    }

    /// A rate-based surcharge, resolved against the item total.
    pub fn rate(kind: SurchargeKind, rate: Rate, policy: SurchargePolicy) -> CoreResult<Self> {
        validate_rate_bps(rate.bps())?;
        Ok(Surcharge {
            id: SurchargeId::generate(),
            kind,
            basis: SurchargeBasis::Rate(rate),
            policy,
        })
    }

    /// Resolves the surcharge amount for a bill whose items total `item_total`.
    pub fn resolve(&self, item_total: Money) -> CoreResult<Money> {
        match self.basis {
            SurchargeBasis::Fixed(amount) => {
                if amount.currency() != item_total.currency() {
                    return Err(CoreError::CurrencyMismatch {
                        expected: item_total.currency().to_string(),
                        actual: amount.currency().to_string(),
                    });
                }
                Ok(amount)
            }
            SurchargeBasis::Rate(rate) => item_total.apply_rate(rate),
        }
    }
}

// =============================================================================
// Statuses
// =============================================================================

/// Lifecycle of a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    /// Items and assignments are being edited.
    #[default]
    Draft,
    /// Allocation frozen, transfers generated.
    Finalized,
}

/// Lifecycle of a transfer.
///
/// ## State Machine
/// ```text
///            ┌──────────► Completed   (payment confirmed)
///  Pending ──┤
///            └──────────► Failed      (declined; reissue a new transfer)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl TransferStatus {
    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Completed | TransferStatus::Failed)
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferStatus::Pending => write!(f, "pending"),
            TransferStatus::Completed => write!(f, "completed"),
            TransferStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Settlement state of a bill as shown in expense history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Pending,
    Settled,
}

/// What kind of group a set of members forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    #[default]
    Friends,
    Roommates,
    Work,
    Travel,
}

impl GroupKind {
    pub const ALL: [GroupKind; 4] = [
        GroupKind::Friends,
        GroupKind::Roommates,
        GroupKind::Work,
        GroupKind::Travel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKind::Friends => "friends",
            GroupKind::Roommates => "roommates",
            GroupKind::Work => "work",
            GroupKind::Travel => "travel",
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        GroupKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| {
                ValidationError::NotAllowed {
                    field: "group kind".to_string(),
                    allowed: GroupKind::ALL.iter().map(|k| k.to_string()).collect(),
                }
                .into()
            })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
