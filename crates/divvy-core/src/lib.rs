//! # divvy-core: Settlement Engine for Divvy
//!
//! This crate is the **heart** of Divvy. It splits a bill's line items among
//! the people who shared them, distributes tax, tip and service fees, and
//! turns the result into the transfers that settle everyone up. It performs
//! no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Divvy Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Front-end (mobile app / divvy CLI)              │   │
//! │  │    Scan ──► Assign ──► Split Summary ──► Pay ──► Status         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ divvy-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌───────────┐  ┌────────────┐    │   │
//! │  │   │  ledger  │─►│allocator │─►│settlement │─►│  summary   │    │   │
//! │  │   │ items ×  │  │ subtotal │  │ transfers │  │ collected  │    │   │
//! │  │   │ assignees│  │+surcharge│  │ netting   │  │ pending    │    │   │
//! │  │   └──────────┘  └──────────┘  └───────────┘  └────────────┘    │   │
//! │  │          ▲                                                      │   │
//! │  │   ┌──────┴───┐  ┌──────────┐  ┌───────────┐  ┌────────────┐    │   │
//! │  │   │   bill   │  │  group   │  │   money   │  │ validation │    │   │
//! │  │   └──────────┘  └──────────┘  └───────────┘  └────────────┘    │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO LOGGING • EXACT INTEGER MONEY                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Currency-tagged integer money and exact splits
//! - [`types`] - Identifiers, participants, surcharges, statuses
//! - [`ledger`] - Line items and who they are assigned to
//! - [`allocator`] - What each participant owes
//! - [`settlement`] - Transfers, their state machine, group netting
//! - [`bill`] - The bill aggregate and its draft/finalized lifecycle
//! - [`receipt`] - Importing scanned receipts into a bill
//! - [`summary`] - Collection progress for the payment status screen
//! - [`group`] - Group balances and expense history
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Exact Money**: amounts are `i64` minor units; splits never lose a unit
//! 2. **Deterministic**: remainders go to participants in ascending id order
//! 3. **No I/O**: files, network and logging belong to the shell
//! 4. **Explicit Errors**: every recoverable failure is a typed `CoreError`
//!
//! ## Example Usage
//!
//! ```rust
//! use divvy_core::{Bill, Currency, Money, ParticipantId, Surcharge};
//! use divvy_core::types::{SurchargeKind, SurchargePolicy};
//!
//! let usd = Currency::from_code("USD").unwrap();
//! let (a, b) = (ParticipantId::new("a"), ParticipantId::new("b"));
//!
//! let mut bill = Bill::new("Dinner", usd).unwrap();
//! bill.add_participant(a.clone(), "Alex").unwrap();
//! bill.add_participant(b.clone(), "Sarah").unwrap();
//!
//! let pizza = bill.add_item("Pizza", Money::parse("18.50", usd).unwrap(), 1).unwrap();
//! let salad = bill.add_item("Salad", Money::parse("12.00", usd).unwrap(), 1).unwrap();
//! bill.assign(&pizza, &a).unwrap();
//! bill.assign(&pizza, &b).unwrap();
//! bill.assign(&salad, &a).unwrap();
//! bill.add_surcharge(Surcharge::fixed(
//!     SurchargeKind::Tax,
//!     Money::parse("3.05", usd).unwrap(),
//!     SurchargePolicy::Proportional,
//! )).unwrap();
//!
//! bill.set_payer(&a).unwrap();
//! let allocation = bill.finalize().unwrap();
//! assert_eq!(allocation.owed_by(&a).to_string(), "23.38 USD");
//! assert_eq!(allocation.owed_by(&b).to_string(), "10.17 USD");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocator;
pub mod bill;
pub mod error;
pub mod group;
pub mod ledger;
pub mod money;
pub mod receipt;
pub mod settlement;
pub mod summary;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use divvy_core::Bill` instead of
// `use divvy_core::bill::Bill`

pub use allocator::{Allocation, ParticipantShare};
pub use bill::Bill;
pub use error::{CoreError, CoreResult, ValidationError};
pub use group::{ExpenseEntry, Group, MemberSummary};
pub use ledger::{AssignmentSummary, LineItem};
pub use money::{Currency, Money};
pub use receipt::{ReceiptLine, ReceiptPolicies, ReceiptScan};
pub use settlement::{Balances, Transfer};
pub use summary::CollectionProgress;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items on a single bill
///
/// ## Business Reason
/// A restaurant receipt rarely exceeds a few dozen lines; anything far
/// beyond that is a scanner misread.
pub const MAX_BILL_ITEMS: usize = 200;

/// Maximum quantity on a single line item
///
/// ## Business Reason
/// Catches typos in manual entry (1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum participants on a bill or members in a group
pub const MAX_PARTICIPANTS: usize = 50;
