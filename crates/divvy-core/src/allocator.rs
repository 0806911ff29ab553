//! # Allocator
//!
//! Turns a bill's ledger and surcharges into what each participant owes.
//!
//! ## Allocation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        allocate()                                       │
//! │                                                                         │
//! │  1. Every item assigned?  ── no ──►  IncompleteAssignment              │
//! │           │ yes                                                         │
//! │           ▼                                                             │
//! │  2. Item subtotals         subtotal_for(p) for each p (ascending id)   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  3. Surcharges             resolve amount against the item total       │
//! │     ├── Proportional  ──►  proportional_split(amount, subtotals)       │
//! │     └── Equal         ──►  split_equally(amount, participants)         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  4. owed(p) = subtotal(p) + Σ surcharge shares(p)                       │
//! │                                                                         │
//! │  Conservation: Σ owed == Σ item prices + Σ surcharges (exact)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::ledger::{ItemLedger, ItemShare};
use crate::money::{Currency, Money};
use crate::types::{ParticipantId, Surcharge, SurchargeId, SurchargeKind, SurchargePolicy};

// =============================================================================
// Allocation Types
// =============================================================================

/// One participant's slice of one surcharge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SurchargeShare {
    pub surcharge_id: SurchargeId,
    pub kind: SurchargeKind,
    pub amount: Money,
}

/// Everything one participant owes on a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ParticipantShare {
    pub participant_id: ParticipantId,
    /// Sum of the participant's item shares.
    pub items_subtotal: Money,
    /// Sum of the participant's surcharge shares.
    pub surcharges_total: Money,
    /// What the participant owes in total.
    pub total: Money,
    pub items: Vec<ItemShare>,
    pub surcharges: Vec<SurchargeShare>,
}

/// Participant → share mapping for a bill.
///
/// Keyed by participant id, so iteration is always ascending by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Allocation {
    pub currency: Currency,
    pub item_total: Money,
    pub surcharge_total: Money,
    pub shares: BTreeMap<ParticipantId, ParticipantShare>,
}

impl Allocation {
    /// Bill total: items plus resolved surcharges.
    pub fn total(&self) -> CoreResult<Money> {
        self.item_total.try_add(self.surcharge_total)
    }

    /// The share of one participant.
    pub fn share_for(&self, participant: &ParticipantId) -> CoreResult<&ParticipantShare> {
        self.shares
            .get(participant)
            .ok_or_else(|| CoreError::UnknownParticipant(participant.to_string()))
    }

    /// What one participant owes; zero for someone not on the bill.
    pub fn owed_by(&self, participant: &ParticipantId) -> Money {
        self.shares
            .get(participant)
            .map(|s| s.total)
            .unwrap_or_else(|| Money::zero(self.currency))
    }

    /// Sum of every participant's total.
    pub fn allocated_total(&self) -> CoreResult<Money> {
        Money::sum(self.currency, self.shares.values().map(|s| s.total))
    }
}

// =============================================================================
// Allocation
// =============================================================================

/// Computes the allocation for a ledger and its surcharges.
///
/// ## Errors
/// - `IncompleteAssignment` when any item has no assignee
/// - `InvalidSurchargePolicy` when a proportional surcharge meets all-zero
///   subtotals, or an equal surcharge meets a bill with no participants
/// - `CurrencyMismatch` when a fixed surcharge is in another currency
pub fn allocate(ledger: &ItemLedger, surcharges: &[Surcharge]) -> CoreResult<Allocation> {
    let unassigned = ledger.unassigned_items();
    if !unassigned.is_empty() {
        return Err(CoreError::IncompleteAssignment {
            item_ids: unassigned.iter().map(|id| id.to_string()).collect(),
        });
    }

    let currency = ledger.currency();
    let participants: Vec<ParticipantId> = ledger.roster().cloned().collect();

    // Step 1: item subtotals, in ascending participant order
    let mut shares: BTreeMap<ParticipantId, ParticipantShare> = BTreeMap::new();
    for participant in &participants {
        let items = ledger.item_shares_for(participant)?;
        let items_subtotal = Money::sum(currency, items.iter().map(|s| s.amount))?;
        shares.insert(
            participant.clone(),
            ParticipantShare {
                participant_id: participant.clone(),
                items_subtotal,
                surcharges_total: Money::zero(currency),
                total: items_subtotal,
                items,
                surcharges: Vec::new(),
            },
        );
    }
    let weights: Vec<i64> = participants
        .iter()
        .map(|p| shares.get(p).map(|s| s.items_subtotal.minor()).unwrap_or(0))
        .collect();

    // Step 2: surcharges
    let item_total = ledger.item_total()?;
    let mut surcharge_total = Money::zero(currency);
    for surcharge in surcharges {
        let amount = surcharge.resolve(item_total)?;
        surcharge_total = surcharge_total.try_add(amount)?;

        let split = distribute(surcharge, amount, &weights)?;
        for (participant, portion) in participants.iter().zip(split) {
            if let Some(share) = shares.get_mut(participant) {
                share.surcharges_total = share.surcharges_total.try_add(portion)?;
                share.total = share.total.try_add(portion)?;
                share.surcharges.push(SurchargeShare {
                    surcharge_id: surcharge.id.clone(),
                    kind: surcharge.kind,
                    amount: portion,
                });
            }
        }
    }

    let allocation = Allocation {
        currency,
        item_total,
        surcharge_total,
        shares,
    };

    debug_assert_eq!(
        allocation.allocated_total().ok(),
        allocation.total().ok(),
        "allocation must account for every minor unit of the bill"
    );
    Ok(allocation)
}

/// Splits one surcharge amount across participants (weights are their
/// item subtotals in ascending id order).
fn distribute(surcharge: &Surcharge, amount: Money, weights: &[i64]) -> CoreResult<Vec<Money>> {
    if weights.is_empty() {
        if amount.is_zero() {
            return Ok(Vec::new());
        }
        return Err(CoreError::InvalidSurchargePolicy {
            surcharge_id: surcharge.id.to_string(),
            reason: "the bill has no participants".to_string(),
        });
    }

    match surcharge.policy {
        SurchargePolicy::Equal => amount.split_equally(weights.len()),
        SurchargePolicy::Proportional => {
            if weights.iter().all(|w| *w == 0) {
                if amount.is_zero() {
                    return Ok(vec![amount; weights.len()]);
                }
                return Err(CoreError::InvalidSurchargePolicy {
                    surcharge_id: surcharge.id.to_string(),
                    reason: "every participant subtotal is zero".to_string(),
                });
            }
            amount.proportional_split(weights)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
