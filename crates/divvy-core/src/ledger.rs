//! # Item Ledger
//!
//! Holds the line items of one bill and who each item is assigned to.
//!
//! ## Assignment Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Items × Assignees                                    │
//! │                                                                         │
//! │  Item                  Price    Assignees       Per-person share        │
//! │  ────────────────────  ───────  ──────────────  ───────────────────     │
//! │  Pizza Margherita      18.50    {alex, sarah}   9.25 / 9.25             │
//! │  Caesar Salad          12.00    {alex}          12.00                   │
//! │  Service Tax            4.50    {}              ◄── unassigned          │
//! │                                                                         │
//! │  A shared item is divided among exactly the people assigned to it,     │
//! │  not among every participant on the bill.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Assignees are kept in a `BTreeSet`, so each item's split order is
//! ascending participant id and the lowest ids absorb remainder units.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{Currency, Money};
use crate::types::{ItemId, ParticipantId};
use crate::validation::{
    validate_amount_minor, validate_description, validate_item_count, validate_quantity,
};

// =============================================================================
// Line Item
// =============================================================================

/// A single priced entry on a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub id: ItemId,
    pub description: String,
    /// Units on the receipt line ("Coca Cola x2" has quantity 2).
    pub quantity: i64,
    /// Line total (unit price × quantity).
    pub price: Money,
    /// Who shares this item. Empty while unassigned.
    pub assignees: BTreeSet<ParticipantId>,
}

impl LineItem {
    /// True once at least one participant is assigned.
    pub fn is_assigned(&self) -> bool {
        !self.assignees.is_empty()
    }

    /// True when more than one participant shares the item.
    pub fn is_shared(&self) -> bool {
        self.assignees.len() > 1
    }

    /// The participant's share of this item, if they are assigned to it.
    pub fn share_for(&self, participant: &ParticipantId) -> CoreResult<Option<Money>> {
        let Some(position) = self.assignees.iter().position(|p| p == participant) else {
            return Ok(None);
        };
        let shares = self.price.split_equally(self.assignees.len())?;
        Ok(Some(shares[position]))
    }
}

/// One participant's slice of one item, for the split summary breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemShare {
    pub item_id: ItemId,
    pub description: String,
    pub amount: Money,
    /// Number of people sharing the item (1 = not shared).
    pub shared_with: usize,
}

/// What the assign screen shows under the item list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AssignmentSummary {
    pub total: Money,
    pub assigned: Money,
    pub unassigned: Money,
    pub unassigned_item_ids: Vec<ItemId>,
}

// =============================================================================
// Item Ledger
// =============================================================================

/// Line items for one bill plus the roster of participants they may be
/// assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLedger {
    currency: Currency,
    roster: BTreeSet<ParticipantId>,
    items: Vec<LineItem>,
}

impl ItemLedger {
    /// Creates an empty ledger in the given currency.
    pub fn new(currency: Currency) -> Self {
        ItemLedger {
            currency,
            roster: BTreeSet::new(),
            items: Vec::new(),
        }
    }

    /// Makes a participant assignable. Registering twice is harmless.
    pub fn register_participant(&mut self, participant: ParticipantId) {
        self.roster.insert(participant);
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Items in the order they were added.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Participants known to the ledger, ascending by id.
    pub fn roster(&self) -> impl Iterator<Item = &ParticipantId> {
        self.roster.iter()
    }

    /// Looks up an item.
    pub fn item(&self, item_id: &ItemId) -> CoreResult<&LineItem> {
        self.items
            .iter()
            .find(|i| &i.id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))
    }

    fn item_mut(&mut self, item_id: &ItemId) -> CoreResult<&mut LineItem> {
        self.items
            .iter_mut()
            .find(|i| &i.id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))
    }

    fn ensure_known(&self, participant: &ParticipantId) -> CoreResult<()> {
        if !self.roster.contains(participant) {
            return Err(CoreError::UnknownParticipant(participant.to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Adds an unassigned line item. `price` is the line total.
    ///
    /// ## Errors
    /// - `Validation` for an empty description, bad quantity, negative price
    ///   or a full bill
    /// - `CurrencyMismatch` when the price is not in the ledger's currency
    pub fn add_item(
        &mut self,
        description: &str,
        price: Money,
        quantity: i64,
    ) -> CoreResult<ItemId> {
        validate_description(description)?;
        validate_quantity(quantity)?;
        validate_amount_minor("price", price.minor())?;
        validate_item_count(self.items.len())?;
        if price.currency() != self.currency {
            return Err(CoreError::CurrencyMismatch {
                expected: self.currency.to_string(),
                actual: price.currency().to_string(),
            });
        }

        let id = ItemId::generate();
        self.items.push(LineItem {
            id: id.clone(),
            description: description.trim().to_string(),
            quantity,
            price,
            assignees: BTreeSet::new(),
        });
        Ok(id)
    }

    /// Removes an item and returns it.
    pub fn remove_item(&mut self, item_id: &ItemId) -> CoreResult<LineItem> {
        let index = self
            .items
            .iter()
            .position(|i| &i.id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;
        Ok(self.items.remove(index))
    }

    // =========================================================================
    // Assignment
    // =========================================================================

    /// Adds a participant to an item's assignees. Idempotent.
    pub fn assign(&mut self, item_id: &ItemId, participant: &ParticipantId) -> CoreResult<()> {
        self.ensure_known(participant)?;
        self.item_mut(item_id)?.assignees.insert(participant.clone());
        Ok(())
    }

    /// Removes a participant from an item's assignees. A participant who
    /// was not assigned is a no-op.
    pub fn unassign(&mut self, item_id: &ItemId, participant: &ParticipantId) -> CoreResult<()> {
        self.ensure_known(participant)?;
        self.item_mut(item_id)?.assignees.remove(participant);
        Ok(())
    }

    /// Assigns every known participant to the item ("shared by everyone").
    pub fn assign_all(&mut self, item_id: &ItemId) -> CoreResult<()> {
        let roster = self.roster.clone();
        self.item_mut(item_id)?.assignees = roster;
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Sum of every line item price.
    pub fn item_total(&self) -> CoreResult<Money> {
        Money::sum(self.currency, self.items.iter().map(|i| i.price))
    }

    /// The participant's item subtotal: for every item they are assigned
    /// to, their `split_equally` share of that item.
    ///
    /// ## Example
    /// ```text
    /// Pizza 18.50 → {alex, sarah}     alex: 9.25
    /// Salad 12.00 → {alex}            alex: 12.00
    ///                                 ───────────
    /// subtotal_for(alex)            = 21.25
    /// ```
    pub fn subtotal_for(&self, participant: &ParticipantId) -> CoreResult<Money> {
        let shares = self.item_shares_for(participant)?;
        Money::sum(self.currency, shares.into_iter().map(|s| s.amount))
    }

    /// Per-item breakdown of what the participant owes for items.
    pub fn item_shares_for(&self, participant: &ParticipantId) -> CoreResult<Vec<ItemShare>> {
        self.ensure_known(participant)?;
        let mut shares = Vec::new();
        for item in &self.items {
            if let Some(amount) = item.share_for(participant)? {
                shares.push(ItemShare {
                    item_id: item.id.clone(),
                    description: item.description.clone(),
                    amount,
                    shared_with: item.assignees.len(),
                });
            }
        }
        Ok(shares)
    }

    /// True iff every item has at least one assignee.
    pub fn is_fully_assigned(&self) -> bool {
        self.items.iter().all(LineItem::is_assigned)
    }

    /// Ids of items nobody is assigned to, in bill order.
    pub fn unassigned_items(&self) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|i| !i.is_assigned())
            .map(|i| i.id.clone())
            .collect()
    }

    /// Totals for the assign screen: assigned vs. still unassigned.
    pub fn assignment_summary(&self) -> CoreResult<AssignmentSummary> {
        let assigned = Money::sum(
            self.currency,
            self.items.iter().filter(|i| i.is_assigned()).map(|i| i.price),
        )?;
        let unassigned = Money::sum(
            self.currency,
            self.items.iter().filter(|i| !i.is_assigned()).map(|i| i.price),
        )?;
        Ok(AssignmentSummary {
            total: assigned.try_add(unassigned)?,
            assigned,
            unassigned,
            unassigned_item_ids: self.unassigned_items(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn usd() -> Currency {
        Currency::from_code("USD").unwrap()
    }

    fn ledger_with(participants: &[&str]) -> ItemLedger {
        let mut ledger = ItemLedger::new(usd());
        for p in participants {
            ledger.register_participant(ParticipantId::new(*p));
        }
        ledger
    }

    fn pid(id: &str) -> ParticipantId {
        ParticipantId::new(id)
    }

    #[test]
    fn test_add_item_validates() {
        let mut ledger = ledger_with(&["a"]);
        assert!(ledger.add_item("Pizza", Money::from_minor(1850, usd()), 1).is_ok());
        assert!(ledger.add_item("", Money::from_minor(100, usd()), 1).is_err());
        assert!(ledger.add_item("Cola", Money::from_minor(100, usd()), 0).is_err());
        assert!(ledger.add_item("Refund", Money::from_minor(-100, usd()), 1).is_err());

        let tnd = Currency::from_code("TND").unwrap();
        let err = ledger
            .add_item("Couscous", Money::from_minor(100, tnd), 1)
            .unwrap_err();
        assert!(matches!(err, CoreError::CurrencyMismatch { .. }));
    }

    #[test]
    fn test_assign_is_idempotent() {
        let mut ledger = ledger_with(&["a", "b"]);
        let pizza = ledger.add_item("Pizza", Money::from_minor(1850, usd()), 1).unwrap();

        ledger.assign(&pizza, &pid("a")).unwrap();
        ledger.assign(&pizza, &pid("a")).unwrap();
        assert_eq!(ledger.item(&pizza).unwrap().assignees.len(), 1);
        assert_eq!(ledger.subtotal_for(&pid("a")).unwrap().minor(), 1850);
    }

    #[test]
    fn test_unassign_non_assignee_is_noop() {
        let mut ledger = ledger_with(&["a", "b"]);
        let pizza = ledger.add_item("Pizza", Money::from_minor(1850, usd()), 1).unwrap();
        ledger.assign(&pizza, &pid("a")).unwrap();

        let before = ledger.clone();
        ledger.unassign(&pizza, &pid("b")).unwrap();
        assert_eq!(ledger, before);

        ledger.unassign(&pizza, &pid("a")).unwrap();
        assert!(!ledger.item(&pizza).unwrap().is_assigned());
    }

    #[test]
    fn test_unknown_participant_and_item() {
        let mut ledger = ledger_with(&["a"]);
        let pizza = ledger.add_item("Pizza", Money::from_minor(1850, usd()), 1).unwrap();

        assert!(matches!(
            ledger.assign(&pizza, &pid("zoe")),
            Err(CoreError::UnknownParticipant(_))
        ));
        assert!(matches!(
            ledger.assign(&ItemId::new("nope"), &pid("a")),
            Err(CoreError::ItemNotFound(_))
        ));
        assert!(matches!(
            ledger.subtotal_for(&pid("zoe")),
            Err(CoreError::UnknownParticipant(_))
        ));
    }

    #[test]
    fn test_shared_item_split_among_assignees_only() {
        let mut ledger = ledger_with(&["a", "b", "c"]);
        let pizza = ledger.add_item("Pizza", Money::from_minor(1850, usd()), 1).unwrap();
        let salad = ledger.add_item("Salad", Money::from_minor(1200, usd()), 1).unwrap();
        ledger.assign(&pizza, &pid("a")).unwrap();
        ledger.assign(&pizza, &pid("b")).unwrap();
        ledger.assign(&salad, &pid("a")).unwrap();

        assert_eq!(ledger.subtotal_for(&pid("a")).unwrap().minor(), 2125);
        assert_eq!(ledger.subtotal_for(&pid("b")).unwrap().minor(), 925);
        assert_eq!(ledger.subtotal_for(&pid("c")).unwrap().minor(), 0);

        let shares = ledger.item_shares_for(&pid("a")).unwrap();
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].shared_with, 2);
        assert_eq!(shares[1].shared_with, 1);
    }

    #[test]
    fn test_remainder_goes_to_lowest_id() {
        let mut ledger = ledger_with(&["carol", "alice", "bob"]);
        let cake = ledger.add_item("Cake", Money::from_minor(1000, usd()), 1).unwrap();
        ledger.assign_all(&cake).unwrap();

        assert_eq!(ledger.subtotal_for(&pid("alice")).unwrap().minor(), 334);
        assert_eq!(ledger.subtotal_for(&pid("bob")).unwrap().minor(), 333);
        assert_eq!(ledger.subtotal_for(&pid("carol")).unwrap().minor(), 333);
    }

    #[test]
    fn test_fully_assigned_and_summary() {
        let mut ledger = ledger_with(&["a"]);
        assert!(ledger.is_fully_assigned());

        let pizza = ledger.add_item("Pizza", Money::from_minor(1850, usd()), 1).unwrap();
        let tax = ledger.add_item("Service Tax", Money::from_minor(450, usd()), 1).unwrap();
        ledger.assign(&pizza, &pid("a")).unwrap();

        assert!(!ledger.is_fully_assigned());
        assert_eq!(ledger.unassigned_items(), vec![tax.clone()]);

        let summary = ledger.assignment_summary().unwrap();
        assert_eq!(summary.total.minor(), 2300);
        assert_eq!(summary.assigned.minor(), 1850);
        assert_eq!(summary.unassigned.minor(), 450);
        assert_eq!(summary.unassigned_item_ids, vec![tax]);
    }

    #[test]
    fn test_remove_item() {
        let mut ledger = ledger_with(&["a"]);
        let pizza = ledger.add_item("Pizza", Money::from_minor(1850, usd()), 1).unwrap();
        let removed = ledger.remove_item(&pizza).unwrap();
        assert_eq!(removed.description, "Pizza");
        assert!(ledger.items().is_empty());
        assert!(ledger.remove_item(&pizza).is_err());
    }
}
