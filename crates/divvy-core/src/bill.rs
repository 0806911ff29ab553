//! # Bill
//!
//! The aggregate that owns participants, items, surcharges, the frozen
//! allocation and the transfers of one shared expense.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Bill::new ──► DRAFT ──────────────── finalize() ──────► FINALIZED     │
//! │                  │                        │                   │         │
//! │                  │ add_participant        │ payer set?        │ mark_   │
//! │                  │ add_item / assign      │ all assigned?     │ transfer│
//! │                  │ add_surcharge          │ stated total ok?  │ _*      │
//! │                  │ set_payer              │                   │ reissue │
//! │                  ▼                        ▼                   ▼         │
//! │            compute_allocation()   allocation frozen    only transfer   │
//! │            (recomputed on demand) transfers created    status changes  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use divvy_core::bill::Bill;
//! use divvy_core::money::{Currency, Money};
//! use divvy_core::types::ParticipantId;
//!
//! let usd = Currency::from_code("USD").unwrap();
//! let mut bill = Bill::new("Dinner", usd).unwrap();
//! let alex = ParticipantId::new("alex");
//! bill.add_participant(alex.clone(), "Alex").unwrap();
//!
//! let pizza = bill.add_item("Pizza", Money::from_minor(1850, usd), 1).unwrap();
//! bill.assign(&pizza, &alex).unwrap();
//! bill.set_payer(&alex).unwrap();
//! bill.finalize().unwrap();
//! assert_eq!(bill.total().unwrap().minor(), 1850);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::allocator::{allocate, Allocation};
use crate::error::{CoreError, CoreResult};
use crate::ledger::{AssignmentSummary, ItemLedger, LineItem};
use crate::money::{Currency, Money};
use crate::settlement::{transfers_for_bill, Transfer};
use crate::summary::{self, CollectionProgress};
use crate::types::{
    BillId, BillStatus, ItemId, Participant, ParticipantId, PaymentProvider, SettlementStatus,
    Surcharge, SurchargeBasis, SurchargeId, TransferId, TransferStatus,
};
use crate::validation::{
    validate_amount_minor, validate_description, validate_participant_count,
    validate_participant_id,
};

// =============================================================================
// Bill
// =============================================================================

/// One shared expense.
///
/// Fields are private; the draft/finalized rules are enforced by the
/// methods below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    id: BillId,
    title: String,
    currency: Currency,
    participants: Vec<Participant>,
    ledger: ItemLedger,
    surcharges: Vec<Surcharge>,
    payer: Option<ParticipantId>,
    stated_total: Option<Money>,
    status: BillStatus,
    allocation: Option<Allocation>,
    transfers: Vec<Transfer>,
    created_at: DateTime<Utc>,
    finalized_at: Option<DateTime<Utc>>,
}

impl Bill {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Creates an empty draft bill.
    pub fn new(title: &str, currency: Currency) -> CoreResult<Self> {
        validate_description(title)?;
        Ok(Bill {
            id: BillId::generate(),
            title: title.trim().to_string(),
            currency,
            participants: Vec::new(),
            ledger: ItemLedger::new(currency),
            surcharges: Vec::new(),
            payer: None,
            stated_total: None,
            status: BillStatus::Draft,
            allocation: None,
            transfers: Vec::new(),
            created_at: Utc::now(),
            finalized_at: None,
        })
    }

    /// Overrides the creation time (bills imported from history).
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Adds a participant. Participants are immutable once added.
    ///
    /// ## Errors
    /// - `DuplicateParticipant` if the id is already on the bill
    /// - `Validation` for a malformed id or name, or a full bill
    pub fn add_participant(&mut self, id: ParticipantId, name: &str) -> CoreResult<()> {
        self.ensure_draft()?;
        validate_participant_id(id.as_str())?;
        if self.participants.iter().any(|p| p.id == id) {
            return Err(CoreError::DuplicateParticipant(id.to_string()));
        }
        validate_participant_count(self.participants.len())?;

        let participant = Participant::new(id, name)?;
        self.ledger.register_participant(participant.id.clone());
        self.participants.push(participant);
        Ok(())
    }

    /// Adds an unassigned line item; `price` is the line total.
    pub fn add_item(&mut self, description: &str, price: Money, quantity: i64) -> CoreResult<ItemId> {
        self.ensure_draft()?;
        self.ledger.add_item(description, price, quantity)
    }

    /// Adds a tax, tip or service fee.
    pub fn add_surcharge(&mut self, surcharge: Surcharge) -> CoreResult<SurchargeId> {
        self.ensure_draft()?;
        if let SurchargeBasis::Fixed(amount) = surcharge.basis {
            self.ensure_currency(amount)?;
            validate_amount_minor("surcharge", amount.minor())?;
        }
        let id = surcharge.id.clone();
        self.surcharges.push(surcharge);
        Ok(id)
    }

    /// Sets who paid the bill. Must be a participant.
    pub fn set_payer(&mut self, payer: &ParticipantId) -> CoreResult<()> {
        self.ensure_draft()?;
        self.participant(payer)?;
        self.payer = Some(payer.clone());
        Ok(())
    }

    /// Records the total printed on the receipt for reconciliation.
    pub fn set_stated_total(&mut self, total: Money) -> CoreResult<()> {
        self.ensure_draft()?;
        self.ensure_currency(total)?;
        validate_amount_minor("stated total", total.minor())?;
        self.stated_total = Some(total);
        Ok(())
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    pub fn assign(&mut self, item_id: &ItemId, participant: &ParticipantId) -> CoreResult<()> {
        self.ensure_draft()?;
        self.ledger.assign(item_id, participant)
    }

    pub fn unassign(&mut self, item_id: &ItemId, participant: &ParticipantId) -> CoreResult<()> {
        self.ensure_draft()?;
        self.ledger.unassign(item_id, participant)
    }

    /// Shares an item among every participant.
    pub fn assign_all(&mut self, item_id: &ItemId) -> CoreResult<()> {
        self.ensure_draft()?;
        self.ledger.assign_all(item_id)
    }

    pub fn remove_item(&mut self, item_id: &ItemId) -> CoreResult<LineItem> {
        self.ensure_draft()?;
        self.ledger.remove_item(item_id)
    }

    pub fn remove_surcharge(&mut self, surcharge_id: &SurchargeId) -> CoreResult<Surcharge> {
        self.ensure_draft()?;
        let index = self
            .surcharges
            .iter()
            .position(|s| &s.id == surcharge_id)
            .ok_or_else(|| CoreError::SurchargeNotFound(surcharge_id.to_string()))?;
        Ok(self.surcharges.remove(index))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn id(&self) -> &BillId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn status(&self) -> BillStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn finalized_at(&self) -> Option<DateTime<Utc>> {
        self.finalized_at
    }

    /// Participants in the order they were added.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, id: &ParticipantId) -> CoreResult<&Participant> {
        self.participants
            .iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| CoreError::UnknownParticipant(id.to_string()))
    }

    pub fn items(&self) -> &[LineItem] {
        self.ledger.items()
    }

    pub fn item(&self, item_id: &ItemId) -> CoreResult<&LineItem> {
        self.ledger.item(item_id)
    }

    pub fn surcharges(&self) -> &[Surcharge] {
        &self.surcharges
    }

    pub fn payer(&self) -> Option<&ParticipantId> {
        self.payer.as_ref()
    }

    pub fn stated_total(&self) -> Option<Money> {
        self.stated_total
    }

    /// The frozen allocation; `None` while draft.
    pub fn allocation(&self) -> Option<&Allocation> {
        self.allocation.as_ref()
    }

    /// Every transfer ever created, including failed ones that were reissued.
    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn transfer(&self, transfer_id: &TransferId) -> CoreResult<&Transfer> {
        self.transfers
            .iter()
            .find(|t| &t.id == transfer_id)
            .ok_or_else(|| CoreError::TransferNotFound(transfer_id.to_string()))
    }

    pub fn subtotal_for(&self, participant: &ParticipantId) -> CoreResult<Money> {
        self.ledger.subtotal_for(participant)
    }

    pub fn is_fully_assigned(&self) -> bool {
        self.ledger.is_fully_assigned()
    }

    pub fn assignment_summary(&self) -> CoreResult<AssignmentSummary> {
        self.ledger.assignment_summary()
    }

    /// Items plus resolved surcharges.
    pub fn total(&self) -> CoreResult<Money> {
        let item_total = self.ledger.item_total()?;
        self.surcharges
            .iter()
            .try_fold(item_total, |acc, s| acc.try_add(s.resolve(item_total)?))
    }

    /// The allocation: recomputed while draft, the frozen one once finalized.
    pub fn compute_allocation(&self) -> CoreResult<Allocation> {
        match &self.allocation {
            Some(frozen) => Ok(frozen.clone()),
            None => allocate(&self.ledger, &self.surcharges),
        }
    }

    /// The transfers the bill would produce (draft) or produced (finalized).
    pub fn compute_transfers(&self) -> CoreResult<Vec<Transfer>> {
        if self.status == BillStatus::Finalized {
            return Ok(self.transfers.clone());
        }
        let payer = self.require_payer()?;
        let allocation = self.compute_allocation()?;
        Ok(transfers_for_bill(&allocation, payer))
    }

    /// Paid / pending / declined totals for the payment status screen.
    pub fn collection_progress(&self) -> CoreResult<CollectionProgress> {
        summary::collection_progress(self.currency, &self.transfers)
    }

    /// `settled` once finalized with every current transfer completed.
    pub fn settlement_status(&self) -> SettlementStatus {
        if self.status != BillStatus::Finalized {
            return SettlementStatus::Pending;
        }
        summary::settlement_status(&self.transfers)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Freezes the allocation and generates transfers.
    ///
    /// ## Errors
    /// - `BillFinalized` when called twice
    /// - `MissingPayer` when no payer is set
    /// - `IncompleteAssignment` when an item has no assignee
    /// - `TotalMismatch` when the stated total disagrees with the computed one
    pub fn finalize(&mut self) -> CoreResult<&Allocation> {
        self.ensure_draft()?;
        let payer = self.require_payer()?.clone();
        let allocation = allocate(&self.ledger, &self.surcharges)?;

        let computed = allocation.total()?;
        if let Some(stated) = self.stated_total {
            if stated != computed {
                return Err(CoreError::TotalMismatch {
                    stated: stated.to_string(),
                    computed: computed.to_string(),
                });
            }
        }

        self.transfers = transfers_for_bill(&allocation, &payer);
        self.status = BillStatus::Finalized;
        self.finalized_at = Some(Utc::now());
        Ok(self.allocation.insert(allocation))
    }

    // =========================================================================
    // Transfer Status
    // =========================================================================

    pub fn mark_transfer_completed(&mut self, transfer_id: &TransferId) -> CoreResult<&Transfer> {
        let transfer = self.transfer_mut(transfer_id)?;
        transfer.complete()?;
        Ok(transfer)
    }

    pub fn mark_transfer_failed(
        &mut self,
        transfer_id: &TransferId,
        reason: &str,
    ) -> CoreResult<&Transfer> {
        let transfer = self.transfer_mut(transfer_id)?;
        transfer.fail(reason)?;
        Ok(transfer)
    }

    /// Replaces a failed transfer with a fresh pending one.
    ///
    /// Reissuing the same failed transfer again returns the existing
    /// replacement instead of creating a second one.
    pub fn reissue_transfer(&mut self, transfer_id: &TransferId) -> CoreResult<TransferId> {
        if let Some(existing) = self
            .transfers
            .iter()
            .find(|t| t.replaces.as_ref() == Some(transfer_id))
        {
            return Ok(existing.id.clone());
        }
        let replacement = self.transfer(transfer_id)?.reissue()?;
        let id = replacement.id.clone();
        self.transfers.push(replacement);
        Ok(id)
    }

    pub fn attach_provider(
        &mut self,
        transfer_id: &TransferId,
        provider: PaymentProvider,
    ) -> CoreResult<()> {
        self.transfer_mut(transfer_id)?.attach_provider(provider)
    }

    /// Sum of completed transfers from one participant.
    pub fn paid_by(&self, participant: &ParticipantId) -> CoreResult<Money> {
        Money::sum(
            self.currency,
            self.transfers
                .iter()
                .filter(|t| &t.from == participant && t.status == TransferStatus::Completed)
                .map(|t| t.amount),
        )
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn transfer_mut(&mut self, transfer_id: &TransferId) -> CoreResult<&mut Transfer> {
        self.transfers
            .iter_mut()
            .find(|t| &t.id == transfer_id)
            .ok_or_else(|| CoreError::TransferNotFound(transfer_id.to_string()))
    }

    fn ensure_draft(&self) -> CoreResult<()> {
        if self.status == BillStatus::Finalized {
            return Err(CoreError::BillFinalized(self.id.to_string()));
        }
        Ok(())
    }

    fn ensure_currency(&self, amount: Money) -> CoreResult<()> {
        if amount.currency() != self.currency {
            return Err(CoreError::CurrencyMismatch {
                expected: self.currency.to_string(),
                actual: amount.currency().to_string(),
            });
        }
        Ok(())
    }

    fn require_payer(&self) -> CoreResult<&ParticipantId> {
        self.payer
            .as_ref()
            .ok_or_else(|| CoreError::MissingPayer(self.id.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SurchargeKind, SurchargePolicy};

    fn usd() -> Currency {
        Currency::from_code("USD").unwrap()
    }

    fn usd_minor(minor: i64) -> Money {
        Money::from_minor(minor, usd())
    }

    fn pid(id: &str) -> ParticipantId {
        ParticipantId::new(id)
    }

    fn dinner() -> Bill {
        let mut bill = Bill::new("Dinner at Luigi's", usd()).unwrap();
        bill.add_participant(pid("a"), "Alex").unwrap();
        bill.add_participant(pid("b"), "Sarah").unwrap();
        let pizza = bill.add_item("Pizza", usd_minor(1850), 1).unwrap();
        let salad = bill.add_item("Salad", usd_minor(1200), 1).unwrap();
        bill.assign(&pizza, &pid("a")).unwrap();
        bill.assign(&pizza, &pid("b")).unwrap();
        bill.assign(&salad, &pid("a")).unwrap();
        bill.add_surcharge(Surcharge::fixed(
            SurchargeKind::Tax,
            usd_minor(305),
            SurchargePolicy::Proportional,
        ))
        .unwrap();
        bill
    }

    #[test]
    fn test_duplicate_participant() {
        let mut bill = dinner();
        assert_eq!(
            bill.add_participant(pid("a"), "Alex again").unwrap_err(),
            CoreError::DuplicateParticipant("a".to_string())
        );
        assert!(bill.add_participant(pid("with space"), "X").is_err());
    }

    #[test]
    fn test_set_payer_must_be_participant() {
        let mut bill = dinner();
        assert!(matches!(
            bill.set_payer(&pid("zoe")),
            Err(CoreError::UnknownParticipant(_))
        ));
        bill.set_payer(&pid("a")).unwrap();
        assert_eq!(bill.payer(), Some(&pid("a")));
    }

    #[test]
    fn test_finalize_requires_payer() {
        let mut bill = dinner();
        assert!(matches!(bill.finalize(), Err(CoreError::MissingPayer(_))));
        assert_eq!(bill.status(), BillStatus::Draft);
    }

    #[test]
    fn test_finalize_freezes_bill() {
        let mut bill = dinner();
        bill.set_payer(&pid("a")).unwrap();
        let allocation = bill.finalize().unwrap();
        assert_eq!(allocation.owed_by(&pid("b")).minor(), 1017);

        assert_eq!(bill.status(), BillStatus::Finalized);
        assert!(bill.finalized_at().is_some());
        assert_eq!(bill.transfers().len(), 1);
        assert_eq!(bill.transfers()[0].from, pid("b"));
        assert_eq!(bill.transfers()[0].amount.minor(), 1017);

        let item_id = bill.items()[0].id.clone();
        assert!(matches!(
            bill.add_item("Dessert", usd_minor(500), 1),
            Err(CoreError::BillFinalized(_))
        ));
        assert!(matches!(
            bill.unassign(&item_id, &pid("a")),
            Err(CoreError::BillFinalized(_))
        ));
        assert!(matches!(bill.finalize(), Err(CoreError::BillFinalized(_))));
        assert!(bill.set_payer(&pid("b")).is_err());
    }

    #[test]
    fn test_stated_total_reconciliation() {
        let mut bill = dinner();
        bill.set_payer(&pid("a")).unwrap();
        bill.set_stated_total(usd_minor(3300)).unwrap();
        assert!(matches!(
            bill.finalize(),
            Err(CoreError::TotalMismatch { .. })
        ));

        bill.set_stated_total(usd_minor(3355)).unwrap();
        assert!(bill.finalize().is_ok());
    }

    #[test]
    fn test_draft_allocation_is_recomputed() {
        let mut bill = dinner();
        let before = bill.compute_allocation().unwrap();
        assert_eq!(before.owed_by(&pid("b")).minor(), 1017);

        let salad = bill.items()[1].id.clone();
        bill.assign(&salad, &pid("b")).unwrap();
        let after = bill.compute_allocation().unwrap();
        assert_ne!(before, after);
        assert_eq!(bill.total().unwrap().minor(), 3355);
    }

    #[test]
    fn test_compute_transfers_needs_payer() {
        let mut bill = dinner();
        assert!(matches!(
            bill.compute_transfers(),
            Err(CoreError::MissingPayer(_))
        ));
        bill.set_payer(&pid("b")).unwrap();
        let transfers = bill.compute_transfers().unwrap();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].from, pid("a"));
        assert_eq!(transfers[0].amount.minor(), 2338);
    }

    #[test]
    fn test_remove_surcharge() {
        let mut bill = dinner();
        let id = bill.surcharges()[0].id.clone();
        bill.remove_surcharge(&id).unwrap();
        assert_eq!(bill.total().unwrap().minor(), 3050);
        assert!(matches!(
            bill.remove_surcharge(&id),
            Err(CoreError::SurchargeNotFound(_))
        ));
    }

    #[test]
    fn test_transfer_status_flow() {
        let mut bill = dinner();
        bill.set_payer(&pid("a")).unwrap();
        bill.finalize().unwrap();
        let transfer_id = bill.transfers()[0].id.clone();

        bill.attach_provider(&transfer_id, PaymentProvider::new("orange"))
            .unwrap();
        bill.mark_transfer_failed(&transfer_id, "declined").unwrap();
        assert_eq!(bill.settlement_status(), SettlementStatus::Pending);

        let fresh = bill.reissue_transfer(&transfer_id).unwrap();
        assert_eq!(bill.reissue_transfer(&transfer_id).unwrap(), fresh);
        assert_eq!(bill.transfers().len(), 2);

        bill.mark_transfer_completed(&fresh).unwrap();
        assert_eq!(bill.settlement_status(), SettlementStatus::Settled);
        assert_eq!(bill.paid_by(&pid("b")).unwrap().minor(), 1017);

        assert!(matches!(
            bill.mark_transfer_completed(&TransferId::new("missing")),
            Err(CoreError::TransferNotFound(_))
        ));
    }
}
