//! # Groups
//!
//! A set of members who share several bills, with group-wide balances and
//! an expense history per member.
//!
//! ## Balances Across Bills
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Bill            Payer   Outstanding                                    │
//! │  ──────────────  ──────  ──────────────────────────────                 │
//! │  Weekend Dinner  x       y 22.25   z 13.25                              │
//! │  Movie Tickets   x       y 10.00                                        │
//! │                                                                         │
//! │  net_balances():  x +45.50   y -32.25   z -13.25                        │
//! │  settle_up():     y → x 32.25,  z → x 13.25                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Completed transfers on a bill reduce what is outstanding, so members who
//! already paid their share of a bill carry no balance from it.
//!
//! ## Member Summary
//! ```text
//! net balance  +16.00  ──►  owed_to_you 16.00   you_owe 0.00
//! net balance   -6.00  ──►  owed_to_you  0.00   you_owe 6.00
//!
//! history:  your_share of settled bills  ──►  total_settled
//!           your_share of pending bills  ──►  total_pending
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::bill::Bill;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Currency, Money};
use crate::settlement::{minimize_transfers, net_balances, Balances, Transfer};
use crate::types::{BillId, BillStatus, GroupId, GroupKind, Participant, ParticipantId, SettlementStatus};
use crate::validation::{validate_name, validate_participant_count, validate_participant_id};

/// One row of a member's expense history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpenseEntry {
    pub bill_id: BillId,
    pub title: String,
    pub amount: Money,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub paid_by: ParticipantId,
    pub participants: Vec<ParticipantId>,
    pub status: SettlementStatus,
    /// What the member owes on this bill (zero if they were not on it).
    pub your_share: Money,
}

/// Dashboard totals for one member of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MemberSummary {
    pub member: ParticipantId,
    /// Positive part of the member's net balance.
    pub owed_to_you: Money,
    /// Negative part of the member's net balance, as a positive amount.
    pub you_owe: Money,
    pub net: Money,
    /// Sum of the member's shares on settled bills.
    pub total_settled: Money,
    /// Sum of the member's shares on bills still being collected.
    pub total_pending: Money,
}

/// Members plus the finalized bills they shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    name: String,
    kind: GroupKind,
    /// Fixed by the first bill added.
    currency: Option<Currency>,
    members: Vec<Participant>,
    bills: Vec<Bill>,
    created_at: DateTime<Utc>,
}

impl Group {
    pub fn new(name: &str, kind: GroupKind) -> CoreResult<Self> {
        validate_name(name)?;
        Ok(Group {
            id: GroupId::generate(),
            name: name.trim().to_string(),
            kind,
            currency: None,
            members: Vec::new(),
            bills: Vec::new(),
            created_at: Utc::now(),
        })
    }

    pub fn id(&self) -> &GroupId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    pub fn currency(&self) -> Option<Currency> {
        self.currency
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn members(&self) -> &[Participant] {
        &self.members
    }

    pub fn bills(&self) -> &[Bill] {
        &self.bills
    }

    pub fn is_member(&self, id: &ParticipantId) -> bool {
        self.members.iter().any(|m| &m.id == id)
    }

    /// Adds a member.
    pub fn add_member(&mut self, id: ParticipantId, name: &str) -> CoreResult<()> {
        validate_participant_id(id.as_str())?;
        if self.is_member(&id) {
            return Err(CoreError::DuplicateParticipant(id.to_string()));
        }
        validate_participant_count(self.members.len())?;
        self.members.push(Participant::new(id, name)?);
        Ok(())
    }

    /// Adds a finalized bill whose participants are all members.
    ///
    /// ## Errors
    /// - `BillNotFinalized` for a draft bill
    /// - `UnknownParticipant` for a bill participant outside the group
    /// - `CurrencyMismatch` when the bill's currency differs from earlier bills
    /// - `Validation` when the same bill is added twice
    pub fn add_bill(&mut self, bill: Bill) -> CoreResult<()> {
        if bill.status() != BillStatus::Finalized {
            return Err(CoreError::BillNotFinalized(bill.id().to_string()));
        }
        if let Some(outsider) = bill.participants().iter().find(|p| !self.is_member(&p.id)) {
            return Err(CoreError::UnknownParticipant(outsider.id.to_string()));
        }
        if let Some(currency) = self.currency {
            if bill.currency() != currency {
                return Err(CoreError::CurrencyMismatch {
                    expected: currency.to_string(),
                    actual: bill.currency().to_string(),
                });
            }
        }
        if self.bills.iter().any(|b| b.id() == bill.id()) {
            return Err(ValidationError::InvalidFormat {
                field: "bill".to_string(),
                reason: format!("bill {} is already in the group", bill.id()),
            }
            .into());
        }

        self.currency = Some(bill.currency());
        self.bills.push(bill);
        Ok(())
    }

    /// Signed balance per member across every bill; positive = owed to them.
    /// Members without any activity show zero.
    pub fn net_balances(&self) -> CoreResult<Balances> {
        let Some(currency) = self.currency else {
            return Ok(Balances::new());
        };
        let mut balances = net_balances(currency, &self.bills)?;
        for member in &self.members {
            balances
                .entry(member.id.clone())
                .or_insert_with(|| Money::zero(currency));
        }
        Ok(balances)
    }

    /// Greedy minimal set of transfers that zeroes every balance.
    pub fn settle_up(&self) -> CoreResult<Vec<Transfer>> {
        minimize_transfers(&self.net_balances()?)
    }

    /// The member's expense history, newest first.
    pub fn history_for(&self, member: &ParticipantId) -> CoreResult<Vec<ExpenseEntry>> {
        if !self.is_member(member) {
            return Err(CoreError::UnknownParticipant(member.to_string()));
        }

        let mut entries = Vec::with_capacity(self.bills.len());
        for bill in &self.bills {
            let allocation = bill
                .allocation()
                .ok_or_else(|| CoreError::BillNotFinalized(bill.id().to_string()))?;
            let paid_by = bill
                .payer()
                .cloned()
                .ok_or_else(|| CoreError::MissingPayer(bill.id().to_string()))?;
            entries.push(ExpenseEntry {
                bill_id: bill.id().clone(),
                title: bill.title().to_string(),
                amount: allocation.total()?,
                date: bill.created_at(),
                paid_by,
                participants: bill.participants().iter().map(|p| p.id.clone()).collect(),
                status: bill.settlement_status(),
                your_share: allocation.owed_by(member),
            });
        }

        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }

    /// What the member is owed, owes, and has spent across the group.
    ///
    /// ## Errors
    /// - `UnknownParticipant` for a non-member
    /// - `Validation` when the group has no bills yet (no currency)
    pub fn member_summary(&self, member: &ParticipantId) -> CoreResult<MemberSummary> {
        let history = self.history_for(member)?;
        let currency = self.currency.ok_or_else(|| ValidationError::Required {
            field: "bills".to_string(),
        })?;
        let zero = Money::zero(currency);

        let net = self
            .net_balances()?
            .get(member)
            .copied()
            .unwrap_or(zero);
        let (owed_to_you, you_owe) = if net.minor() > 0 {
            (net, zero)
        } else {
            (zero, zero.try_sub(net)?)
        };

        let mut total_settled = zero;
        let mut total_pending = zero;
        for entry in &history {
            match entry.status {
                SettlementStatus::Settled => {
                    total_settled = total_settled.try_add(entry.your_share)?
                }
                SettlementStatus::Pending => {
                    total_pending = total_pending.try_add(entry.your_share)?
                }
            }
        }

        Ok(MemberSummary {
            member: member.clone(),
            owed_to_you,
            you_owe,
            net,
            total_settled,
            total_pending,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn usd() -> Currency {
        Currency::from_code("USD").unwrap()
    }

    fn pid(id: &str) -> ParticipantId {
        ParticipantId::new(id)
    }

    /// A finalized bill paid by `payer`, one item per debtor.
    fn bill(title: &str, payer: &str, owed: &[(&str, i64)], day: u32) -> Bill {
        let mut bill = Bill::new(title, usd())
            .unwrap()
            .with_created_at(Utc.with_ymd_and_hms(2024, 1, day, 19, 0, 0).unwrap());
        bill.add_participant(pid(payer), payer).unwrap();
        for (who, minor) in owed {
            bill.add_participant(pid(who), who).unwrap();
            let item = bill
                .add_item(&format!("{}'s order", who), Money::from_minor(*minor, usd()), 1)
                .unwrap();
            bill.assign(&item, &pid(who)).unwrap();
        }
        bill.set_payer(&pid(payer)).unwrap();
        bill.finalize().unwrap();
        bill
    }

    fn squad() -> Group {
        let mut group = Group::new("Weekend Squad", GroupKind::Friends).unwrap();
        for id in ["x", "y", "z", "w"] {
            group.add_member(pid(id), id).unwrap();
        }
        group
    }

    #[test]
    fn test_add_bill_rules() {
        let mut group = squad();
        let mut draft = Bill::new("Draft", usd()).unwrap();
        draft.add_participant(pid("x"), "x").unwrap();
        assert!(matches!(
            group.add_bill(draft),
            Err(CoreError::BillNotFinalized(_))
        ));

        let outsider = bill("Taxi", "x", &[("q", 500)], 3);
        assert_eq!(
            group.add_bill(outsider).unwrap_err(),
            CoreError::UnknownParticipant("q".to_string())
        );

        let dinner = bill("Dinner", "x", &[("y", 500)], 3);
        group.add_bill(dinner.clone()).unwrap();
        assert!(group.add_bill(dinner).is_err());
    }

    #[test]
    fn test_net_balances_and_settle_up() {
        let mut group = squad();
        group
            .add_bill(bill("Weekend Dinner", "x", &[("y", 2225), ("z", 1325)], 12))
            .unwrap();
        group
            .add_bill(bill("Movie Tickets", "x", &[("y", 1000)], 13))
            .unwrap();

        let balances = group.net_balances().unwrap();
        assert_eq!(balances[&pid("x")].minor(), 4550);
        assert_eq!(balances[&pid("y")].minor(), -3225);
        assert_eq!(balances[&pid("z")].minor(), -1325);
        assert!(balances[&pid("w")].is_zero());

        let transfers = group.settle_up().unwrap();
        assert_eq!(transfers.len(), 2);
        assert_eq!(transfers[0].from, pid("y"));
        assert_eq!(transfers[0].amount.minor(), 3225);
        assert_eq!(transfers[1].from, pid("z"));
        assert_eq!(transfers[1].amount.minor(), 1325);
    }

    #[test]
    fn test_completed_transfers_reduce_balances() {
        let mut group = squad();
        let mut dinner = bill("Dinner", "x", &[("y", 2000), ("z", 1000)], 12);
        let from_y = dinner
            .transfers()
            .iter()
            .find(|t| t.from == pid("y"))
            .map(|t| t.id.clone())
            .unwrap();
        dinner.mark_transfer_completed(&from_y).unwrap();
        group.add_bill(dinner).unwrap();

        let balances = group.net_balances().unwrap();
        assert!(balances[&pid("y")].is_zero());
        assert_eq!(balances[&pid("x")].minor(), 1000);
    }

    #[test]
    fn test_history_newest_first() {
        let mut group = squad();
        group.add_bill(bill("Brunch", "y", &[("x", 1600)], 5)).unwrap();
        group.add_bill(bill("Dinner", "x", &[("z", 615)], 12)).unwrap();

        let history = group.history_for(&pid("x")).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].title, "Dinner");
        assert!(history[0].your_share.is_zero());
        assert_eq!(history[1].title, "Brunch");
        assert_eq!(history[1].your_share.minor(), 1600);
        assert_eq!(history[1].paid_by, pid("y"));
        assert_eq!(history[1].status, SettlementStatus::Pending);

        assert!(group.history_for(&pid("nobody")).is_err());
    }

    /// Dinner (x paid, y already paid back, z owes), Brunch (y paid, x owes)
    /// and Movie (z paid, x already paid back).
    fn partly_settled() -> Group {
        let mut group = squad();

        let mut dinner = bill("Dinner", "x", &[("y", 2000), ("z", 1000)], 12);
        let from_y = dinner
            .transfers()
            .iter()
            .find(|t| t.from == pid("y"))
            .map(|t| t.id.clone())
            .unwrap();
        dinner.mark_transfer_completed(&from_y).unwrap();
        group.add_bill(dinner).unwrap();

        group.add_bill(bill("Brunch", "y", &[("x", 1600)], 5)).unwrap();

        let mut movie = bill("Movie", "z", &[("x", 500)], 14);
        let from_x = movie.transfers()[0].id.clone();
        movie.mark_transfer_completed(&from_x).unwrap();
        group.add_bill(movie).unwrap();
        group
    }

    #[test]
    fn test_member_summary_for_debtor() {
        let group = partly_settled();
        let summary = group.member_summary(&pid("x")).unwrap();

        assert_eq!(summary.net.minor(), -600);
        assert!(summary.owed_to_you.is_zero());
        assert_eq!(summary.you_owe.minor(), 600);
        assert_eq!(summary.total_settled.minor(), 500);
        assert_eq!(summary.total_pending.minor(), 1600);
    }

    #[test]
    fn test_member_summary_for_creditor() {
        let group = partly_settled();
        let summary = group.member_summary(&pid("y")).unwrap();

        assert_eq!(summary.net.minor(), 1600);
        assert_eq!(summary.owed_to_you.minor(), 1600);
        assert!(summary.you_owe.is_zero());
        // Dinner is still pending while z has not paid
        assert_eq!(summary.total_pending.minor(), 2000);
        assert!(summary.total_settled.is_zero());

        let idle = group.member_summary(&pid("w")).unwrap();
        assert!(idle.net.is_zero());
        assert!(idle.total_pending.is_zero());
    }

    #[test]
    fn test_member_summary_errors() {
        let group = partly_settled();
        assert_eq!(
            group.member_summary(&pid("nobody")).unwrap_err(),
            CoreError::UnknownParticipant("nobody".to_string())
        );
        assert!(matches!(
            squad().member_summary(&pid("x")),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
    }

    #[test]
    fn test_empty_group() {
        let group = squad();
        assert!(group.net_balances().unwrap().is_empty());
        assert!(group.settle_up().unwrap().is_empty());
        assert!(Group::new("  ", GroupKind::Work).is_err());
        assert_eq!(
            Group::new("Flat 4B", GroupKind::Roommates).unwrap().kind(),
            GroupKind::Roommates
        );
    }
}
