//! # Group Commands
//!
//! Nets finalized bills across a group and proposes who pays whom.
//!
//! ```text
//! Weekend Dinner (x paid 45.50)        balances          settle-up
//! ─────────────────────────────        ────────          ─────────
//! y owes 32.25                  ──►    x +45.50   ──►    y → x 32.25
//! z owes 13.25                         y −32.25          z → x 13.25
//!                                      z −13.25
//! ```
//!
//! Balances count only what is still outstanding: transfers already
//! completed on a bill reduce the debt they covered.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use divvy_core::{
    BillId, Currency, ExpenseEntry, Group, GroupKind, MemberSummary, Money, ParticipantId,
    Transfer,
};

use crate::error::ApiError;
use crate::state::BillStore;

/// One member's line on the group balance screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceLine {
    pub participant_id: ParticipantId,
    pub name: String,
    /// Positive: the group owes them. Negative: they owe the group.
    pub balance: Money,
}

/// Group balances plus the proposed settle-up transfers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettleResponse {
    pub group_name: String,
    pub kind: GroupKind,
    pub currency: Option<Currency>,
    pub bill_count: usize,
    pub balances: Vec<BalanceLine>,
    pub transfers: Vec<Transfer>,
    /// Expense history of the requested member, newest first.
    pub history: Option<Vec<ExpenseEntry>>,
    /// Owed / owe / spent totals of the requested member.
    pub summary: Option<MemberSummary>,
}

impl SettleResponse {
    /// Display name for a member, falling back to the id.
    pub fn name_of<'a>(&'a self, id: &'a ParticipantId) -> &'a str {
        self.balances
            .iter()
            .find(|line| &line.participant_id == id)
            .map(|line| line.name.as_str())
            .unwrap_or(id.as_str())
    }
}

/// Builds a group from finalized bills and settles it.
///
/// ## Behavior
/// - Members are every participant of every bill, named as on the first
///   bill they appear on
/// - All bills must share one currency
/// - `member`, when given, adds that member's expense history and summary
pub fn settle_bills(
    store: &BillStore,
    group_name: &str,
    kind: GroupKind,
    bill_ids: &[BillId],
    member: Option<&str>,
) -> Result<SettleResponse, ApiError> {
    debug!(group = %group_name, bills = bill_ids.len(), "settle_bills command");

    let mut group = Group::new(group_name, kind)?;
    for bill_id in bill_ids {
        let bill = store.with_bill(bill_id, |bill| Ok(bill.clone()))?;
        for participant in bill.participants() {
            if !group.is_member(&participant.id) {
                group.add_member(participant.id.clone(), &participant.name)?;
            }
        }
        group.add_bill(bill)?;
    }

    let balances = group.net_balances()?;
    let transfers = group.settle_up()?;
    let (history, summary) = match member.map(ParticipantId::new) {
        Some(id) => (
            Some(group.history_for(&id)?),
            Some(group.member_summary(&id)?),
        ),
        None => (None, None),
    };
    info!(
        group = %group_name,
        members = group.members().len(),
        transfers = transfers.len(),
        "Group settled"
    );

    let balances = group
        .members()
        .iter()
        .filter_map(|m| {
            balances.get(&m.id).map(|balance| BalanceLine {
                participant_id: m.id.clone(),
                name: m.name.clone(),
                balance: *balance,
            })
        })
        .collect();

    Ok(SettleResponse {
        group_name: group.name().to_string(),
        kind: group.kind(),
        currency: group.currency(),
        bill_count: group.bills().len(),
        balances,
        transfers,
        history,
        summary,
    })
}
