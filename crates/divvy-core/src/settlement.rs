//! # Settlement Resolver
//!
//! Turns allocations into transfers and tracks each transfer's outcome.
//!
//! ## Two Topologies
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SINGLE BILL (star)                 GROUP (greedy netting)              │
//! │                                                                         │
//! │        alex ──┐                     balances:  X +45.50                 │
//! │               ▼                                Y -32.25                 │
//! │  sarah ──► payer ◄── mike                      Z -13.25                 │
//! │                                                                         │
//! │  every non-payer with a             largest debtor pays largest         │
//! │  non-zero share pays the payer      creditor, repeat until all zero:    │
//! │                                       Y → X 32.25                       │
//! │                                       Z → X 13.25                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Greedy netting settles everyone in at most `n - 1` transfers. It is not
//! guaranteed to be the global minimum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::allocator::Allocation;
use crate::bill::Bill;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{overflow_error, Currency, Money};
use crate::types::{BillStatus, ParticipantId, PaymentProvider, TransferId, TransferStatus};

/// Signed balance per participant: positive = owed to them.
pub type Balances = BTreeMap<ParticipantId, Money>;

// =============================================================================
// Transfer
// =============================================================================

/// A payment obligation from one participant to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transfer {
    pub id: TransferId,
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Money,
    pub status: TransferStatus,
    /// Payment provider chosen on the payment screen.
    pub provider: Option<PaymentProvider>,
    /// Why the payment was declined.
    pub failure_reason: Option<String>,
    /// The failed transfer this one replaces.
    pub replaces: Option<TransferId>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Transfer {
    /// Creates a pending transfer.
    pub fn new(from: ParticipantId, to: ParticipantId, amount: Money) -> Self {
        let now = Utc::now();
        Transfer {
            id: TransferId::generate(),
            from,
            to,
            amount,
            status: TransferStatus::Pending,
            provider: None,
            failure_reason: None,
            replaces: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn ensure_pending(&self) -> CoreResult<()> {
        if self.status.is_terminal() {
            return Err(CoreError::TransferAlreadyTerminal {
                transfer_id: self.id.to_string(),
                status: self.status.to_string(),
            });
        }
        Ok(())
    }

    /// `pending → completed`.
    pub fn complete(&mut self) -> CoreResult<()> {
        self.ensure_pending()?;
        self.status = TransferStatus::Completed;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// `pending → failed`, recording the decline reason.
    pub fn fail(&mut self, reason: &str) -> CoreResult<()> {
        self.ensure_pending()?;
        self.status = TransferStatus::Failed;
        let reason = reason.trim();
        self.failure_reason = if reason.is_empty() {
            None
        } else {
            Some(reason.to_string())
        };
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Records which provider is handling a pending transfer.
    pub fn attach_provider(&mut self, provider: PaymentProvider) -> CoreResult<()> {
        self.ensure_pending()?;
        self.provider = Some(provider);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Creates a fresh pending transfer for the same parties and amount.
    ///
    /// Only failed transfers can be reissued.
    pub fn reissue(&self) -> CoreResult<Transfer> {
        if self.status != TransferStatus::Failed {
            return Err(ValidationError::NotAllowed {
                field: "reissued transfer status".to_string(),
                allowed: vec![TransferStatus::Failed.to_string()],
            }
            .into());
        }
        let mut replacement = Transfer::new(self.from.clone(), self.to.clone(), self.amount);
        replacement.replaces = Some(self.id.clone());
        Ok(replacement)
    }
}

/// Transfers that still count: everything except failed transfers that a
/// reissued transfer replaced.
pub fn current_transfers(transfers: &[Transfer]) -> impl Iterator<Item = &Transfer> {
    transfers.iter().filter(move |t| {
        !(t.status == TransferStatus::Failed
            && transfers.iter().any(|o| o.replaces.as_ref() == Some(&t.id)))
    })
}

// =============================================================================
// Single Bill
// =============================================================================

/// Star topology: each non-payer with a non-zero share owes the payer.
///
/// Transfers come out in ascending participant id order.
pub fn transfers_for_bill(allocation: &Allocation, payer: &ParticipantId) -> Vec<Transfer> {
    allocation
        .shares
        .values()
        .filter(|share| &share.participant_id != payer && !share.total.is_zero())
        .map(|share| Transfer::new(share.participant_id.clone(), payer.clone(), share.total))
        .collect()
}

// =============================================================================
// Group Netting
// =============================================================================

/// Signed balances across finalized bills.
///
/// Per bill, each participant's outstanding debt (allocation share minus
/// completed transfers to the payer) is subtracted from them and credited
/// to the payer. Every participant appears, even at zero.
///
/// ## Errors
/// - `BillNotFinalized` for a draft bill
/// - `CurrencyMismatch` when a bill is not in `currency`
pub fn net_balances<'a, I>(currency: Currency, bills: I) -> CoreResult<Balances>
where
    I: IntoIterator<Item = &'a Bill>,
{
    let mut balances = Balances::new();

    for bill in bills {
        let (allocation, payer) = match (bill.status(), bill.allocation(), bill.payer()) {
            (BillStatus::Finalized, Some(allocation), Some(payer)) => (allocation, payer),
            _ => return Err(CoreError::BillNotFinalized(bill.id().to_string())),
        };
        if bill.currency() != currency {
            return Err(CoreError::CurrencyMismatch {
                expected: currency.to_string(),
                actual: bill.currency().to_string(),
            });
        }

        for participant in allocation.shares.keys() {
            balances
                .entry(participant.clone())
                .or_insert_with(|| Money::zero(currency));
        }

        for (participant, share) in &allocation.shares {
            if participant == payer {
                continue;
            }
            let paid = Money::sum(
                currency,
                bill.transfers()
                    .iter()
                    .filter(|t| {
                        &t.from == participant
                            && &t.to == payer
                            && t.status == TransferStatus::Completed
                    })
                    .map(|t| t.amount),
            )?;
            let outstanding = share.total.try_sub(paid)?;
            if outstanding.is_zero() {
                continue;
            }

            let debtor = balances
                .entry(participant.clone())
                .or_insert_with(|| Money::zero(currency));
            *debtor = debtor.try_sub(outstanding)?;
            let creditor = balances
                .entry(payer.clone())
                .or_insert_with(|| Money::zero(currency));
            *creditor = creditor.try_add(outstanding)?;
        }
    }

    Ok(balances)
}

/// Greedy minimal-transaction settlement.
///
/// ## Algorithm
/// 1. Pick the largest creditor and the largest debtor (ties: lowest id)
/// 2. The debtor pays `min(credit, |debt|)` to the creditor
/// 3. Repeat until every balance is zero
///
/// ## Errors
/// - `ImbalancedBalances` when the balances do not sum to zero
/// - `Validation` when a debt of `i64::MIN` cannot be negated
pub fn minimize_transfers(balances: &Balances) -> CoreResult<Vec<Transfer>> {
    let Some(currency) = balances.values().next().map(Money::currency) else {
        return Ok(Vec::new());
    };

    let mut remaining: BTreeMap<ParticipantId, i64> = BTreeMap::new();
    let mut total: i128 = 0;
    for (participant, balance) in balances {
        if balance.currency() != currency {
            return Err(CoreError::CurrencyMismatch {
                expected: currency.to_string(),
                actual: balance.currency().to_string(),
            });
        }
        total += balance.minor() as i128;
        remaining.insert(participant.clone(), balance.minor());
    }
    if total != 0 {
        return Err(CoreError::ImbalancedBalances(total as i64));
    }

    let mut transfers = Vec::new();
    loop {
        let creditor = pick(&remaining, |b| b > 0);
        let debtor = pick(&remaining, |b| b < 0);
        let (Some((creditor, credit)), Some((debtor, debt))) = (creditor, debtor) else {
            break;
        };

        let owed = debt.checked_neg().ok_or_else(|| overflow_error("balance"))?;
        let amount = credit.min(owed);
        remaining.insert(creditor.clone(), credit - amount);
        remaining.insert(debtor.clone(), debt + amount);
        transfers.push(Transfer::new(
            debtor,
            creditor,
            Money::from_minor(amount, currency),
        ));
    }

    Ok(transfers)
}

/// Largest-magnitude balance matching `side`; the first (lowest id) wins ties.
fn pick(
    remaining: &BTreeMap<ParticipantId, i64>,
    side: impl Fn(i64) -> bool,
) -> Option<(ParticipantId, i64)> {
    let mut best: Option<(&ParticipantId, i64)> = None;
    for (participant, balance) in remaining {
        if !side(*balance) {
            continue;
        }
        match best {
            Some((_, current)) if balance.unsigned_abs() <= current.unsigned_abs() => {}
            _ => best = Some((participant, *balance)),
        }
    }
    best.map(|(p, b)| (p.clone(), b))
}

// =============================================================================
// Unit Tests
// =============================================================================
