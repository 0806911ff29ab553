//! # Collection Summary
//!
//! What the payment status screen shows: how much of a bill has been
//! collected, how much is still pending, and what was declined.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Collected        30.00 / 45.50 USD      6593 bps       │
//! │  ████████████████████░░░░░░░░░░                         │
//! │                                                         │
//! │  ✓ sarah   15.00   paid                                 │
//! │  ✓ mike    15.00   paid                                 │
//! │  … jenny   15.50   pending                              │
//! └─────────────────────────────────────────────────────────┘
//! ```
//! Failed transfers that were reissued are left out of every figure; their
//! replacement carries the debt instead.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::{Currency, Money};
use crate::settlement::{current_transfers, Transfer};
use crate::types::{SettlementStatus, TransferStatus};

/// Paid / pending / declined totals for one bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CollectionProgress {
    /// Sum of every current transfer.
    pub expected: Money,
    pub collected: Money,
    pub pending: Money,
    pub failed: Money,
    pub completed_count: usize,
    pub pending_count: usize,
    pub failed_count: usize,
    /// `collected / expected` in basis points, rounded down.
    /// 10000 when nothing needs collecting.
    pub progress_bps: u32,
    /// True when nothing is pending or declined.
    pub is_settled: bool,
}

/// Tallies the current transfers of a bill.
pub fn collection_progress(
    currency: Currency,
    transfers: &[Transfer],
) -> CoreResult<CollectionProgress> {
    let mut collected = Money::zero(currency);
    let mut pending = Money::zero(currency);
    let mut failed = Money::zero(currency);
    let (mut completed_count, mut pending_count, mut failed_count) = (0, 0, 0);

    for transfer in current_transfers(transfers) {
        match transfer.status {
            TransferStatus::Completed => {
                collected = collected.try_add(transfer.amount)?;
                completed_count += 1;
            }
            TransferStatus::Pending => {
                pending = pending.try_add(transfer.amount)?;
                pending_count += 1;
            }
            TransferStatus::Failed => {
                failed = failed.try_add(transfer.amount)?;
                failed_count += 1;
            }
        }
    }

    let expected = collected.try_add(pending)?.try_add(failed)?;
    let progress_bps = if expected.is_zero() {
        10_000
    } else {
        (collected.minor() as i128 * 10_000 / expected.minor() as i128) as u32
    };

    Ok(CollectionProgress {
        expected,
        collected,
        pending,
        failed,
        completed_count,
        pending_count,
        failed_count,
        progress_bps,
        is_settled: pending_count == 0 && failed_count == 0,
    })
}

/// `Settled` when every current transfer is completed.
pub fn settlement_status(transfers: &[Transfer]) -> SettlementStatus {
    if current_transfers(transfers).all(|t| t.status == TransferStatus::Completed) {
        SettlementStatus::Settled
    } else {
        SettlementStatus::Pending
    }
}
