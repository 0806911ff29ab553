//! # Transfer Commands
//!
//! Payment outcomes for a finalized bill.
//!
//! ## Payment Status Screen
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Pizza night                                   Collected 10.17 / 20.34  │
//! │                                                                         │
//! │  Sarah → Alex   10.17   ✔ completed                                    │
//! │  Mike  → Alex   10.17   ✖ failed: card declined    [Retry]             │
//! │                                                      │                  │
//! │                                         reissue_transfer()              │
//! │                                                      │                  │
//! │  Mike  → Alex   10.17   … pending (replaces the failed one)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Completed and failed transfers are terminal; a declined payment is
//! retried through a new transfer, never by reopening the old one.

use tracing::{debug, info, warn};

use divvy_core::{
    BillId, CollectionProgress, ParticipantId, PaymentProvider, Transfer, TransferId,
    TransferStatus,
};

use crate::error::ApiError;
use crate::state::BillStore;

pub fn list_transfers(store: &BillStore, bill_id: &BillId) -> Result<Vec<Transfer>, ApiError> {
    debug!(bill_id = %bill_id, "list_transfers command");
    store.with_bill(bill_id, |bill| Ok(bill.transfers().to_vec()))
}

/// Records the provider the payer chose. Only pending transfers accept one.
pub fn attach_provider(
    store: &BillStore,
    bill_id: &BillId,
    transfer_id: &TransferId,
    provider: &str,
) -> Result<(), ApiError> {
    debug!(bill_id = %bill_id, transfer_id = %transfer_id, provider = %provider, "attach_provider command");
    store.with_bill_mut(bill_id, |bill| {
        Ok(bill.attach_provider(transfer_id, PaymentProvider::new(provider))?)
    })
}

pub fn mark_transfer_paid(
    store: &BillStore,
    bill_id: &BillId,
    transfer_id: &TransferId,
) -> Result<Transfer, ApiError> {
    debug!(bill_id = %bill_id, transfer_id = %transfer_id, "mark_transfer_paid command");
    store.with_bill_mut(bill_id, |bill| {
        let transfer = bill.mark_transfer_completed(transfer_id)?.clone();
        info!(transfer_id = %transfer_id, amount = %transfer.amount, "Transfer completed");
        Ok(transfer)
    })
}

pub fn mark_transfer_failed(
    store: &BillStore,
    bill_id: &BillId,
    transfer_id: &TransferId,
    reason: &str,
) -> Result<Transfer, ApiError> {
    debug!(bill_id = %bill_id, transfer_id = %transfer_id, reason = %reason, "mark_transfer_failed command");
    store.with_bill_mut(bill_id, |bill| {
        let transfer = bill.mark_transfer_failed(transfer_id, reason)?.clone();
        warn!(transfer_id = %transfer_id, reason = %reason, "Transfer failed");
        Ok(transfer)
    })
}

/// Creates (or returns the existing) pending replacement for a failed
/// transfer.
pub fn reissue_transfer(
    store: &BillStore,
    bill_id: &BillId,
    transfer_id: &TransferId,
) -> Result<Transfer, ApiError> {
    debug!(bill_id = %bill_id, transfer_id = %transfer_id, "reissue_transfer command");
    store.with_bill_mut(bill_id, |bill| {
        let replacement = bill.reissue_transfer(transfer_id)?;
        Ok(bill.transfer(&replacement)?.clone())
    })
}

pub fn get_collection_progress(
    store: &BillStore,
    bill_id: &BillId,
) -> Result<CollectionProgress, ApiError> {
    debug!(bill_id = %bill_id, "get_collection_progress command");
    store.with_bill(bill_id, |bill| Ok(bill.collection_progress()?))
}

/// Applies payment outcomes by participant: the pending transfer from each
/// participant in `paid` is completed, from each in `failed` declined.
///
/// `provider`, when given, is attached before the outcome is recorded.
pub fn record_outcomes(
    store: &BillStore,
    bill_id: &BillId,
    paid: &[String],
    failed: &[String],
    reason: &str,
    provider: Option<&str>,
) -> Result<(), ApiError> {
    debug!(bill_id = %bill_id, paid = paid.len(), failed = failed.len(), "record_outcomes command");

    let outcomes = paid
        .iter()
        .map(|p| (p, true))
        .chain(failed.iter().map(|p| (p, false)));
    for (participant, completed) in outcomes {
        let transfer_id = pending_transfer_from(store, bill_id, participant)?;
        if let Some(provider) = provider {
            attach_provider(store, bill_id, &transfer_id, provider)?;
        }
        if completed {
            mark_transfer_paid(store, bill_id, &transfer_id)?;
        } else {
            mark_transfer_failed(store, bill_id, &transfer_id, reason)?;
        }
    }
    Ok(())
}

fn pending_transfer_from(
    store: &BillStore,
    bill_id: &BillId,
    participant: &str,
) -> Result<TransferId, ApiError> {
    let from = ParticipantId::new(participant);
    store.with_bill(bill_id, |bill| {
        bill.transfers()
            .iter()
            .find(|t| t.from == from && t.status == TransferStatus::Pending)
            .map(|t| t.id.clone())
            .ok_or_else(|| ApiError::not_found("Pending transfer from", participant))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::bill;
    use crate::config::AppConfig;
    use crate::error::ErrorCode;

    /// Alex pays 30.00 shared by three.
    fn finalized() -> (BillStore, BillId) {
        let store = BillStore::new();
        let id = bill::create_bill(&store, &AppConfig::default(), "Brunch", Some("USD"), None)
            .unwrap();
        for (pid, name) in [("a", "Alex"), ("b", "Sarah"), ("c", "Mike")] {
            bill::add_participant(&store, &id, pid, name).unwrap();
        }
        let item = bill::add_item(&store, &id, "Brunch", "30.00", None).unwrap();
        bill::share_item_with_all(&store, &id, &item).unwrap();
        bill::set_payer(&store, &id, "a").unwrap();
        bill::finalize_bill(&store, &id).unwrap();
        (store, id)
    }

    #[test]
    fn test_record_outcomes() {
        let (store, id) = finalized();
        record_outcomes(
            &store,
            &id,
            &["b".to_string()],
            &["c".to_string()],
            "card declined",
            Some("flouci"),
        )
        .unwrap();

        let transfers = list_transfers(&store, &id).unwrap();
        let from_b = transfers.iter().find(|t| t.from.as_str() == "b").unwrap();
        let from_c = transfers.iter().find(|t| t.from.as_str() == "c").unwrap();
        assert_eq!(from_b.status, TransferStatus::Completed);
        assert_eq!(from_b.provider, Some(PaymentProvider::new("flouci")));
        assert_eq!(from_c.status, TransferStatus::Failed);
        assert_eq!(from_c.failure_reason.as_deref(), Some("card declined"));

        let progress = get_collection_progress(&store, &id).unwrap();
        assert_eq!(progress.collected.minor(), 1_000);
        assert_eq!(progress.failed.minor(), 1_000);
        assert_eq!(progress.progress_bps, 5_000);
    }

    #[test]
    fn test_terminal_transfer_rejects_changes() {
        let (store, id) = finalized();
        let transfer = list_transfers(&store, &id).unwrap()[0].id.clone();
        mark_transfer_paid(&store, &id, &transfer).unwrap();

        let err = mark_transfer_failed(&store, &id, &transfer, "late").unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);
        let err = attach_provider(&store, &id, &transfer, "orange_money").unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);
    }

    #[test]
    fn test_reissue_is_idempotent() {
        let (store, id) = finalized();
        let transfer = list_transfers(&store, &id).unwrap()[0].id.clone();
        mark_transfer_failed(&store, &id, &transfer, "timeout").unwrap();

        let first = reissue_transfer(&store, &id, &transfer).unwrap();
        let second = reissue_transfer(&store, &id, &transfer).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.replaces, Some(transfer));
        assert_eq!(first.status, TransferStatus::Pending);
        assert_eq!(list_transfers(&store, &id).unwrap().len(), 3);
    }

    #[test]
    fn test_no_pending_transfer_for_payer() {
        let (store, id) = finalized();
        let err = record_outcomes(&store, &id, &["a".to_string()], &[], "", None).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
