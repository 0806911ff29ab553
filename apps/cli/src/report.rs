//! # Reports
//!
//! What the CLI prints: the split summary of one bill and the settle-up
//! of a group, as aligned text or pretty JSON.
//!
//! ```text
//! Pizza night · USD · finalized · paid by Alex
//!
//!   Alex      items    21.25 USD   fees     2.13 USD   owes    23.38 USD
//!   Sarah     items     9.25 USD   fees     0.92 USD   owes    10.17 USD
//!   Total                                                       33.55 USD
//!
//! Transfers
//!   Sarah → Alex       10.17 USD   pending
//!
//! Collected 0.00 USD of 10.17 USD (0.00%) · pending
//! ```

use std::fmt::Write;

use serde::Serialize;

use divvy_core::{
    BillId, BillStatus, CollectionProgress, Currency, Money, ParticipantId, SettlementStatus,
    Transfer, TransferStatus,
};

use crate::commands::group::SettleResponse;
use crate::config::OutputFormat;
use crate::error::ApiError;
use crate::state::BillStore;

/// Anything the CLI can print in either output format.
pub trait Report: Serialize {
    /// Aligned text for a terminal.
    fn human(&self) -> String;

    fn render(&self, format: OutputFormat) -> Result<String, ApiError> {
        match format {
            OutputFormat::Human => Ok(self.human()),
            OutputFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| ApiError::internal(format!("failed to render JSON: {}", e))),
        }
    }
}

fn percent(bps: u32) -> String {
    format!("{}.{:02}%", bps / 100, bps % 100)
}

fn status_label(status: SettlementStatus) -> &'static str {
    match status {
        SettlementStatus::Pending => "pending",
        SettlementStatus::Settled => "settled",
    }
}

// =============================================================================
// Split Report
// =============================================================================

/// One row of the split summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLine {
    pub participant_id: ParticipantId,
    pub name: String,
    pub items_subtotal: Money,
    pub surcharges_total: Money,
    pub total: Money,
}

/// Split summary and payment status of one bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitReport {
    pub bill_id: BillId,
    pub title: String,
    pub currency: Currency,
    pub status: BillStatus,
    pub settlement: SettlementStatus,
    pub payer: Option<ParticipantId>,
    pub total: Money,
    pub shares: Vec<ShareLine>,
    pub transfers: Vec<Transfer>,
    pub progress: CollectionProgress,
}

impl SplitReport {
    /// Snapshots a bill from the store.
    pub fn build(store: &BillStore, bill_id: &BillId) -> Result<Self, ApiError> {
        store.with_bill(bill_id, |bill| {
            let allocation = bill.compute_allocation()?;
            let shares = allocation
                .shares
                .values()
                .map(|share| {
                    let name = bill
                        .participant(&share.participant_id)
                        .map(|p| p.name.clone())
                        .unwrap_or_else(|_| share.participant_id.to_string());
                    ShareLine {
                        participant_id: share.participant_id.clone(),
                        name,
                        items_subtotal: share.items_subtotal,
                        surcharges_total: share.surcharges_total,
                        total: share.total,
                    }
                })
                .collect();

            Ok(SplitReport {
                bill_id: bill.id().clone(),
                title: bill.title().to_string(),
                currency: bill.currency(),
                status: bill.status(),
                settlement: bill.settlement_status(),
                payer: bill.payer().cloned(),
                total: allocation.total()?,
                shares,
                transfers: bill.transfers().to_vec(),
                progress: bill.collection_progress()?,
            })
        })
    }

    fn name_of<'a>(&'a self, id: &'a ParticipantId) -> &'a str {
        self.shares
            .iter()
            .find(|s| &s.participant_id == id)
            .map(|s| s.name.as_str())
            .unwrap_or(id.as_str())
    }
}

impl Report for SplitReport {
    fn human(&self) -> String {
        let mut out = String::new();
        let status = match self.status {
            BillStatus::Draft => "draft",
            BillStatus::Finalized => "finalized",
        };
        let _ = write!(out, "{} · {} · {}", self.title, self.currency, status);
        if let Some(payer) = &self.payer {
            let _ = write!(out, " · paid by {}", self.name_of(payer));
        }
        out.push_str("\n\n");

        for share in &self.shares {
            let _ = writeln!(
                out,
                "  {:<10} items {:>14}   fees {:>14}   owes {:>14}",
                share.name,
                share.items_subtotal.to_string(),
                share.surcharges_total.to_string(),
                share.total.to_string(),
            );
        }
        let _ = writeln!(out, "  {:<66} {:>14}", "Total", self.total.to_string());

        if !self.transfers.is_empty() {
            out.push_str("\nTransfers\n");
            for transfer in &self.transfers {
                let route = format!(
                    "{} → {}",
                    self.name_of(&transfer.from),
                    self.name_of(&transfer.to)
                );
                let _ = write!(
                    out,
                    "  {:<20} {:>14}   {}",
                    route,
                    transfer.amount.to_string(),
                    transfer.status
                );
                if let Some(provider) = &transfer.provider {
                    let _ = write!(out, " via {}", provider);
                }
                if transfer.status == TransferStatus::Failed {
                    if let Some(reason) = &transfer.failure_reason {
                        let _ = write!(out, ": {}", reason);
                    }
                }
                out.push('\n');
            }
        }

        let _ = writeln!(
            out,
            "\nCollected {} of {} ({}) · {}",
            self.progress.collected,
            self.progress.expected,
            percent(self.progress.progress_bps),
            status_label(self.settlement),
        );
        out
    }
}

// =============================================================================
// Settle Report
// =============================================================================

impl Report for SettleResponse {
    fn human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} · {} · {} bill(s)\n",
            self.group_name, self.kind, self.bill_count
        );

        out.push_str("Balances\n");
        for line in &self.balances {
            let _ = writeln!(out, "  {:<10} {:>16}", line.name, line.balance.to_string());
        }

        out.push_str("\nSettle up\n");
        if self.transfers.is_empty() {
            out.push_str("  Everyone is settled\n");
        }
        for transfer in &self.transfers {
            let route = format!(
                "{} → {}",
                self.name_of(&transfer.from),
                self.name_of(&transfer.to)
            );
            let _ = writeln!(out, "  {:<20} {:>14}", route, transfer.amount.to_string());
        }

        if let Some(summary) = &self.summary {
            let _ = writeln!(out, "\nSummary for {}", self.name_of(&summary.member));
            for (label, amount) in [
                ("Owed to you", summary.owed_to_you),
                ("You owe", summary.you_owe),
                ("Net", summary.net),
                ("Settled", summary.total_settled),
                ("Pending", summary.total_pending),
            ] {
                let _ = writeln!(out, "  {:<14} {:>16}", label, amount.to_string());
            }
        }

        if let Some(history) = &self.history {
            out.push_str("\nHistory\n");
            for entry in history {
                let _ = writeln!(
                    out,
                    "  {}  {:<20} {:>14}   your share {:>14}   {}",
                    entry.date.format("%Y-%m-%d"),
                    entry.title,
                    entry.amount.to_string(),
                    entry.your_share.to_string(),
                    status_label(entry.status),
                );
            }
        }
        out
    }
}
