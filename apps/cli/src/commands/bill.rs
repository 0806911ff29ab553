//! # Bill Commands
//!
//! Commands for building and finalizing a bill.
//!
//! ## Bill Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Bill Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Create  │────►│  Items   │────►│  Assign  │────►│ Finalize │       │
//! │  │  Bill    │     │  + Fees  │     │  People  │     │  Split   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │       │                │                │                │              │
//! │  create_bill      add_item         assign_item      finalize_bill      │
//! │  add_participant  add_surcharge    share_item_...   (transfer.rs       │
//! │  set_payer        import_receipt   unassign_item     takes over)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use divvy_core::receipt::ImportedReceipt;
use divvy_core::types::{SurchargeKind, SurchargePolicy};
use divvy_core::{
    Allocation, AssignmentSummary, Bill, BillId, Currency, ItemId, Money, ParticipantId, Rate,
    ReceiptScan, Surcharge, SurchargeId,
};

use crate::bill_file::BillFile;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::state::BillStore;

/// A surcharge as entered by the user.
///
/// Exactly one of `amount` (decimal string) or `rate_bps` must be set.
/// Without a `policy` the configured default for `kind` applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeInput {
    pub kind: SurchargeKind,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub rate_bps: Option<u32>,
    #[serde(default)]
    pub policy: Option<SurchargePolicy>,
}

fn parse_money(field: &str, text: &str, currency: Currency) -> Result<Money, ApiError> {
    Money::parse(text, currency)
        .map_err(|e| ApiError::validation(format!("{}: {}", field, e)))
}

// =============================================================================
// Setup
// =============================================================================

/// Opens a new draft bill.
///
/// ## Arguments
/// * `currency` - ISO 4217 code; the configured default when `None`
/// * `created_at` - bill date; now when `None`
pub fn create_bill(
    store: &BillStore,
    config: &AppConfig,
    title: &str,
    currency: Option<&str>,
    created_at: Option<DateTime<Utc>>,
) -> Result<BillId, ApiError> {
    debug!(title = %title, currency = ?currency, "create_bill command");

    let currency = match currency {
        Some(code) => Currency::from_code(code).map_err(|e| ApiError::validation(e.to_string()))?,
        None => config.default_currency()?,
    };
    let mut bill = Bill::new(title, currency)?;
    if let Some(created_at) = created_at {
        bill = bill.with_created_at(created_at);
    }
    store.insert(bill)
}

pub fn add_participant(
    store: &BillStore,
    bill_id: &BillId,
    participant_id: &str,
    name: &str,
) -> Result<(), ApiError> {
    debug!(bill_id = %bill_id, participant_id = %participant_id, "add_participant command");
    store.with_bill_mut(bill_id, |bill| {
        Ok(bill.add_participant(ParticipantId::new(participant_id), name)?)
    })
}

pub fn set_payer(store: &BillStore, bill_id: &BillId, participant_id: &str) -> Result<(), ApiError> {
    debug!(bill_id = %bill_id, payer = %participant_id, "set_payer command");
    store.with_bill_mut(bill_id, |bill| {
        Ok(bill.set_payer(&ParticipantId::new(participant_id))?)
    })
}

/// Records the total printed on the receipt; checked at finalize.
pub fn set_stated_total(store: &BillStore, bill_id: &BillId, amount: &str) -> Result<(), ApiError> {
    debug!(bill_id = %bill_id, amount = %amount, "set_stated_total command");
    store.with_bill_mut(bill_id, |bill| {
        let total = parse_money("stated total", amount, bill.currency())?;
        Ok(bill.set_stated_total(total)?)
    })
}

// =============================================================================
// Items
// =============================================================================

/// Adds a line item priced `unit_price × quantity`.
///
/// ## Arguments
/// * `unit_price` - decimal string in the bill's currency, e.g. `"18.50"`
/// * `quantity` - defaults to 1
pub fn add_item(
    store: &BillStore,
    bill_id: &BillId,
    description: &str,
    unit_price: &str,
    quantity: Option<i64>,
) -> Result<ItemId, ApiError> {
    let quantity = quantity.unwrap_or(1);
    debug!(bill_id = %bill_id, description = %description, quantity = %quantity, "add_item command");

    store.with_bill_mut(bill_id, |bill| {
        let unit = parse_money("unit price", unit_price, bill.currency())?;
        let price = unit.multiply_quantity(quantity)?;
        Ok(bill.add_item(description, price, quantity)?)
    })
}

pub fn remove_item(store: &BillStore, bill_id: &BillId, item_id: &ItemId) -> Result<(), ApiError> {
    debug!(bill_id = %bill_id, item_id = %item_id, "remove_item command");
    store.with_bill_mut(bill_id, |bill| {
        bill.remove_item(item_id)?;
        Ok(())
    })
}

/// Marks a participant as sharing an item. Assigning twice is a no-op.
pub fn assign_item(
    store: &BillStore,
    bill_id: &BillId,
    item_id: &ItemId,
    participant_id: &str,
) -> Result<(), ApiError> {
    debug!(bill_id = %bill_id, item_id = %item_id, participant_id = %participant_id, "assign_item command");
    store.with_bill_mut(bill_id, |bill| {
        Ok(bill.assign(item_id, &ParticipantId::new(participant_id))?)
    })
}

pub fn unassign_item(
    store: &BillStore,
    bill_id: &BillId,
    item_id: &ItemId,
    participant_id: &str,
) -> Result<(), ApiError> {
    debug!(bill_id = %bill_id, item_id = %item_id, participant_id = %participant_id, "unassign_item command");
    store.with_bill_mut(bill_id, |bill| {
        Ok(bill.unassign(item_id, &ParticipantId::new(participant_id))?)
    })
}

/// The "everyone" toggle on the assign screen.
pub fn share_item_with_all(
    store: &BillStore,
    bill_id: &BillId,
    item_id: &ItemId,
) -> Result<(), ApiError> {
    debug!(bill_id = %bill_id, item_id = %item_id, "share_item_with_all command");
    store.with_bill_mut(bill_id, |bill| Ok(bill.assign_all(item_id)?))
}

pub fn get_assignment_summary(
    store: &BillStore,
    bill_id: &BillId,
) -> Result<AssignmentSummary, ApiError> {
    debug!(bill_id = %bill_id, "get_assignment_summary command");
    store.with_bill(bill_id, |bill| Ok(bill.assignment_summary()?))
}

// =============================================================================
// Surcharges
// =============================================================================

/// Adds a tax, tip or service fee.
pub fn add_surcharge(
    store: &BillStore,
    config: &AppConfig,
    bill_id: &BillId,
    input: &SurchargeInput,
) -> Result<SurchargeId, ApiError> {
    let policy = input.policy.unwrap_or_else(|| config.policy_for(input.kind));
    debug!(bill_id = %bill_id, kind = %input.kind, policy = %policy, "add_surcharge command");

    store.with_bill_mut(bill_id, |bill| {
        let surcharge = match (&input.amount, input.rate_bps) {
            (Some(amount), None) => Surcharge::fixed(
                input.kind,
                parse_money("surcharge amount", amount, bill.currency())?,
                policy,
            ),
            (None, Some(bps)) => Surcharge::rate(input.kind, Rate::from_bps(bps), policy)?,
            _ => {
                return Err(ApiError::validation(format!(
                    "{} needs exactly one of amount or rate_bps",
                    input.kind
                )))
            }
        };
        Ok(bill.add_surcharge(surcharge)?)
    })
}

pub fn remove_surcharge(
    store: &BillStore,
    bill_id: &BillId,
    surcharge_id: &SurchargeId,
) -> Result<(), ApiError> {
    debug!(bill_id = %bill_id, surcharge_id = %surcharge_id, "remove_surcharge command");
    store.with_bill_mut(bill_id, |bill| {
        bill.remove_surcharge(surcharge_id)?;
        Ok(())
    })
}

/// Imports a scanned receipt using the configured surcharge policies.
pub fn import_receipt(
    store: &BillStore,
    config: &AppConfig,
    bill_id: &BillId,
    scan: &ReceiptScan,
) -> Result<ImportedReceipt, ApiError> {
    debug!(bill_id = %bill_id, lines = scan.lines.len(), "import_receipt command");
    store.with_bill_mut(bill_id, |bill| {
        Ok(bill.import_receipt(scan, config.receipt_policies())?)
    })
}

// =============================================================================
// Split
// =============================================================================

/// What everyone would owe right now, without freezing anything.
pub fn preview_split(store: &BillStore, bill_id: &BillId) -> Result<Allocation, ApiError> {
    debug!(bill_id = %bill_id, "preview_split command");
    store.with_bill(bill_id, |bill| Ok(bill.compute_allocation()?))
}

/// Freezes the allocation and generates the transfers to the payer.
pub fn finalize_bill(store: &BillStore, bill_id: &BillId) -> Result<Allocation, ApiError> {
    debug!(bill_id = %bill_id, "finalize_bill command");
    store.with_bill_mut(bill_id, |bill| {
        let allocation = bill.finalize()?.clone();
        let total = allocation.total()?;
        info!(
            bill_id = %bill_id,
            total = %total,
            transfers = bill.transfers().len(),
            "Bill finalized"
        );
        Ok(allocation)
    })
}

// =============================================================================
// Bill Files
// =============================================================================

/// Replays a bill file through the commands above and returns the new
/// draft bill's id. On error the partially built bill is discarded.
pub fn open_bill(
    store: &BillStore,
    config: &AppConfig,
    file: &BillFile,
) -> Result<BillId, ApiError> {
    debug!(title = %file.title, items = file.items.len(), "open_bill command");

    let bill_id = create_bill(store, config, &file.title, file.currency.as_deref(), file.date)?;
    match populate(store, config, &bill_id, file) {
        Ok(()) => Ok(bill_id),
        Err(err) => {
            store.remove(&bill_id)?;
            Err(err)
        }
    }
}

fn populate(
    store: &BillStore,
    config: &AppConfig,
    bill_id: &BillId,
    file: &BillFile,
) -> Result<(), ApiError> {
    for participant in &file.participants {
        add_participant(store, bill_id, &participant.id, &participant.name)?;
    }

    if let Some(scan) = &file.receipt {
        let imported = import_receipt(store, config, bill_id, scan)?;
        for assignment in &file.receipt_assignments {
            let item_id = imported.item_ids.get(assignment.line).ok_or_else(|| {
                ApiError::validation(format!(
                    "receipt assignment refers to line {}, receipt has {}",
                    assignment.line,
                    imported.item_ids.len()
                ))
            })?;
            apply_assignees(store, bill_id, item_id, &assignment.assigned_to, assignment.shared)?;
        }
    }

    for item in &file.items {
        let item_id = add_item(store, bill_id, &item.description, &item.unit_price, Some(item.quantity))?;
        apply_assignees(store, bill_id, &item_id, &item.assigned_to, item.shared)?;
    }

    for surcharge in &file.surcharges {
        add_surcharge(store, config, bill_id, surcharge)?;
    }

    if let Some(total) = &file.stated_total {
        set_stated_total(store, bill_id, total)?;
    }
    set_payer(store, bill_id, &file.payer)
}

fn apply_assignees(
    store: &BillStore,
    bill_id: &BillId,
    item_id: &ItemId,
    assigned_to: &[String],
    shared: bool,
) -> Result<(), ApiError> {
    if shared {
        return share_item_with_all(store, bill_id, item_id);
    }
    for participant in assigned_to {
        assign_item(store, bill_id, item_id, participant)?;
    }
    Ok(())
}
