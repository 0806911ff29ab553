//! # Commands Module
//!
//! Every operation a front-end can invoke on a bill session.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── bill.rs      ◄─── Participants, items, assignment, surcharges, finalize
//! ├── transfer.rs  ◄─── Payment outcomes, reissue, collection progress
//! └── group.rs     ◄─── Group balances and settle-up
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  Front-end (CLI / mobile bridge)                                        │
//! │  ───────────────────────────────                                        │
//! │  assign_item(&store, &bill_id, &item_id, "sarah")                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  BillStore::with_bill_mut ── lock ──► Bill::assign (divvy-core)         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Result<T, ApiError>  ◄── CoreError mapped to { code, message }         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each command takes only the state it needs: `&BillStore` always, and
//! `&AppConfig` when a default (currency, surcharge policy) may apply.

pub mod bill;
pub mod group;
pub mod transfer;
