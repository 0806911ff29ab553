//! # State Module
//!
//! Session state shared by the commands layer.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────────┐      ┌──────────────────────────┐        │
//! │  │   BillStore              │      │   AppConfig              │        │
//! │  │                          │      │                          │        │
//! │  │   Arc<Mutex<             │      │   currency, policies,    │        │
//! │  │     HashMap<BillId,Bill> │      │   output, logging        │        │
//! │  │   >>                     │      │                          │        │
//! │  └──────────────────────────┘      └──────────────────────────┘        │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • BillStore: one lock for all open bills; commands hold it briefly    │
//! │  • AppConfig: read-only after load                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod bills;

pub use bills::BillStore;
