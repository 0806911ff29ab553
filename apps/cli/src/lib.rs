//! # Divvy CLI Library
//!
//! The application shell around `divvy-core`: configuration, logging,
//! bill sessions and the commands a front-end invokes.
//!
//! ## Module Organization
//! ```text
//! divvy_cli/
//! ├── lib.rs          ◄─── You are here (exports, logging setup)
//! ├── main.rs         ◄─── `divvy` binary (clap)
//! ├── config.rs       ◄─── TOML + DIVVY_* environment configuration
//! ├── error.rs        ◄─── API error type for commands
//! ├── bill_file.rs    ◄─── JSON bill file format
//! ├── report.rs       ◄─── Human / JSON output
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   └── bills.rs    ◄─── Open bills (Arc<Mutex<..>>)
//! └── commands/
//!     ├── mod.rs      ◄─── Command exports
//!     ├── bill.rs     ◄─── Build, assign, finalize
//!     ├── transfer.rs ◄─── Payment outcomes, reissue
//!     └── group.rs    ◄─── Group balances, settle-up
//! ```
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  divvy split dinner.json --paid sarah                                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  AppConfig::load ──► init_tracing ──► BillFile::from_json              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  commands::bill::open_bill ──► finalize_bill                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  commands::transfer::record_outcomes ──► SplitReport::render           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod bill_file;
pub mod commands;
pub mod config;
pub mod error;
pub mod report;
pub mod state;

pub use config::{AppConfig, OutputFormat};
pub use error::{ApiError, ErrorCode};

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=divvy=trace` - Show trace for divvy crates only
/// - Otherwise `default_filter` (the `[logging] filter` setting)
///
/// Logs go to stderr so JSON reports on stdout stay machine-readable.
/// Calling this twice keeps the first subscriber.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
