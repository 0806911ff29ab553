//! Divvy CLI - split a bill, then settle up
//!
//! Reads JSON bill files, prints who owes what and the transfers that
//! settle everyone.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use divvy_cli::bill_file::BillFile;
use divvy_cli::commands::{bill, group, transfer};
use divvy_cli::report::{Report, SplitReport};
use divvy_cli::state::BillStore;
use divvy_cli::{init_tracing, AppConfig, OutputFormat};
use divvy_core::{BillId, GroupKind};

/// Divvy: split shared bills exactly, down to the last cent
#[derive(Parser)]
#[command(name = "divvy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (overrides the configured filter)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, env = "DIVVY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split one bill and show what everyone owes
    Split {
        /// Bill file (JSON)
        file: PathBuf,

        /// Participants whose payment went through
        #[arg(long, value_delimiter = ',')]
        paid: Vec<String>,

        /// Participants whose payment was declined
        #[arg(long, value_delimiter = ',')]
        failed: Vec<String>,

        /// Reason recorded on declined payments
        #[arg(long, default_value = "payment declined")]
        reason: String,

        /// Payment provider used for the recorded payments
        #[arg(long)]
        provider: Option<String>,

        /// Output format (defaults to the configured one)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Net several bills across a group and propose the fewest transfers
    Settle {
        /// Bill files (JSON)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Group name
        #[arg(short, long, default_value = "Group")]
        name: String,

        /// Group kind (friends, roommates, work, travel)
        #[arg(long, default_value = "friends", value_parser = parse_group_kind)]
        kind: GroupKind,

        /// Also show this member's expense history
        #[arg(long)]
        member: Option<String>,

        /// Output format (defaults to the configured one)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Print the default config file location
    Path,
}

fn parse_group_kind(value: &str) -> Result<GroupKind, String> {
    value.parse::<GroupKind>().map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.clone()).context("failed to load configuration")?;
    let filter = if cli.verbose {
        "debug"
    } else {
        config.logging.filter.as_str()
    };
    init_tracing(filter);

    match cli.command {
        Commands::Split {
            file,
            paid,
            failed,
            reason,
            provider,
            format,
        } => {
            let store = BillStore::new();
            let bill_id = open_and_finalize(&store, &config, &file)?;
            transfer::record_outcomes(&store, &bill_id, &paid, &failed, &reason, provider.as_deref())?;

            let report = SplitReport::build(&store, &bill_id)?;
            println!("{}", report.render(format.unwrap_or(config.output.format))?);
        }
        Commands::Settle {
            files,
            name,
            kind,
            member,
            format,
        } => {
            let store = BillStore::new();
            let bill_ids = files
                .iter()
                .map(|file| open_and_finalize(&store, &config, file))
                .collect::<Result<Vec<_>>>()?;

            let response = group::settle_bills(&store, &name, kind, &bill_ids, member.as_deref())?;
            println!("{}", response.render(format.unwrap_or(config.output.format))?);
        }
        Commands::Config { action } => match action {
            ConfigCommands::Show => print!("{}", config.to_toml()?),
            ConfigCommands::Path => match AppConfig::default_config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("no config directory on this platform"),
            },
        },
    }

    Ok(())
}

fn open_and_finalize(store: &BillStore, config: &AppConfig, path: &Path) -> Result<BillId> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bill file {}", path.display()))?;
    let file = BillFile::from_json(&contents)
        .with_context(|| format!("in {}", path.display()))?;

    let bill_id = bill::open_bill(store, config, &file)
        .with_context(|| format!("in {}", path.display()))?;
    bill::finalize_bill(store, &bill_id).with_context(|| format!("in {}", path.display()))?;
    info!(path = %path.display(), bill_id = %bill_id, "Bill loaded");
    Ok(bill_id)
}
