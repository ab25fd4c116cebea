//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// beanlearn - Prepare beancount ledgers for account and payee classifiers
#[derive(Parser)]
#[command(name = "beanlearn")]
#[command(about = "Feature extraction and training data export for beancount ledgers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Feature config file (defaults to the data dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize the transactions of a ledger
    Stats {
        /// Beancount file
        ledger: PathBuf,

        /// Only count transactions posting to this account
        #[arg(short, long)]
        account: Option<String>,
    },

    /// Print the feature table as JSON Lines
    Features {
        /// Beancount file
        ledger: PathBuf,

        /// Only use transactions posting to this account
        #[arg(short, long)]
        account: Option<String>,

        /// One row per posting, seen from --account
        #[arg(long)]
        per_posting: bool,
    },

    /// Export labelled training data
    Export {
        /// Beancount file
        ledger: PathBuf,

        /// Only use transactions posting to this account
        #[arg(short, long)]
        account: Option<String>,

        /// What the examples are labelled with: account, payee
        #[arg(short, long)]
        target: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "jsonl")]
        format: ExportFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Add an inferred counter posting to single-posting transactions
    Annotate {
        /// Beancount file
        ledger: PathBuf,

        /// Counter account for the inferred posting
        #[arg(short, long)]
        account: String,

        /// Payee to set on transactions that have none
        #[arg(short, long)]
        payee: Option<String>,

        /// Replace existing payees as well
        #[arg(long, requires = "payee")]
        overwrite: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Jsonl,
    Csv,
}
