//! beanlearn CLI - Beancount feature extraction for classifiers
//!
//! Usage:
//!   beanlearn stats LEDGER                    Summarize a ledger
//!   beanlearn features LEDGER --account A     Print feature rows
//!   beanlearn export LEDGER --target payee    Export training data
//!   beanlearn annotate LEDGER --account A     Add inferred postings

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Stats { ledger, account } => {
            commands::cmd_stats(&ledger, account.as_deref(), &mut std::io::stdout().lock())
        }
        Commands::Features {
            ledger,
            account,
            per_posting,
        } => commands::cmd_features(
            &config,
            &ledger,
            account.as_deref(),
            per_posting,
            &mut std::io::stdout().lock(),
        ),
        Commands::Export {
            ledger,
            account,
            target,
            format,
            output,
        } => commands::cmd_export(
            &config,
            &ledger,
            account.as_deref(),
            target.as_deref(),
            format,
            output.as_deref(),
        ),
        Commands::Annotate {
            ledger,
            account,
            payee,
            overwrite,
        } => commands::cmd_annotate(
            &ledger,
            &account,
            payee.as_deref(),
            overwrite,
            &mut std::io::stdout().lock(),
        ),
    }
}
