//! Feature table output

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use beanlearn_core::features::samples;
use beanlearn_core::FeatureConfig;

use super::load_transactions;

/// Print one JSON object per sample with the configured feature columns
pub fn cmd_features<W: Write>(
    config: &FeatureConfig,
    ledger: &Path,
    account: Option<&str>,
    per_posting: bool,
    out: &mut W,
) -> Result<()> {
    let account = account.or(config.known_account.as_deref());
    let transactions = load_transactions(ledger, account)?;

    let reference = if per_posting || config.per_posting {
        Some(account.context("--per-posting needs an account to look from")?)
    } else {
        None
    };

    let samples = samples(&transactions, reference);
    let records = config
        .table()
        .records(&samples)
        .context("Failed to extract features")?;

    for record in &records {
        writeln!(out, "{}", serde_json::to_string(record)?)?;
    }
    tracing::info!("Extracted features for {} samples", records.len());

    Ok(())
}
