//! Annotation of imported transactions

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use beanlearn_core::{
    add_payee_to_transaction, add_posting_to_transaction, load_file,
    merge_non_transaction_entries, Entry,
};

/// Give single-posting transactions an inferred counter posting on
/// `account`, optionally set payees, and print every entry as JSON Lines
pub fn cmd_annotate<W: Write>(
    ledger: &Path,
    account: &str,
    payee: Option<&str>,
    overwrite: bool,
    out: &mut W,
) -> Result<()> {
    let entries = load_file(ledger)
        .with_context(|| format!("Failed to load ledger: {}", ledger.display()))?;

    let mut normalized = 0;
    let enhanced: Vec<_> = entries
        .iter()
        .filter_map(Entry::as_transaction)
        .cloned()
        .map(|txn| {
            let before = txn.postings.len();
            let txn = add_posting_to_transaction(txn, account);
            if txn.postings.len() != before {
                normalized += 1;
            }
            match payee {
                Some(payee) => add_payee_to_transaction(txn, payee, overwrite),
                None => txn,
            }
        })
        .collect();

    let merged = merge_non_transaction_entries(entries, enhanced)
        .context("Failed to merge annotated transactions")?;

    for entry in &merged {
        writeln!(out, "{}", serde_json::to_string(entry)?)?;
    }
    tracing::info!(
        "Added {} inferred postings to {} ({} entries)",
        normalized,
        account,
        merged.len()
    );

    Ok(())
}
