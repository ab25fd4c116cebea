//! Ledger summary command

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use beanlearn_core::{load_file, Entry};

use super::truncate;

pub fn cmd_stats<W: Write>(ledger: &Path, account: Option<&str>, out: &mut W) -> Result<()> {
    let entries = load_file(ledger)
        .with_context(|| format!("Failed to load ledger: {}", ledger.display()))?;

    let mut kinds: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in &entries {
        *kinds.entry(entry.kind()).or_default() += 1;
    }

    let transactions: Vec<_> = entries
        .iter()
        .filter_map(Entry::as_transaction)
        .filter(|txn| account.map_or(true, |a| txn.touches_account(a)))
        .collect();

    let mut accounts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut payees = BTreeSet::new();
    for txn in &transactions {
        for posting in &txn.postings {
            *accounts.entry(posting.account.as_str()).or_default() += 1;
        }
        if txn.has_payee() {
            payees.insert(txn.payee_or_empty());
        }
    }
    let without_payee = transactions.iter().filter(|t| !t.has_payee()).count();

    writeln!(out, "Ledger: {}", ledger.display())?;
    writeln!(out, "Entries: {}", entries.len())?;
    for (kind, count) in &kinds {
        writeln!(out, "  {:<12} {}", kind, count)?;
    }
    if let Some(account) = account {
        writeln!(out, "Transactions touching {}: {}", account, transactions.len())?;
    } else {
        writeln!(out, "Transactions: {}", transactions.len())?;
    }
    writeln!(out, "Distinct payees: {} ({} without payee)", payees.len(), without_payee)?;
    writeln!(out, "Accounts by postings:")?;

    let mut by_count: Vec<_> = accounts.into_iter().collect();
    by_count.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    for (name, count) in by_count {
        writeln!(out, "  {:<40} {}", truncate(name, 40), count)?;
    }

    Ok(())
}
