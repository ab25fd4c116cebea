//! Transaction annotation
//!
//! Helpers that prepare imported transactions for classification and attach
//! the classifier's suggestions for whoever reviews them next.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{Entry, Posting, Transaction};

/// Metadata key holding the JSON list of suggested accounts
pub const METADATA_KEY_SUGGESTED_ACCOUNTS: &str = "__suggested_accounts__";

/// Metadata key holding the JSON list of suggested payees
pub const METADATA_KEY_SUGGESTED_PAYEES: &str = "__suggested_payees__";

/// Append an empty posting to `account` if the transaction has exactly one
/// posting. The new posting has no amount, so the ledger infers it.
pub fn add_posting_to_transaction(transaction: Transaction, account: &str) -> Transaction {
    if transaction.postings.len() != 1 {
        return transaction;
    }
    transaction.with_posting(Posting::new(account))
}

/// Set the payee, unless one is already present and `overwrite` is false
pub fn add_payee_to_transaction(
    transaction: Transaction,
    payee: &str,
    overwrite: bool,
) -> Transaction {
    if !transaction.has_payee() || overwrite {
        return transaction.with_payee(payee);
    }
    transaction
}

pub fn add_suggested_accounts_to_transaction(
    transaction: Transaction,
    suggestions: &[String],
) -> Result<Transaction> {
    add_suggestions_to_transaction(transaction, suggestions, METADATA_KEY_SUGGESTED_ACCOUNTS)
}

pub fn add_suggested_payees_to_transaction(
    transaction: Transaction,
    suggestions: &[String],
) -> Result<Transaction> {
    add_suggestions_to_transaction(transaction, suggestions, METADATA_KEY_SUGGESTED_PAYEES)
}

/// Store `suggestions` as a JSON-encoded string under `meta[key]`
fn add_suggestions_to_transaction(
    transaction: Transaction,
    suggestions: &[String],
    key: &str,
) -> Result<Transaction> {
    let encoded = serde_json::to_string(suggestions)?;
    Ok(transaction.with_meta_value(key, Value::String(encoded)))
}

/// Read back a suggestion list written by the `add_suggested_*` functions.
///
/// Returns `Ok(None)` when the key is absent.
pub fn suggestions(transaction: &Transaction, key: &str) -> Result<Option<Vec<String>>> {
    match transaction.meta.get(key) {
        None => Ok(None),
        Some(Value::String(encoded)) => Ok(Some(serde_json::from_str(encoded)?)),
        Some(other) => Ok(Some(serde_json::from_value(other.clone())?)),
    }
}

/// Put enhanced transactions back between the non-transaction entries they
/// were imported with.
///
/// `enhanced_transactions` must hold exactly one transaction per transaction
/// entry of `imported_entries`, in the same order.
pub fn merge_non_transaction_entries(
    imported_entries: Vec<Entry>,
    enhanced_transactions: Vec<Transaction>,
) -> Result<Vec<Entry>> {
    let expected = imported_entries.iter().filter(|e| e.is_transaction()).count();
    if expected != enhanced_transactions.len() {
        return Err(Error::EntryCountMismatch {
            expected,
            actual: enhanced_transactions.len(),
        });
    }

    let mut enhanced = enhanced_transactions.into_iter();
    let merged = imported_entries
        .into_iter()
        .map(|entry| match entry {
            Entry::Transaction(_) => enhanced.next().map(Entry::Transaction).unwrap_or(entry),
            other => other,
        })
        .collect();

    Ok(merged)
}
