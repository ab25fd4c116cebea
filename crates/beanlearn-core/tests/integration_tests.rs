//! Integration tests for beanlearn-core
//!
//! These tests exercise the full load → annotate → merge → featurize workflow.

use std::io::Write;

use beanlearn_core::{
    add_payee_to_transaction, add_posting_to_transaction, add_suggested_accounts_to_transaction,
    load_file, load_training_data, merge_non_transaction_entries, suggestions, Entry, Feature,
    FeatureConfig, FeatureExtractor, FeatureTable, FeatureValue, GetDayOfMonth, GetPayee,
    GetPostingAccount, Sample, TrainingData, TrainingDataGenerator, TrainingTarget,
    METADATA_KEY_SUGGESTED_ACCOUNTS,
};

/// Historical ledger: two months of checking account activity
fn training_ledger() -> &'static str {
    r#"
2024-01-01 open Assets:Checking EUR
2024-01-01 open Assets:Cash EUR
2024-01-01 open Expenses:Groceries
2024-01-01 open Expenses:Rent
2024-01-01 open Income:Salary

2024-01-01 * "Landlord" "January rent"
  Assets:Checking  -900.00 EUR
  Expenses:Rent

2024-01-05 * "Grocer" "Weekly shop"
  Assets:Checking   -54.10 EUR
  Expenses:Groceries

2024-01-25 * "Employer" "Salary"
  Assets:Checking  2500.00 EUR
  Income:Salary

2024-01-28 * "Market" "Farmers market"
  Assets:Cash       -12.00 EUR
  Expenses:Groceries

2024-02-01 * "Landlord" "February rent"
  Assets:Checking  -900.00 EUR
  Expenses:Rent
"#
}

/// Freshly imported statement lines: one posting each, plus a balance
fn imported_ledger() -> &'static str {
    r#"
2024-03-01 * "Landlord" "March rent"
  Assets:Checking  -900.00 EUR

2024-03-02 balance Assets:Checking 1645.90 EUR

2024-03-06 * "Weekly shop"
  Assets:Checking   -61.30 EUR
"#
}

fn write_ledger(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp ledger");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp ledger");
    file
}

#[test]
fn test_load_training_data_from_file_with_account_filter() {
    let ledger = write_ledger(training_ledger());

    let all = load_training_data(Some(TrainingData::from(ledger.path())), None, None)
        .expect("Failed to load ledger");
    assert_eq!(all.len(), 5);

    let checking = load_training_data(
        Some(TrainingData::from(ledger.path())),
        Some("Assets:Checking"),
        None,
    )
    .unwrap();
    assert_eq!(checking.len(), 4);
    assert!(checking
        .iter()
        .all(|t| t.postings.iter().any(|p| p.account == "Assets:Checking")));
}

#[test]
fn test_existing_entries_fallback_matches_file() {
    let ledger = write_ledger(training_ledger());
    let existing = load_file(ledger.path()).unwrap();

    let from_existing =
        load_training_data(None, Some("Assets:Cash"), Some(existing.as_slice())).unwrap();
    assert_eq!(from_existing.len(), 1);
    assert_eq!(from_existing[0].narration, "Farmers market");
}

#[test]
fn test_annotate_and_merge_imported_entries() {
    let imported = load_file(write_ledger(imported_ledger()).path()).unwrap();
    assert_eq!(imported.len(), 3);

    let enhanced: Vec<_> = imported
        .iter()
        .filter_map(Entry::as_transaction)
        .cloned()
        .map(|txn| add_posting_to_transaction(txn, "Expenses:Groceries"))
        .map(|txn| add_payee_to_transaction(txn, "Grocer", false))
        .map(|txn| {
            add_suggested_accounts_to_transaction(
                txn,
                &["Expenses:Groceries".to_string(), "Expenses:Rent".to_string()],
            )
            .unwrap()
        })
        .collect();

    let merged = merge_non_transaction_entries(imported.clone(), enhanced).unwrap();
    assert_eq!(merged.len(), imported.len());
    assert_eq!(merged[1], imported[1]);

    let rent = merged[0].as_transaction().unwrap();
    assert_eq!(rent.payee.as_deref(), Some("Landlord"));
    assert_eq!(rent.postings.len(), 2);
    assert_eq!(rent.postings[1].account, "Expenses:Groceries");
    assert!(rent.postings[1].units.is_none());

    let shop = merged[2].as_transaction().unwrap();
    assert_eq!(shop.payee.as_deref(), Some("Grocer"));
    assert_eq!(
        suggestions(shop, METADATA_KEY_SUGGESTED_ACCOUNTS).unwrap(),
        Some(vec![
            "Expenses:Groceries".to_string(),
            "Expenses:Rent".to_string()
        ])
    );
}

#[test]
fn test_extractors_over_loaded_transactions() {
    let ledger = write_ledger(training_ledger());
    let txns = load_training_data(Some(ledger.path().into()), None, None).unwrap();
    let samples: Vec<Sample> = txns.into_iter().map(Sample::from).collect();

    let payees = GetPayee.transform(&samples).unwrap();
    let accounts = GetPostingAccount.transform(&samples).unwrap();
    let days = GetDayOfMonth.transform(&samples).unwrap();

    assert_eq!(payees.len(), samples.len());
    assert_eq!(payees[0], "Landlord");
    assert_eq!(accounts[1], "Expenses:Groceries");
    assert_eq!(days, vec![1, 5, 25, 28, 1]);

    let table = FeatureTable::new(vec![Feature::ReferenceAccount, Feature::DayOfMonth]);
    let rows = table.transform(&samples).unwrap();
    assert_eq!(
        rows[3],
        vec![
            FeatureValue::Text("Assets:Cash".to_string()),
            FeatureValue::Number(28)
        ]
    );
}

#[test]
fn test_training_export_from_ledger() {
    let ledger = write_ledger(training_ledger());
    let config = FeatureConfig {
        known_account: Some("Assets:Checking".to_string()),
        target: TrainingTarget::Account,
        features: vec![Feature::Payee, Feature::Narration],
        per_posting: false,
    };

    let txns = load_training_data(
        Some(ledger.path().into()),
        config.known_account.as_deref(),
        None,
    )
    .unwrap();

    let generator = TrainingDataGenerator::new(&config).unwrap();
    let mut output = Vec::new();
    let stats = generator.export_jsonl(&txns, &mut output).unwrap();

    assert_eq!(stats.total_examples, 4);
    assert_eq!(stats.unique_labels, 3);
    assert_eq!(stats.skipped, 0);
    assert_eq!(String::from_utf8(output).unwrap().lines().count(), 4);
}
