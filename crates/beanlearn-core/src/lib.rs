//! beanlearn Core Library
//!
//! Shared functionality for preparing beancount ledgers for account and
//! payee classifiers:
//! - Training corpus loading from entry lists or beancount files
//! - Transaction annotation (inferred postings, payees, suggestion metadata)
//! - Re-merging annotated transactions with the entries they came with
//! - Feature extractors over transactions and single postings
//! - Labelled training data export (JSON Lines, CSV)

pub mod annotate;
pub mod config;
pub mod error;
pub mod features;
pub mod loader;
pub mod models;
pub mod training;

pub use annotate::{
    add_payee_to_transaction, add_posting_to_transaction, add_suggested_accounts_to_transaction,
    add_suggested_payees_to_transaction, merge_non_transaction_entries, suggestions,
    METADATA_KEY_SUGGESTED_ACCOUNTS, METADATA_KEY_SUGGESTED_PAYEES,
};
pub use config::FeatureConfig;
pub use error::{Error, Result};
pub use features::{
    Feature, FeatureExtractor, FeatureTable, FeatureValue, GetDayOfMonth, GetNarration, GetPayee,
    GetPostingAccount, GetReferencePostingAccount, Sample,
};
pub use loader::{filter_txns, load_file, load_training_data, parse_str, TrainingData};
pub use models::{Amount, Entry, Meta, Posting, Transaction, TxnPostingAccount};
pub use training::{TrainingDataGenerator, TrainingExample, TrainingExportStats, TrainingTarget};
