//! Shared utilities for commands
//!
//! This module contains:
//! - `load_config` - Resolve the feature config
//! - `load_transactions` - Read training transactions from a ledger

use std::path::Path;

use anyhow::{Context, Result};
use beanlearn_core::{load_training_data, FeatureConfig, TrainingData, Transaction};

pub fn load_config(path: Option<&Path>) -> Result<FeatureConfig> {
    match path {
        Some(path) => FeatureConfig::load(Some(path))
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => FeatureConfig::load(None).context("Failed to load config"),
    }
}

/// Load the transactions of `ledger`, optionally only those posting to `account`
pub fn load_transactions(ledger: &Path, account: Option<&str>) -> Result<Vec<Transaction>> {
    load_training_data(Some(TrainingData::from(ledger)), account, None)
        .with_context(|| format!("Failed to load ledger: {}", ledger.display()))
}
