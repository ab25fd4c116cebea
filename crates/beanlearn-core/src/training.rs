//! Training data generation for account and payee classifiers
//!
//! Turns historical transactions into labelled feature rows and writes them
//! as JSON Lines or CSV for an external trainer.

use std::collections::HashSet;
use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::FeatureConfig;
use crate::error::{Error, Result};
use crate::features::{
    samples, Feature, FeatureExtractor, FeatureTable, FeatureValue, GetPostingAccount, Sample,
};
use crate::models::Transaction;

/// What a classifier is trained to predict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingTarget {
    /// The counter account of the transaction
    Account,
    /// The payee of the transaction
    Payee,
}

impl TrainingTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingTarget::Account => "account",
            TrainingTarget::Payee => "payee",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![TrainingTarget::Account, TrainingTarget::Payee]
    }
}

impl std::fmt::Display for TrainingTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TrainingTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "account" => Ok(TrainingTarget::Account),
            "payee" => Ok(TrainingTarget::Payee),
            _ => Err(format!("Unknown training target: {}", s)),
        }
    }
}

/// A single labelled feature row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    /// Values in feature table column order
    pub features: Vec<FeatureValue>,
    pub label: String,
}

/// Statistics about exported training data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExportStats {
    pub target: String,
    pub total_examples: usize,
    pub unique_labels: usize,
    /// Samples without a usable label or feature
    pub skipped: usize,
}

/// Training data generator
pub struct TrainingDataGenerator {
    table: FeatureTable,
    target: TrainingTarget,
    per_posting: Option<String>,
}

impl TrainingDataGenerator {
    /// Fails when per-posting samples are requested without a known account
    /// to look from.
    pub fn new(config: &FeatureConfig) -> Result<Self> {
        if config.per_posting && config.per_posting_account().is_none() {
            return Err(Error::Config(
                "per_posting requires known_account to be set".into(),
            ));
        }
        if config.target == TrainingTarget::Account
            && config.features.contains(&Feature::PostingAccount)
        {
            warn!("posting_account is both a feature and the training label");
        }
        Ok(Self {
            table: config.table(),
            target: config.target,
            per_posting: config.per_posting_account().map(str::to_string),
        })
    }

    /// Generate labelled examples, skipping samples that have no label
    pub fn generate(&self, transactions: &[Transaction]) -> Result<Vec<TrainingExample>> {
        Ok(self.collect(transactions)?.0)
    }

    fn collect(&self, transactions: &[Transaction]) -> Result<(Vec<TrainingExample>, usize)> {
        let samples = samples(transactions, self.per_posting.as_deref());
        let mut examples = Vec::with_capacity(samples.len());
        let mut skipped = 0;

        for sample in &samples {
            let Some(label) = self.label(sample)? else {
                skipped += 1;
                continue;
            };
            match self.table.row(sample) {
                Ok(features) => examples.push(TrainingExample { features, label }),
                Err(Error::MissingPosting(date)) => {
                    debug!("Skipping transaction on {} without postings", date);
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if skipped > 0 {
            warn!(
                "Skipped {} of {} samples without a usable {}",
                skipped,
                samples.len(),
                self.target
            );
        }

        Ok((examples, skipped))
    }

    fn label(&self, sample: &Sample) -> Result<Option<String>> {
        match self.target {
            TrainingTarget::Account => match GetPostingAccount.extract(sample) {
                Ok(account) => Ok(Some(account)),
                Err(Error::MissingPosting(_)) => Ok(None),
                Err(e) => Err(e),
            },
            TrainingTarget::Payee => {
                let txn = sample.transaction();
                Ok(txn.has_payee().then(|| txn.payee_or_empty().to_string()))
            }
        }
    }

    fn stats(&self, examples: &[TrainingExample], skipped: usize) -> TrainingExportStats {
        let unique_labels: HashSet<&str> = examples.iter().map(|e| e.label.as_str()).collect();
        TrainingExportStats {
            target: self.target.to_string(),
            total_examples: examples.len(),
            unique_labels: unique_labels.len(),
            skipped,
        }
    }

    /// Export training data as one JSON object per line
    pub fn export_jsonl<W: Write>(
        &self,
        transactions: &[Transaction],
        writer: &mut W,
    ) -> Result<TrainingExportStats> {
        let (examples, skipped) = self.collect(transactions)?;
        let header = self.table.header();

        for example in &examples {
            let mut record = serde_json::Map::new();
            for (name, value) in header.iter().zip(&example.features) {
                record.insert(name.to_string(), serde_json::to_value(value)?);
            }
            record.insert("label".to_string(), example.label.clone().into());

            let json = serde_json::to_string(&record)?;
            writeln!(writer, "{}", json)?;
        }

        Ok(self.stats(&examples, skipped))
    }

    /// Export training data as CSV with a header row
    pub fn export_csv<W: Write>(
        &self,
        transactions: &[Transaction],
        writer: W,
    ) -> Result<TrainingExportStats> {
        let (examples, skipped) = self.collect(transactions)?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = self.table.header();
        header.push("label");
        csv_writer.write_record(&header)?;

        for example in &examples {
            let mut record: Vec<String> = example.features.iter().map(|v| v.to_string()).collect();
            record.push(example.label.clone());
            csv_writer.write_record(&record)?;
        }
        csv_writer.flush()?;

        Ok(self.stats(&examples, skipped))
    }
}
