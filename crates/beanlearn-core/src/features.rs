//! Feature extraction
//!
//! Each extractor projects a sample onto one scalar. Samples are either whole
//! transactions or single postings seen from a reference account; both shapes
//! are covered by [`Sample`], so every extractor handles every input.
//!
//! Extractors have no fitted state. `transform` maps samples one-to-one,
//! keeping order and length.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Transaction, TxnPostingAccount};

/// Unit of analysis for the extractors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sample {
    PostingAccount(TxnPostingAccount),
    Transaction(Transaction),
}

impl Sample {
    /// The transaction this sample belongs to
    pub fn transaction(&self) -> &Transaction {
        match self {
            Self::Transaction(txn) => txn,
            Self::PostingAccount(tpa) => &tpa.txn,
        }
    }
}

impl From<Transaction> for Sample {
    fn from(txn: Transaction) -> Self {
        Self::Transaction(txn)
    }
}

impl From<TxnPostingAccount> for Sample {
    fn from(tpa: TxnPostingAccount) -> Self {
        Self::PostingAccount(tpa)
    }
}

/// A single extracted value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Text(String),
    Number(u32),
}

impl From<String> for FeatureValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<u32> for FeatureValue {
    fn from(n: u32) -> Self {
        Self::Number(n)
    }
}

impl std::fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Projection of a sample onto one feature
pub trait FeatureExtractor {
    type Output: Into<FeatureValue>;

    fn name(&self) -> &'static str;

    fn extract(&self, sample: &Sample) -> Result<Self::Output>;

    /// Extract from every sample; output[i] comes from samples[i]
    fn transform(&self, samples: &[Sample]) -> Result<Vec<Self::Output>> {
        samples.iter().map(|sample| self.extract(sample)).collect()
    }
}

/// Payee, or `""` when there is none
#[derive(Debug, Clone, Copy, Default)]
pub struct GetPayee;

impl FeatureExtractor for GetPayee {
    type Output = String;

    fn name(&self) -> &'static str {
        "payee"
    }

    fn extract(&self, sample: &Sample) -> Result<String> {
        Ok(sample.transaction().payee_or_empty().to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GetNarration;

impl FeatureExtractor for GetNarration {
    type Output = String;

    fn name(&self) -> &'static str {
        "narration"
    }

    fn extract(&self, sample: &Sample) -> Result<String> {
        Ok(sample.transaction().narration.clone())
    }
}

/// Account of the last posting of a transaction, or of the posting of a
/// [`TxnPostingAccount`]
#[derive(Debug, Clone, Copy, Default)]
pub struct GetPostingAccount;

impl FeatureExtractor for GetPostingAccount {
    type Output = String;

    fn name(&self) -> &'static str {
        "posting_account"
    }

    fn extract(&self, sample: &Sample) -> Result<String> {
        match sample {
            Sample::Transaction(txn) => txn
                .last_posting()
                .map(|p| p.account.clone())
                .ok_or(Error::MissingPosting(txn.date)),
            Sample::PostingAccount(tpa) => Ok(tpa.posting.account.clone()),
        }
    }
}

/// Account of the first posting of a transaction, or the reference account
/// of a [`TxnPostingAccount`]
#[derive(Debug, Clone, Copy, Default)]
pub struct GetReferencePostingAccount;

impl FeatureExtractor for GetReferencePostingAccount {
    type Output = String;

    fn name(&self) -> &'static str {
        "reference_account"
    }

    fn extract(&self, sample: &Sample) -> Result<String> {
        match sample {
            Sample::Transaction(txn) => txn
                .first_posting()
                .map(|p| p.account.clone())
                .ok_or(Error::MissingPosting(txn.date)),
            Sample::PostingAccount(tpa) => Ok(tpa.account.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GetDayOfMonth;

impl FeatureExtractor for GetDayOfMonth {
    type Output = u32;

    fn name(&self) -> &'static str {
        "day_of_month"
    }

    fn extract(&self, sample: &Sample) -> Result<u32> {
        use chrono::Datelike;
        Ok(sample.transaction().date.day())
    }
}

/// Extractor selectable by name, e.g. from config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Payee,
    Narration,
    PostingAccount,
    ReferenceAccount,
    DayOfMonth,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Payee => GetPayee.name(),
            Self::Narration => GetNarration.name(),
            Self::PostingAccount => GetPostingAccount.name(),
            Self::ReferenceAccount => GetReferencePostingAccount.name(),
            Self::DayOfMonth => GetDayOfMonth.name(),
        }
    }

    pub fn all() -> &'static [Feature] {
        &[
            Self::Payee,
            Self::Narration,
            Self::PostingAccount,
            Self::ReferenceAccount,
            Self::DayOfMonth,
        ]
    }

    pub fn extract(&self, sample: &Sample) -> Result<FeatureValue> {
        Ok(match self {
            Self::Payee => GetPayee.extract(sample)?.into(),
            Self::Narration => GetNarration.extract(sample)?.into(),
            Self::PostingAccount => GetPostingAccount.extract(sample)?.into(),
            Self::ReferenceAccount => GetReferencePostingAccount.extract(sample)?.into(),
            Self::DayOfMonth => GetDayOfMonth.extract(sample)?.into(),
        })
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Feature::all()
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("Unknown feature: {}", s))
    }
}

/// Several features stacked column-wise, one row per sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureTable {
    columns: Vec<Feature>,
}

impl FeatureTable {
    pub fn new(columns: Vec<Feature>) -> Self {
        Self { columns }
    }

    /// Column names in order
    pub fn header(&self) -> Vec<&'static str> {
        self.columns.iter().map(Feature::as_str).collect()
    }

    /// One value per column for a single sample
    pub fn row(&self, sample: &Sample) -> Result<Vec<FeatureValue>> {
        self.columns.iter().map(|c| c.extract(sample)).collect()
    }

    pub fn transform(&self, samples: &[Sample]) -> Result<Vec<Vec<FeatureValue>>> {
        samples.iter().map(|sample| self.row(sample)).collect()
    }

    /// Rows as JSON objects keyed by column name
    pub fn records(&self, samples: &[Sample]) -> Result<Vec<serde_json::Value>> {
        let header = self.header();
        self.transform(samples)?
            .into_iter()
            .map(|row| {
                let map = header
                    .iter()
                    .zip(row)
                    .map(|(name, value)| Ok((name.to_string(), serde_json::to_value(value)?)))
                    .collect::<Result<serde_json::Map<_, _>>>()?;
                Ok(serde_json::Value::Object(map))
            })
            .collect()
    }
}

impl Default for FeatureTable {
    fn default() -> Self {
        Self::new(Feature::all().to_vec())
    }
}

/// Turn transactions into samples, either whole or one per posting seen from
/// `reference_account`
pub fn samples(
    transactions: &[Transaction],
    per_posting: Option<&str>,
) -> Vec<Sample> {
    match per_posting {
        None => transactions.iter().cloned().map(Sample::from).collect(),
        Some(reference_account) => transactions
            .iter()
            .flat_map(|txn| TxnPostingAccount::expand(txn, reference_account))
            .map(Sample::from)
            .collect(),
    }
}
