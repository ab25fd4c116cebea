//! Domain models for beanlearn
//!
//! Ledger values are treated as immutable: the `with_*` methods consume a
//! value and hand back the modified copy instead of mutating in place.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Metadata attached to a transaction or posting
pub type Meta = BTreeMap<String, serde_json::Value>;

/// A number with its commodity, e.g. `-12.50 EUR`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub number: Decimal,
    pub currency: String,
}

impl Amount {
    pub fn new(number: Decimal, currency: impl Into<String>) -> Self {
        Self {
            number,
            currency: currency.into(),
        }
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.number, self.currency)
    }
}

/// One account movement within a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub account: String,
    /// None when the amount is left for the ledger to infer
    pub units: Option<Amount>,
    /// Per-unit cost
    pub cost: Option<Amount>,
    /// Per-unit price
    pub price: Option<Amount>,
    pub flag: Option<char>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: Meta,
}

impl Posting {
    /// Posting with only an account; every other field is unset
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            units: None,
            cost: None,
            price: None,
            flag: None,
            meta: Meta::new(),
        }
    }

    pub fn with_units(mut self, units: Amount) -> Self {
        self.units = Some(units);
        self
    }

    /// True when nothing besides the account is set
    pub fn is_placeholder(&self) -> bool {
        self.units.is_none()
            && self.cost.is_none()
            && self.price.is_none()
            && self.flag.is_none()
            && self.meta.is_empty()
    }
}

/// A dated ledger transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub flag: char,
    pub payee: Option<String>,
    pub narration: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
    pub postings: Vec<Posting>,
    #[serde(default)]
    pub meta: Meta,
}

impl Transaction {
    /// A completed (`*`) transaction without payee or postings
    pub fn new(date: NaiveDate, narration: impl Into<String>) -> Self {
        Self {
            date,
            flag: '*',
            payee: None,
            narration: narration.into(),
            tags: Vec::new(),
            links: Vec::new(),
            postings: Vec::new(),
            meta: Meta::new(),
        }
    }

    pub fn with_payee(mut self, payee: impl Into<String>) -> Self {
        self.payee = Some(payee.into());
        self
    }

    pub fn with_posting(mut self, posting: Posting) -> Self {
        self.postings.push(posting);
        self
    }

    pub fn with_meta_value(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    /// Payee, with an empty string standing in for a missing one
    pub fn payee_or_empty(&self) -> &str {
        self.payee.as_deref().unwrap_or("")
    }

    pub fn has_payee(&self) -> bool {
        self.payee.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Whether any posting books to `account`
    pub fn touches_account(&self, account: &str) -> bool {
        self.postings.iter().any(|p| p.account == account)
    }

    pub fn first_posting(&self) -> Option<&Posting> {
        self.postings.first()
    }

    pub fn last_posting(&self) -> Option<&Posting> {
        self.postings.last()
    }
}

/// `open` directive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Open {
    pub date: NaiveDate,
    pub account: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub currencies: Vec<String>,
}

/// `close` directive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Close {
    pub date: NaiveDate,
    pub account: String,
}

/// `balance` assertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub date: NaiveDate,
    pub account: String,
    pub amount: Amount,
}

/// Any other dated directive, kept only so it can be written back in place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherEntry {
    pub date: NaiveDate,
    pub kind: String,
}

/// One record of a ledger file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entry {
    Transaction(Transaction),
    Open(Open),
    Close(Close),
    Balance(Balance),
    Other(OtherEntry),
}

impl Entry {
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Transaction(txn) => txn.date,
            Self::Open(open) => open.date,
            Self::Close(close) => close.date,
            Self::Balance(balance) => balance.date,
            Self::Other(other) => other.date,
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::Transaction(_) => "transaction",
            Self::Open(_) => "open",
            Self::Close(_) => "close",
            Self::Balance(_) => "balance",
            Self::Other(other) => &other.kind,
        }
    }

    pub fn is_transaction(&self) -> bool {
        matches!(self, Self::Transaction(_))
    }

    pub fn as_transaction(&self) -> Option<&Transaction> {
        match self {
            Self::Transaction(txn) => Some(txn),
            _ => None,
        }
    }

    pub fn into_transaction(self) -> Option<Transaction> {
        match self {
            Self::Transaction(txn) => Some(txn),
            _ => None,
        }
    }
}

impl From<Transaction> for Entry {
    fn from(txn: Transaction) -> Self {
        Self::Transaction(txn)
    }
}

/// A single posting of a transaction, paired with the account the
/// transaction is being looked at from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxnPostingAccount {
    pub txn: Transaction,
    pub posting: Posting,
    /// Reference account
    pub account: String,
}

impl TxnPostingAccount {
    pub fn new(txn: Transaction, posting: Posting, account: impl Into<String>) -> Self {
        Self {
            txn,
            posting,
            account: account.into(),
        }
    }

    /// One triple per posting of `txn`, all sharing the reference `account`
    pub fn expand(txn: &Transaction, account: &str) -> Vec<Self> {
        txn.postings
            .iter()
            .map(|posting| Self::new(txn.clone(), posting.clone(), account))
            .collect()
    }
}
