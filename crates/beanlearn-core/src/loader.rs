//! Training corpus loading
//!
//! Historical transactions come from one of three places: an explicit list of
//! entries, a beancount file, or the entries of the ledger currently being
//! imported into (used when nothing else was given).

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use beancount_parser::metadata::Value as MetadataValue;
use beancount_parser::{DirectiveContent, PostingPrice};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Amount, Balance, Close, Entry, Meta, Open, OtherEntry, Posting, Transaction};

type Directive = beancount_parser::Directive<Decimal>;

/// Where training data is read from
#[derive(Debug, Clone)]
pub enum TrainingData {
    /// Entries already in memory
    Entries(Vec<Entry>),
    /// A beancount file on disk
    File(PathBuf),
}

impl TrainingData {
    /// An empty list or an empty path counts as "nothing given"
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Entries(entries) => entries.is_empty(),
            Self::File(path) => path.as_os_str().is_empty(),
        }
    }
}

impl From<Vec<Entry>> for TrainingData {
    fn from(entries: Vec<Entry>) -> Self {
        Self::Entries(entries)
    }
}

impl From<PathBuf> for TrainingData {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<&Path> for TrainingData {
    fn from(path: &Path) -> Self {
        Self::File(path.to_path_buf())
    }
}

/// Load training data, keeping only transactions.
///
/// Falls back to `existing_entries` when `training_data` is absent or empty.
/// With `known_account`, only transactions posting to that account are kept.
pub fn load_training_data(
    training_data: Option<TrainingData>,
    known_account: Option<&str>,
    existing_entries: Option<&[Entry]>,
) -> Result<Vec<Transaction>> {
    let given = training_data.filter(|data| !data.is_empty());
    let existing = existing_entries.filter(|entries| !entries.is_empty());

    let entries = match (given, existing) {
        (None, Some(existing)) => {
            debug!("Using existing entries for training data");
            existing.to_vec()
        }
        (Some(TrainingData::File(path)), _) => {
            debug!("Reading training data from file \"{}\".", path.display());
            load_file(&path)?
        }
        (Some(TrainingData::Entries(entries)), _) => entries,
        (None, None) => Vec::new(),
    };
    debug!("Finished reading training data.");

    let mut transactions = filter_txns(entries);

    if let Some(account) = known_account.filter(|a| !a.is_empty()) {
        transactions.retain(|txn| txn.touches_account(account));
        debug!(
            "After filtering for account {}, the training data consists of {} entries.",
            account,
            transactions.len()
        );
    }

    Ok(transactions)
}

/// Keep only the transactions, in their original order
pub fn filter_txns(entries: impl IntoIterator<Item = Entry>) -> Vec<Transaction> {
    entries
        .into_iter()
        .filter_map(Entry::into_transaction)
        .collect()
}

/// Parse a beancount file, following its `include` directives.
///
/// Include paths are resolved relative to the file that names them. Each
/// transaction's `filename` meta is the file it was read from.
pub fn load_file(path: &Path) -> Result<Vec<Entry>> {
    if !path.exists() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("ledger file not found: {}", path.display()),
        )));
    }

    let mut entries = Vec::new();
    let mut visited = HashSet::new();
    load_file_into(path, &mut visited, &mut entries)?;

    debug!(
        "Loaded {} entries from {} ({} files)",
        entries.len(),
        path.display(),
        visited.len()
    );
    Ok(entries)
}

fn load_file_into(
    path: &Path,
    visited: &mut HashSet<PathBuf>,
    entries: &mut Vec<Entry>,
) -> Result<()> {
    // Include cycles are read once
    if !visited.insert(fs::canonicalize(path)?) {
        return Ok(());
    }

    let source = fs::read_to_string(path)?;
    let file = beancount_parser::parse::<Decimal>(&source)
        .map_err(|e| Error::Ledger(format!("{}: {}", path.display(), e)))?;

    let filename = path.display().to_string();
    for directive in file.directives {
        entries.push(convert_directive(directive, Some(&filename))?);
    }

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let mut includes: Vec<PathBuf> = file.includes.into_iter().collect();
    includes.sort();
    for include in includes {
        debug!("Following include {}", include.display());
        load_file_into(&base.join(include), visited, entries)?;
    }

    Ok(())
}

/// Parse beancount source held in memory. `include` directives are ignored.
pub fn parse_str(source: &str) -> Result<Vec<Entry>> {
    let file = beancount_parser::parse::<Decimal>(source)
        .map_err(|e| Error::Ledger(e.to_string()))?;

    file.directives
        .into_iter()
        .map(|directive| convert_directive(directive, None))
        .collect()
}

fn convert_directive(directive: Directive, filename: Option<&str>) -> Result<Entry> {
    let date = convert_date(&directive.date)?;

    let entry = match directive.content {
        DirectiveContent::Transaction(txn) => {
            let mut meta = convert_meta(directive.metadata);
            if let Some(filename) = filename {
                meta.insert("filename".to_string(), json!(filename));
            }
            meta.insert("lineno".to_string(), json!(directive.line_number));

            let mut tags: Vec<String> = txn
                .tags
                .iter()
                .map(|tag| tag.to_string().trim_start_matches('#').to_string())
                .collect();
            tags.sort();
            let mut links: Vec<String> = txn
                .links
                .iter()
                .map(|link| link.to_string().trim_start_matches('^').to_string())
                .collect();
            links.sort();

            Entry::Transaction(Transaction {
                date,
                flag: txn.flag.unwrap_or('*'),
                payee: txn.payee,
                narration: txn.narration.unwrap_or_default(),
                tags,
                links,
                postings: txn.postings.into_iter().map(convert_posting).collect(),
                meta,
            })
        }
        DirectiveContent::Open(open) => {
            let mut currencies: Vec<String> =
                open.currencies.iter().map(|c| c.to_string()).collect();
            currencies.sort();
            Entry::Open(Open {
                date,
                account: open.account.to_string(),
                currencies,
            })
        }
        DirectiveContent::Close(close) => Entry::Close(Close {
            date,
            account: close.account.to_string(),
        }),
        DirectiveContent::Balance(balance) => Entry::Balance(Balance {
            date,
            account: balance.account.to_string(),
            amount: convert_amount(balance.amount),
        }),
        other => Entry::Other(OtherEntry {
            date,
            kind: other_kind(&other).to_string(),
        }),
    };

    Ok(entry)
}

fn other_kind(content: &DirectiveContent<Decimal>) -> &'static str {
    match content {
        DirectiveContent::Price(_) => "price",
        DirectiveContent::Pad(_) => "pad",
        DirectiveContent::Commodity(_) => "commodity",
        DirectiveContent::Event(_) => "event",
        _ => "other",
    }
}

fn convert_posting(posting: beancount_parser::Posting<Decimal>) -> Posting {
    let units = posting.amount.map(convert_amount);

    // `@@` totals are stored per unit, like a `@` price
    let price = posting.price.map(|price| match price {
        PostingPrice::Unit(amount) => convert_amount(amount),
        PostingPrice::Total(amount) => {
            let total = convert_amount(amount);
            match &units {
                Some(units) if !units.number.is_zero() => {
                    Amount::new(total.number / units.number.abs(), total.currency)
                }
                _ => total,
            }
        }
    });

    Posting {
        account: posting.account.to_string(),
        units,
        cost: posting.cost.and_then(|cost| cost.amount).map(convert_amount),
        price,
        flag: posting.flag,
        meta: convert_meta(posting.metadata),
    }
}

fn convert_amount(amount: beancount_parser::Amount<Decimal>) -> Amount {
    Amount::new(amount.value, amount.currency.to_string())
}

fn convert_meta<K: ToString>(
    metadata: impl IntoIterator<Item = (K, MetadataValue<Decimal>)>,
) -> Meta {
    metadata
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                MetadataValue::String(s) => json!(s),
                MetadataValue::Number(n) => n
                    .to_string()
                    .parse::<serde_json::Number>()
                    .map(serde_json::Value::Number)
                    .unwrap_or_else(|_| json!(n.to_string())),
                MetadataValue::Currency(c) => json!(c.to_string()),
                #[allow(unreachable_patterns)]
                _ => serde_json::Value::Null,
            };
            (key.to_string(), value)
        })
        .collect()
}

fn convert_date(date: &beancount_parser::Date) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year.into(), date.month.into(), date.day.into()).ok_or_else(
        || {
            Error::Ledger(format!(
                "invalid date {}-{:02}-{:02}",
                date.year, date.month, date.day
            ))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LEDGER: &str = r#"
2020-01-01 open Assets:Bank EUR
2020-01-01 open Expenses:Food
2020-01-01 open Expenses:Rent

2024-03-01 * "Landlord" "March rent"
  Assets:Bank     -800.00 EUR
  Expenses:Rent

2024-03-15 * "Coffee"
  Assets:Bank       -3.20 EUR
  Expenses:Food

2024-03-31 balance Assets:Bank -803.20 EUR
"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn txn(narration: &str, accounts: &[&str]) -> Transaction {
        accounts.iter().fold(
            Transaction::new(date(2024, 1, 1), narration),
            |txn, account| txn.with_posting(Posting::new(*account)),
        )
    }

    fn open(account: &str) -> Entry {
        Entry::Open(Open {
            date: date(2020, 1, 1),
            account: account.to_string(),
            currencies: Vec::new(),
        })
    }

    #[test]
    fn test_parse_str_converts_directives() {
        let entries = parse_str(LEDGER).unwrap();
        let kinds: Vec<&str> = entries.iter().map(Entry::kind).collect();
        assert_eq!(
            kinds,
            vec!["open", "open", "open", "transaction", "transaction", "balance"]
        );

        let rent = entries[3].as_transaction().unwrap();
        assert_eq!(rent.date, date(2024, 3, 1));
        assert_eq!(rent.payee.as_deref(), Some("Landlord"));
        assert_eq!(rent.narration, "March rent");
        assert_eq!(rent.postings.len(), 2);
        assert_eq!(rent.postings[0].account, "Assets:Bank");
        assert_eq!(
            rent.postings[0].units,
            Some(Amount::new("-800.00".parse().unwrap(), "EUR"))
        );
        assert!(rent.postings[1].units.is_none());

        let coffee = entries[4].as_transaction().unwrap();
        assert_eq!(coffee.payee, None);
        assert_eq!(coffee.narration, "Coffee");
        assert!(coffee.meta.contains_key("lineno"));
        assert!(!coffee.meta.contains_key("filename"));
    }

    #[test]
    fn test_load_file_sets_filename() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LEDGER.as_bytes()).unwrap();

        let entries = load_file(file.path()).unwrap();
        assert_eq!(entries.len(), 6);

        let txn = entries[3].as_transaction().unwrap();
        assert_eq!(txn.meta["filename"], json!(file.path().display().to_string()));
    }

    #[test]
    fn test_load_file_missing() {
        let result = load_file(Path::new("/nonexistent/ledger.beancount"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_parse_str_keeps_tags_cost_price_and_meta() {
        let entries = parse_str(
            r#"
2024-02-01 * "Broker" "Buy shares" #invest ^trade-1
  source: "import"
  Assets:Stock      2 ABC {10.00 EUR} @ 11.00 EUR
    lot: "first"
  Assets:Bank  -20.00 EUR

2024-02-02 * "Broker" "Sell shares"
  Assets:Stock     -2 ABC {10.00 EUR} @@ 30.00 EUR
  Assets:Bank   30.00 EUR
"#,
        )
        .unwrap();

        let buy = entries[0].as_transaction().unwrap();
        assert_eq!(buy.tags, vec!["invest"]);
        assert_eq!(buy.links, vec!["trade-1"]);
        assert_eq!(buy.meta["source"], json!("import"));
        assert!(buy.meta.contains_key("lineno"));

        let stock = &buy.postings[0];
        assert_eq!(stock.cost, Some(Amount::new("10.00".parse().unwrap(), "EUR")));
        assert_eq!(stock.price, Some(Amount::new("11.00".parse().unwrap(), "EUR")));
        assert_eq!(stock.meta["lot"], json!("first"));
        assert!(buy.postings[1].cost.is_none());
        assert!(buy.postings[1].meta.is_empty());

        let sell = entries[1].as_transaction().unwrap();
        assert!(sell.tags.is_empty());
        assert_eq!(
            sell.postings[0].price,
            Some(Amount::new("15".parse().unwrap(), "EUR"))
        );
    }

    #[test]
    fn test_load_file_follows_includes() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("main.beancount");
        let sub = dir.path().join("sub.beancount");
        std::fs::write(
            &main,
            "include \"sub.beancount\"\n\n2024-01-01 * \"Main\"\n  Assets:Bank  -1.00 EUR\n  Expenses:Food\n",
        )
        .unwrap();
        std::fs::write(
            &sub,
            "2024-01-02 open Assets:Bank\n\n2024-01-03 * \"Sub\"\n  Assets:Bank  -2.00 EUR\n  Expenses:Food\n",
        )
        .unwrap();

        let entries = load_file(&main).unwrap();
        assert_eq!(entries.len(), 3);

        let txns = filter_txns(entries);
        let find = |narration: &str| {
            txns.iter()
                .find(|t| t.narration == narration)
                .unwrap()
                .clone()
        };

        let from_main = find("Main");
        assert_eq!(from_main.meta["filename"], json!(main.display().to_string()));
        assert_eq!(from_main.meta["lineno"], json!(3));

        let from_sub = find("Sub");
        assert_eq!(from_sub.meta["filename"], json!(sub.display().to_string()));
        assert_eq!(from_sub.meta["lineno"], json!(3));
    }

    #[test]
    fn test_load_file_include_cycle_read_once() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.beancount");
        std::fs::write(&a, "include \"b.beancount\"\n2024-01-01 open Assets:A\n").unwrap();
        std::fs::write(
            dir.path().join("b.beancount"),
            "include \"a.beancount\"\n2024-01-01 open Assets:B\n",
        )
        .unwrap();

        let entries = load_file(&a).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_load_file_missing_include_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("main.beancount");
        std::fs::write(&main, "include \"missing.beancount\"\n").unwrap();

        assert!(matches!(load_file(&main), Err(Error::Io(_))));
    }

    #[test]
    fn test_load_file_syntax_error_is_ledger_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"2024-13-45 open Assets:Bank\n").unwrap();

        assert!(matches!(load_file(file.path()), Err(Error::Ledger(_))));
    }

    #[test]
    fn test_filter_txns_keeps_order() {
        let entries = vec![
            open("Assets:Bank"),
            txn("a", &["Assets:Bank"]).into(),
            open("Expenses:Food"),
            txn("b", &["Expenses:Food"]).into(),
        ];
        let txns = filter_txns(entries);
        let narrations: Vec<&str> = txns.iter().map(|t| t.narration.as_str()).collect();
        assert_eq!(narrations, vec!["a", "b"]);
    }

    #[test]
    fn test_explicit_entries_are_filtered_to_transactions() {
        let entries = vec![
            open("Assets:Bank"),
            txn("a", &["Assets:Bank", "Expenses:Food"]).into(),
            txn("b", &["Assets:Cash", "Expenses:Food"]).into(),
        ];
        let txns = load_training_data(Some(entries.into()), None, None).unwrap();
        assert_eq!(txns.len(), 2);
    }

    #[test]
    fn test_known_account_filter() {
        let entries = vec![
            txn("a", &["Assets:Bank", "Expenses:Food"]).into(),
            txn("b", &["Assets:Cash", "Expenses:Food"]).into(),
            txn("c", &["Assets:Bank:Savings", "Income:Interest"]).into(),
        ];
        let txns = load_training_data(Some(entries.into()), Some("Assets:Bank"), None).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].narration, "a");
        assert!(txns.iter().all(|t| t.touches_account("Assets:Bank")));
    }

    #[test]
    fn test_empty_known_account_does_not_filter() {
        let entries = vec![txn("a", &["Assets:Bank"]).into()];
        let txns = load_training_data(Some(entries.into()), Some(""), None).unwrap();
        assert_eq!(txns.len(), 1);
    }

    #[test]
    fn test_falls_back_to_existing_entries() {
        let existing = vec![open("Assets:Bank"), txn("existing", &["Assets:Bank"]).into()];

        let txns = load_training_data(None, None, Some(existing.as_slice())).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].narration, "existing");

        let txns =
            load_training_data(Some(Vec::new().into()), None, Some(existing.as_slice())).unwrap();
        assert_eq!(txns[0].narration, "existing");
    }

    #[test]
    fn test_explicit_entries_win_over_existing() {
        let existing = vec![txn("existing", &["Assets:Bank"]).into()];
        let given = vec![txn("given", &["Assets:Bank"]).into()];

        let txns = load_training_data(Some(given.into()), None, Some(existing.as_slice())).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].narration, "given");
    }

    #[test]
    fn test_nothing_given() {
        let txns = load_training_data(None, Some("Assets:Bank"), None).unwrap();
        assert!(txns.is_empty());
    }

    #[test]
    fn test_training_data_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LEDGER.as_bytes()).unwrap();

        let txns = load_training_data(
            Some(TrainingData::from(file.path())),
            Some("Expenses:Food"),
            None,
        )
        .unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].narration, "Coffee");
    }
}
