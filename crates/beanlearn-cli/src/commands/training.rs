//! Training data export command

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use beanlearn_core::{FeatureConfig, TrainingDataGenerator, TrainingExportStats, TrainingTarget};

use super::load_transactions;
use crate::cli::ExportFormat;

/// Export labelled training examples to `output`, or stdout
pub fn cmd_export(
    config: &FeatureConfig,
    ledger: &Path,
    account: Option<&str>,
    target: Option<&str>,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let mut config = config.clone();
    if let Some(account) = account {
        config.known_account = Some(account.to_string());
    }
    if let Some(target) = target {
        config.target = target.parse::<TrainingTarget>().map_err(|e| {
            anyhow::anyhow!("{}. Valid targets: account, payee", e)
        })?;
    }

    let transactions = load_transactions(ledger, config.known_account.as_deref())?;
    let generator =
        TrainingDataGenerator::new(&config).context("Invalid training configuration")?;

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            let stats = write_examples(&generator, &transactions, format, &mut writer)?;
            writer.flush()?;

            println!(
                "Exported {} examples ({} distinct {} labels) to: {}",
                stats.total_examples,
                stats.unique_labels,
                stats.target,
                path.display()
            );
            if stats.skipped > 0 {
                println!("Skipped {} samples without a usable label", stats.skipped);
            }
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            let stats = write_examples(&generator, &transactions, format, &mut stdout)?;
            eprintln!();
            eprintln!("# Exported {} examples", stats.total_examples);
        }
    }

    Ok(())
}

fn write_examples<W: Write>(
    generator: &TrainingDataGenerator,
    transactions: &[beanlearn_core::Transaction],
    format: ExportFormat,
    writer: &mut W,
) -> Result<TrainingExportStats> {
    let stats = match format {
        ExportFormat::Jsonl => generator.export_jsonl(transactions, writer),
        ExportFormat::Csv => generator.export_csv(transactions, writer),
    }
    .context("Failed to export training data")?;
    Ok(stats)
}
