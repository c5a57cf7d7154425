use std::path::{Path, PathBuf};

use serde::Serialize;

use super::ExportFormat;
use crate::diagnostics::LogDiagnostics;
use crate::error::Result;
use crate::importer::SourceFile;
use crate::models::{CategorySummary, Transaction};
use crate::reports::{self, Totals};
use crate::settings::{load_settings, shellexpand_path};

#[derive(Serialize)]
struct ExportDocument<'a> {
    source: String,
    checksum: &'a str,
    exported_at: String,
    skipped_rows: usize,
    totals: Totals,
    categories: Vec<CategorySummary>,
    transactions: &'a [Transaction],
}

pub fn run(file: &str, output: Option<String>, format: ExportFormat) -> Result<()> {
    let settings = load_settings();
    let (source, outcome) = super::load(file)?;

    let path = match output {
        Some(p) => PathBuf::from(shellexpand_path(&p)),
        None => default_output(&settings.export_dir(), &source, format),
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    match format {
        ExportFormat::Json => {
            let doc = ExportDocument {
                source: source.file_name(),
                checksum: &source.checksum,
                exported_at: chrono::Local::now().to_rfc3339(),
                skipped_rows: outcome.skipped.len(),
                totals: reports::totals(&outcome.transactions),
                categories: reports::category_summary(
                    &outcome.transactions,
                    &LogDiagnostics::new("reports"),
                ),
                transactions: &outcome.transactions,
            };
            write_json(&path, &doc)?;
        }
        ExportFormat::Csv => write_csv(&path, &outcome.transactions)?,
    }

    log::info!("Exported {} transactions to {}", outcome.transactions.len(), path.display());
    println!(
        "Exported {} transactions to {}",
        outcome.transactions.len(),
        path.display()
    );
    Ok(())
}

fn default_output(dir: &Path, source: &SourceFile, format: ExportFormat) -> PathBuf {
    let stem = source
        .path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("transactions");
    let short = &source.checksum[..8.min(source.checksum.len())];
    dir.join(format!("{stem}-{short}.{}", format.extension()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

fn write_csv(path: &Path, transactions: &[Transaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for txn in transactions {
        wtr.serialize(txn)?;
    }
    wtr.flush()?;
    Ok(())
}
