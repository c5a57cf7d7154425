pub mod config;
pub mod export;
pub mod import;
pub mod summary;

use std::path::Path;

use clap::{Parser, Subcommand, ValueEnum};

use crate::diagnostics::LogDiagnostics;
use crate::error::Result;
use crate::importer::{self, ParseOutcome, SourceFile};
use crate::query::SortField;

/// Read a file and parse it, reporting progress through the `log` facade.
pub(crate) fn load(file: &str) -> Result<(SourceFile, ParseOutcome)> {
    let source = importer::read_source(Path::new(file))?;
    log::info!("Read {} ({} bytes)", source.file_name(), source.content.len());
    let outcome = importer::parse_csv_detailed(&source.content, &LogDiagnostics::new("importer"))?;
    Ok((source, outcome))
}

#[derive(Parser)]
#[command(
    name = "insights",
    version,
    about = "Import transaction CSVs and break spending down by category."
)]
pub struct Cli {
    /// Show debug diagnostics on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a CSV file and list its transactions.
    Import {
        /// Path to the CSV file (header row must name date and amount columns)
        file: String,
        /// Only show transactions whose description, category or amount contain this text
        #[arg(long)]
        search: Option<String>,
        /// Sort field
        #[arg(long, value_enum, default_value = "date")]
        sort: SortField,
        /// Sort ascending (default is descending)
        #[arg(long)]
        asc: bool,
        /// Show at most this many rows
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Category breakdown and income/expense totals for a CSV file.
    Summary {
        /// Path to the CSV file
        file: String,
        /// Number of categories to show (default: top_categories setting)
        #[arg(long)]
        top: Option<usize>,
    },
    /// Write parsed transactions and their summary to disk.
    Export {
        /// Path to the CSV file
        file: String,
        /// Output path (default: <export_dir>/<name>-<checksum>.<ext>)
        #[arg(long)]
        output: Option<String>,
        #[arg(long, value_enum, default_value = "json")]
        format: ExportFormat,
    },
    /// Show or change settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the current settings.
    Show,
    /// Change a setting: log_level, currency_symbol, top_categories, export_dir.
    Set { key: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}
