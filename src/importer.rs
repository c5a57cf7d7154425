use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use sha2::{Digest, Sha256};

use crate::diagnostics::Diagnostics;
use crate::error::{InsightsError, Result};
use crate::models::{Transaction, UNCATEGORIZED, UNKNOWN_DESCRIPTION};

const MIN_FIELDS: usize = 3;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Strip everything except digits, `-` and `.`, then read the longest
/// numeric prefix. `"$1,234.56"` -> 1234.56, `"-$50.00"` -> -50.0,
/// `"50.00-"` -> 50.0, `"1.2.3"` -> 1.2.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
        .collect();
    leading_number(&cleaned)
}

fn leading_number(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let int_start = usize::from(bytes.first() == Some(&b'-'));
    let mut end = digits_from(int_start);
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        digits += frac_end - (end + 1);
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Two-digit years: 00-49 are 20xx, 50-99 are 19xx.
fn expand_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    match raw.len() {
        4 => Some(year),
        1 | 2 if year < 50 => Some(2000 + year),
        1 | 2 => Some(1900 + year),
        _ => None,
    }
}

/// `Y-M-D` / `Y/M/D` with a four-digit year, or `M/D/Y` / `M-D-Y` with a
/// two- or four-digit year. Month and day need not be zero-padded.
fn parse_numeric_date(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw.split(['-', '/']).collect();
    if parts.len() != 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }
    let (year, month, day) = if parts[0].len() == 4 {
        (parts[0], parts[1], parts[2])
    } else {
        (parts[2], parts[0], parts[1])
    };
    if month.len() > 2 || day.len() > 2 {
        return None;
    }
    NaiveDate::from_ymd_opt(expand_year(year)?, month.parse().ok()?, day.parse().ok()?)
}

const NAMED_MONTH_FORMATS: &[&str] = &[
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

// chrono's %Y also takes one- and two-digit years; those are not real dates here.
fn four_digit_year(date: NaiveDate) -> Option<NaiveDate> {
    (1000..=9999).contains(&date.year()).then_some(date)
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(date) = parse_numeric_date(raw) {
        return Some(date);
    }
    if let Some(date) = NAMED_MONTH_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
    {
        return four_digit_year(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return four_digit_year(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .and_then(|dt| four_digit_year(dt.date()))
}

fn non_blank(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Field extraction
// ---------------------------------------------------------------------------

/// Zero-based column positions resolved from the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnMap {
    pub date: Option<usize>,
    pub description: Option<usize>,
    pub category: Option<usize>,
    pub amount: Option<usize>,
}

impl ColumnMap {
    /// Case-insensitive substring match, first matching cell wins.
    pub fn from_header(header: &str) -> Self {
        let header = header.trim_start_matches('\u{feff}').trim().to_lowercase();
        let cells: Vec<&str> = header.split(',').collect();
        let find = |name: &str| cells.iter().position(|c| c.contains(name));
        Self {
            date: find("date"),
            description: find("description"),
            category: find("category"),
            amount: find("amount"),
        }
    }

    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.date.is_none() {
            missing.push("date");
        }
        if self.amount.is_none() {
            missing.push("amount");
        }
        missing
    }

    pub fn require(&self) -> Result<()> {
        let missing = self.missing_required();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(InsightsError::MalformedInput { missing })
        }
    }
}

// ---------------------------------------------------------------------------
// Row parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    Empty,
    TooFewFields { found: usize },
    InvalidDate { raw: String },
    MissingAmountField,
    InvalidAmount { raw: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty line"),
            Self::TooFewFields { found } => {
                write!(f, "insufficient fields ({found}, need {MIN_FIELDS})")
            }
            Self::InvalidDate { raw } => write!(f, "invalid date: {raw:?}"),
            Self::MissingAmountField => write!(f, "no value in amount column"),
            Self::InvalidAmount { raw } => write!(f, "invalid amount: {raw:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Parsed(Transaction),
    Skipped(SkippedRow),
}

/// Parse one data line. `line_no` is the line's index in the input
/// (the header is line 0) and `batch_stamp` is shared by the whole parse.
pub fn parse_row(line_no: usize, line: &str, cols: &ColumnMap, batch_stamp: i64) -> RowOutcome {
    let skip = |reason| {
        RowOutcome::Skipped(SkippedRow {
            line: line_no,
            reason,
        })
    };

    let line = line.trim();
    if line.is_empty() {
        return skip(SkipReason::Empty);
    }

    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < MIN_FIELDS {
        return skip(SkipReason::TooFewFields {
            found: fields.len(),
        });
    }

    let raw_date = cols.date.and_then(|i| fields.get(i)).copied().unwrap_or("");
    let Some(date) = parse_date(raw_date) else {
        return skip(SkipReason::InvalidDate {
            raw: raw_date.to_string(),
        });
    };

    let Some(raw_amount) = cols.amount.and_then(|i| fields.get(i)).copied() else {
        return skip(SkipReason::MissingAmountField);
    };
    let Some(amount) = parse_amount(raw_amount) else {
        return skip(SkipReason::InvalidAmount {
            raw: raw_amount.to_string(),
        });
    };

    let field = |idx: Option<usize>| idx.and_then(|i| fields.get(i)).copied();
    RowOutcome::Parsed(Transaction {
        id: format!("tx-{line_no}-{batch_stamp}"),
        date,
        description: non_blank(field(cols.description))
            .unwrap_or_else(|| UNKNOWN_DESCRIPTION.to_string()),
        category: non_blank(field(cols.category)).unwrap_or_else(|| UNCATEGORIZED.to_string()),
        amount,
    })
}

// ---------------------------------------------------------------------------
// Whole-file parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub transactions: Vec<Transaction>,
    pub skipped: Vec<SkippedRow>,
}

#[allow(dead_code)] // the binary goes through parse_csv_detailed
pub fn parse_csv(content: &str, diag: &dyn Diagnostics) -> Result<Vec<Transaction>> {
    parse_csv_detailed(content, diag).map(|outcome| outcome.transactions)
}

pub fn parse_csv_detailed(content: &str, diag: &dyn Diagnostics) -> Result<ParseOutcome> {
    diag.info("Starting to parse CSV content");

    // Whitespace-only content is reported as empty, not as a header failure.
    if content.trim().is_empty() {
        diag.error("Failed to parse CSV: file content is empty");
        return Err(InsightsError::EmptyInput("file content is empty".to_string()));
    }

    let mut lines = content.split('\n');
    let header = lines.next().unwrap_or("");
    let cols = ColumnMap::from_header(header);
    if let Err(e) = cols.require() {
        diag.error(&format!("Failed to parse CSV: {e}"));
        return Err(e);
    }
    diag.debug(&format!("Resolved columns: {cols:?}"));

    let batch_stamp = chrono::Utc::now().timestamp_millis();
    let mut outcome = ParseOutcome::default();

    for (offset, line) in lines.enumerate() {
        let line_no = offset + 1;
        match parse_row(line_no, line, &cols, batch_stamp) {
            RowOutcome::Parsed(txn) => outcome.transactions.push(txn),
            // Blank lines (including the trailing newline) are not worth a warning.
            RowOutcome::Skipped(SkippedRow {
                reason: SkipReason::Empty,
                ..
            }) => {}
            RowOutcome::Skipped(skipped) => {
                diag.warn(&format!(
                    "Skipping line {}: {}",
                    skipped.line, skipped.reason
                ));
                outcome.skipped.push(skipped);
            }
        }
    }

    diag.info(&format!(
        "Successfully parsed {} transactions ({} skipped)",
        outcome.transactions.len(),
        outcome.skipped.len()
    ));
    for txn in outcome.transactions.iter().take(3) {
        diag.debug(&format!("{txn:?}"));
    }

    Ok(outcome)
}

// ---------------------------------------------------------------------------
// File source
// ---------------------------------------------------------------------------

/// Raw text of an imported file plus a fingerprint of its bytes.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
    pub checksum: String,
}

impl SourceFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string()
    }
}

pub fn read_source(path: &Path) -> Result<SourceFile> {
    let bytes = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let checksum = hex::encode(hasher.finalize());
    let content = String::from_utf8(bytes).map_err(|_| {
        InsightsError::EmptyInput(format!("{} is not readable as UTF-8 text", path.display()))
    })?;
    Ok(SourceFile {
        path: path.to_path_buf(),
        content,
        checksum,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingDiagnostics;
    use log::Level;

    const HEADER: &str = "Date,Description,Category,Amount";

    fn cols() -> ColumnMap {
        ColumnMap::from_header(HEADER)
    }

    fn parsed(outcome: RowOutcome) -> Transaction {
        match outcome {
            RowOutcome::Parsed(t) => t,
            RowOutcome::Skipped(s) => panic!("expected a transaction, got {s:?}"),
        }
    }

    fn skipped(outcome: RowOutcome) -> SkipReason {
        match outcome {
            RowOutcome::Skipped(s) => s.reason,
            RowOutcome::Parsed(t) => panic!("expected a skip, got {t:?}"),
        }
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("-$50.00"), Some(-50.0));
        assert_eq!(parse_amount("  42.10 "), Some(42.1));
        assert_eq!(parse_amount("USD 7"), Some(7.0));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("-"), None);
    }

    #[test]
    fn test_parse_amount_reads_leading_number() {
        assert_eq!(parse_amount("50.00-"), Some(50.0));
        assert_eq!(parse_amount("1.2.3"), Some(1.2));
        assert_eq!(parse_amount("12-34"), Some(12.0));
        assert_eq!(parse_amount("-.5"), Some(-0.5));
        assert_eq!(parse_amount("7."), Some(7.0));
        assert_eq!(parse_amount("--5"), None);
        assert_eq!(parse_amount("."), None);
        assert_eq!(parse_amount("-.-"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let jan15 = NaiveDate::from_ymd_opt(2023, 1, 15);
        assert_eq!(parse_date("2023-01-15"), jan15);
        assert_eq!(parse_date(" 2023/01/15 "), jan15);
        assert_eq!(parse_date("01/15/2023"), jan15);
        assert_eq!(parse_date("Jan 15 2023"), jan15);
        assert_eq!(parse_date("January 15, 2023"), jan15);
        assert_eq!(parse_date("15 Jan 2023"), jan15);
        assert_eq!(parse_date("2023-01-15T10:30:00Z"), jan15);
        assert_eq!(parse_date("2023-01-15 08:00:00"), jan15);
    }

    #[test]
    fn test_parse_date_rejects_invalid() {
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2023-02-30"), None);
        assert_eq!(parse_date("13/01/2023"), None);
        assert_eq!(parse_date("1/5/2023/7"), None);
        assert_eq!(parse_date("123/5/2023"), None);
        assert_eq!(parse_date("01/15/202"), None);
    }

    #[test]
    fn test_parse_date_short_years_and_unpadded_parts() {
        assert_eq!(parse_date("1/5/23"), NaiveDate::from_ymd_opt(2023, 1, 5));
        assert_eq!(parse_date("12/31/99"), NaiveDate::from_ymd_opt(1999, 12, 31));
        assert_eq!(parse_date("6/30/49"), NaiveDate::from_ymd_opt(2049, 6, 30));
        assert_eq!(parse_date("6/30/50"), NaiveDate::from_ymd_opt(1950, 6, 30));
        assert_eq!(parse_date("2023-1-5"), NaiveDate::from_ymd_opt(2023, 1, 5));
        assert_eq!(parse_date("1/5/2023"), NaiveDate::from_ymd_opt(2023, 1, 5));
        assert_eq!(parse_date("Jan 15 23"), None);
        assert_eq!(parse_date("23-01-15T10:30"), None);
    }

    #[test]
    fn test_parse_date_timestamps() {
        let jan15 = NaiveDate::from_ymd_opt(2023, 1, 15);
        assert_eq!(parse_date("2023-01-15T10:30"), jan15);
        assert_eq!(parse_date("2023-01-15 10:30"), jan15);
        assert_eq!(parse_date("2023-01-15T10:30:00.250"), jan15);
        assert_eq!(parse_date("2023-01-15T10:30:00+02:00"), jan15);
    }

    #[test]
    fn test_parse_row_short_year_date() {
        let txn = parsed(parse_row(1, "1/5/23,Coffee,Dining,4.50", &cols(), 0));
        assert_eq!(txn.date, NaiveDate::from_ymd_opt(2023, 1, 5).unwrap());
    }

    #[test]
    fn test_header_detection_any_order_and_case() {
        let cols = ColumnMap::from_header("AMOUNT (USD),Txn Date,Memo");
        assert_eq!(cols.amount, Some(0));
        assert_eq!(cols.date, Some(1));
        assert_eq!(cols.description, None);
        assert_eq!(cols.category, None);
        assert!(cols.require().is_ok());

        let cols = ColumnMap::from_header("\u{feff}date,CATEGORY,description,Amount\r");
        assert_eq!(cols.date, Some(0));
        assert_eq!(cols.category, Some(1));
        assert_eq!(cols.description, Some(2));
        assert_eq!(cols.amount, Some(3));
    }

    #[test]
    fn test_header_missing_required_fields() {
        let err = ColumnMap::from_header("Description,Category,Amount")
            .require()
            .unwrap_err();
        match err {
            InsightsError::MalformedInput { missing } => assert_eq!(missing, vec!["date"]),
            other => panic!("unexpected error: {other}"),
        }

        let err = ColumnMap::from_header("Memo,Value").require().unwrap_err();
        assert!(err.to_string().contains("missing required headers (date, amount)"));
    }

    #[test]
    fn test_parse_row_valid() {
        let txn = parsed(parse_row(1, "2023-01-15,Coffee Shop,Dining,-4.50", &cols(), 99));
        assert_eq!(txn.id, "tx-1-99");
        assert_eq!(txn.date, NaiveDate::from_ymd_opt(2023, 1, 15).unwrap());
        assert_eq!(txn.description, "Coffee Shop");
        assert_eq!(txn.category, "Dining");
        assert_eq!(txn.amount, -4.5);
        assert!(txn.is_income());
    }

    #[test]
    fn test_parse_row_skip_conditions() {
        let c = cols();
        assert_eq!(skipped(parse_row(1, "   ", &c, 0)), SkipReason::Empty);
        assert_eq!(
            skipped(parse_row(1, "2023-01-06,Bad Row", &c, 0)),
            SkipReason::TooFewFields { found: 2 }
        );
        assert_eq!(
            skipped(parse_row(1, "not-a-date,Coffee,Dining,-4.50", &c, 0)),
            SkipReason::InvalidDate {
                raw: "not-a-date".to_string()
            }
        );
        assert_eq!(
            skipped(parse_row(1, "2023-01-15,Coffee,Dining,free", &c, 0)),
            SkipReason::InvalidAmount {
                raw: "free".to_string()
            }
        );
        assert_eq!(
            skipped(parse_row(1, "2023-01-15,Coffee,Dining", &c, 0)),
            SkipReason::MissingAmountField
        );
    }

    #[test]
    fn test_parse_row_defaults_blank_fields() {
        let txn = parsed(parse_row(1, "2023-01-15,,,10.00", &cols(), 0));
        assert_eq!(txn.description, "Unknown");
        assert_eq!(txn.category, "Uncategorized");
        assert_eq!(txn.amount, 10.0);

        // Columns absent from the header entirely
        let cols = ColumnMap::from_header("Date,Note,Amount");
        let txn = parsed(parse_row(1, "2023-01-15,lunch,12.00", &cols, 0));
        assert_eq!(txn.description, "Unknown");
        assert_eq!(txn.category, "Uncategorized");
    }

    #[test]
    fn test_parse_row_embedded_comma_shifts_fields() {
        // No quoting support: the thousands separator splits the amount.
        let txn = parsed(parse_row(1, "2023-01-15,Laptop,Tech,\"1,200.00\"", &cols(), 0));
        assert_eq!(txn.amount, 1.0);
    }

    #[test]
    fn test_parse_csv_empty_input() {
        let diag = RecordingDiagnostics::default();
        assert!(matches!(
            parse_csv("", &diag),
            Err(InsightsError::EmptyInput(_))
        ));
        assert!(matches!(
            parse_csv(" \n\n", &diag),
            Err(InsightsError::EmptyInput(_))
        ));
        assert_eq!(diag.at(Level::Error).len(), 2);
    }

    #[test]
    fn test_parse_csv_missing_headers() {
        let diag = RecordingDiagnostics::default();
        let result = parse_csv("Description,Category\nCoffee,Dining\n", &diag);
        assert!(matches!(result, Err(InsightsError::MalformedInput { .. })));
        assert_eq!(diag.at(Level::Error).len(), 1);
    }

    #[test]
    fn test_parse_csv_end_to_end() {
        let content = "\
Date,Description,Category,Amount
2023-01-01,Salary,Income,-2000.00
2023-01-05,Groceries,Food,45.20
2023-01-06,Bad Row
2023-01-10,Rent,Housing,1200.00
";
        let diag = RecordingDiagnostics::default();
        let outcome = parse_csv_detailed(content, &diag).unwrap();
        let descs: Vec<&str> = outcome
            .transactions
            .iter()
            .map(|t| t.description.as_str())
            .collect();
        assert_eq!(descs, vec!["Salary", "Groceries", "Rent"]);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].line, 3);
        assert_eq!(
            outcome.skipped[0].reason,
            SkipReason::TooFewFields { found: 2 }
        );

        let warnings = diag.at(Level::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("line 3"));
        assert!(diag
            .at(Level::Info)
            .iter()
            .any(|m| m.contains("Successfully parsed 3 transactions")));
    }

    #[test]
    fn test_parse_csv_ids_unique_within_batch() {
        let content = "Date,Description,Category,Amount\n\
                       2023-01-01,A,X,1\n2023-01-02,B,X,2\n2023-01-03,C,X,3\n";
        let txns = parse_csv(content, &RecordingDiagnostics::default()).unwrap();
        let mut ids: Vec<&str> = txns.iter().map(|t| t.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
        assert!(txns[0].id.starts_with("tx-1-"));
    }

    #[test]
    fn test_parse_csv_all_rows_skipped_is_ok() {
        let content = "Date,Amount,Category\nnope,1,A\n2023-01-01,x,B\n";
        let outcome = parse_csv_detailed(content, &RecordingDiagnostics::default()).unwrap();
        assert!(outcome.transactions.is_empty());
        assert_eq!(outcome.skipped.len(), 2);
    }

    #[test]
    fn test_parse_csv_handles_crlf() {
        let content = "Date,Description,Category,Amount\r\n2023-03-01,Bus,Transport,2.75\r\n";
        let txns = parse_csv(content, &RecordingDiagnostics::default()).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].category, "Transport");
        assert_eq!(txns[0].amount, 2.75);
    }

    #[test]
    fn test_read_source_checksum_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stmt.csv");
        std::fs::write(&path, "Date,Amount,Category\n").unwrap();
        let src = read_source(&path).unwrap();
        assert_eq!(src.content, "Date,Amount,Category\n");
        assert_eq!(src.checksum.len(), 64);
        assert_eq!(src.file_name(), "stmt.csv");

        let again = read_source(&path).unwrap();
        assert_eq!(src.checksum, again.checksum);
    }

    #[test]
    fn test_read_source_rejects_binary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.csv");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        assert!(matches!(
            read_source(&path),
            Err(InsightsError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_read_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_source(&dir.path().join("nope.csv")),
            Err(InsightsError::Io(_))
        ));
    }
}
