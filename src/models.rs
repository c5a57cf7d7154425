use chrono::NaiveDate;
use serde::Serialize;

pub const UNKNOWN_DESCRIPTION: &str = "Unknown";
pub const UNCATEGORIZED: &str = "Uncategorized";

/// One ledger entry parsed from an imported file.
///
/// Sign convention: negative amounts are inflows (income), positive amounts
/// are outflows (expenses).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    pub amount: f64,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.amount < 0.0
    }
}

/// Total and share of one category across a transaction set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
}
