use std::collections::HashMap;

use serde::Serialize;

use crate::diagnostics::Diagnostics;
use crate::models::{CategorySummary, Transaction};

// ---------------------------------------------------------------------------
// Category breakdown
// ---------------------------------------------------------------------------

/// Per-category totals of absolute amounts, largest first.
///
/// Categories are grouped by exact string. Percentages are shares of the grand
/// total across all categories and are all zero when that total is zero.
/// Equal totals keep the order in which their categories were first seen.
pub fn category_summary(transactions: &[Transaction], diag: &dyn Diagnostics) -> Vec<CategorySummary> {
    diag.info("Generating category summary from transactions");

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut sums: Vec<(&str, f64)> = Vec::new();
    let mut total = 0.0;

    for txn in transactions {
        let amount = txn.amount.abs();
        let slot = *index.entry(txn.category.as_str()).or_insert_with(|| {
            sums.push((txn.category.as_str(), 0.0));
            sums.len() - 1
        });
        sums[slot].1 += amount;
        total += amount;
    }

    let mut summary: Vec<CategorySummary> = sums
        .into_iter()
        .map(|(category, amount)| CategorySummary {
            category: category.to_string(),
            amount,
            percentage: if total > 0.0 { amount / total * 100.0 } else { 0.0 },
        })
        .collect();
    summary.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    diag.debug(&format!("Generated summary for {} categories", summary.len()));
    summary
}

pub fn top_categories(summary: &[CategorySummary], n: usize) -> &[CategorySummary] {
    &summary[..n.min(summary.len())]
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    /// Sum of inflows (negative amounts), as a positive number.
    pub income: f64,
    /// Sum of outflows (positive amounts).
    pub expenses: f64,
    /// Plain sum of signed amounts.
    pub net: f64,
    pub count: usize,
}

pub fn totals(transactions: &[Transaction]) -> Totals {
    transactions.iter().fold(Totals::default(), |mut acc, txn| {
        if txn.amount < 0.0 {
            acc.income += txn.amount.abs();
        } else {
            acc.expenses += txn.amount;
        }
        acc.net += txn.amount;
        acc.count += 1;
        acc
    })
}
