use clap::ValueEnum;

use crate::models::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortField {
    Date,
    Amount,
    Description,
    Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Case-insensitive match on description, category or the amount's digits.
pub fn matches(txn: &Transaction, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    txn.description.to_lowercase().contains(&term)
        || txn.category.to_lowercase().contains(&term)
        || txn.amount.to_string().contains(&term)
}

pub fn filter<'a>(transactions: &'a [Transaction], term: &str) -> Vec<&'a Transaction> {
    transactions.iter().filter(|t| matches(t, term)).collect()
}

pub fn sort(transactions: &mut [&Transaction], field: SortField, order: SortOrder) {
    transactions.sort_by(|a, b| {
        let ord = match field {
            SortField::Date => a.date.cmp(&b.date),
            SortField::Amount => a.amount.total_cmp(&b.amount),
            SortField::Description => a
                .description
                .to_lowercase()
                .cmp(&b.description.to_lowercase()),
            SortField::Category => a.category.to_lowercase().cmp(&b.category.to_lowercase()),
        };
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}
