use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::money_with;
use crate::importer::SkippedRow;
use crate::query::{self, SortField, SortOrder};
use crate::settings::load_settings;

pub fn run(
    file: &str,
    search: Option<&str>,
    sort: SortField,
    asc: bool,
    limit: Option<usize>,
) -> Result<()> {
    let settings = load_settings();
    let (source, outcome) = super::load(file)?;

    let mut view = query::filter(&outcome.transactions, search.unwrap_or(""));
    let order = if asc { SortOrder::Asc } else { SortOrder::Desc };
    query::sort(&mut view, sort, order);
    let shown = limit.unwrap_or(view.len()).min(view.len());

    if view.is_empty() {
        println!("No transactions to show.");
    } else {
        let mut table = Table::new();
        table.set_header(vec!["Date", "Description", "Category", "Amount"]);
        for txn in &view[..shown] {
            let amt = money_with(txn.amount, &settings.currency_symbol);
            let amt = if txn.is_income() {
                amt.green().to_string()
            } else {
                amt.red().to_string()
            };
            table.add_row(vec![
                Cell::new(txn.date.format("%Y-%m-%d")),
                Cell::new(&txn.description),
                Cell::new(&txn.category),
                Cell::new(amt),
            ]);
        }
        println!("Transactions: {}\n{table}", source.file_name());
        if shown < view.len() {
            println!("({} more not shown)", view.len() - shown);
        }
    }

    println!(
        "{} parsed, {} skipped",
        outcome.transactions.len(),
        outcome.skipped.len()
    );
    print_skipped(&outcome.skipped);
    Ok(())
}

fn print_skipped(skipped: &[SkippedRow]) {
    for row in skipped {
        println!("  {} {}: {}", "line".yellow(), row.line, row.reason);
    }
}
