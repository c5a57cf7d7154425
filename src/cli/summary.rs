use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::diagnostics::LogDiagnostics;
use crate::error::Result;
use crate::fmt::{money_with, percent};
use crate::reports;
use crate::settings::load_settings;

pub fn run(file: &str, top: Option<usize>) -> Result<()> {
    let settings = load_settings();
    let symbol = settings.currency_symbol.as_str();
    let (source, outcome) = super::load(file)?;

    let summary = reports::category_summary(&outcome.transactions, &LogDiagnostics::new("reports"));
    let top = reports::top_categories(&summary, top.unwrap_or(settings.top_categories));

    if top.is_empty() {
        println!("No transactions in {}.", source.file_name());
    } else {
        let mut table = Table::new();
        table.set_header(vec!["Category", "Amount", "%"]);
        for item in top {
            table.add_row(vec![
                Cell::new(&item.category),
                Cell::new(money_with(item.amount, symbol)),
                Cell::new(percent(item.percentage)),
            ]);
        }
        if top.len() < summary.len() {
            let rest = &summary[top.len()..];
            table.add_row(vec![
                Cell::new(format!("({} more)", rest.len())),
                Cell::new(money_with(rest.iter().map(|s| s.amount).sum(), symbol)),
                Cell::new(percent(rest.iter().map(|s| s.percentage).sum())),
            ]);
        }
        println!("Spending by Category: {}\n{table}", source.file_name());
    }

    let totals = reports::totals(&outcome.transactions);
    let net = money_with(totals.net, symbol);
    // Negative net means more came in than went out.
    let net = if totals.net <= 0.0 {
        net.green().to_string()
    } else {
        net.red().to_string()
    };
    println!();
    println!("Transactions:  {}", totals.count);
    println!("Income:        {}", money_with(totals.income, symbol));
    println!("Expenses:      {}", money_with(totals.expenses, symbol));
    println!("Net:           {net}");
    if !outcome.skipped.is_empty() {
        println!("Skipped rows:  {}", outcome.skipped.len());
    }
    Ok(())
}
