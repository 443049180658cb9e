//! Monthly command - current-month income and expense card

use anyhow::Result;
use chrono::Datelike;
use colored::Colorize;

use super::get_context;
use crate::output;

pub fn run(month: Option<u32>, year: Option<i32>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let today = ctx.today();
    let month = month.unwrap_or_else(|| today.month());
    let year = year.unwrap_or_else(|| today.year());

    let summary = ctx.transaction_service.monthly_summary(month, year)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", format!("{:04}-{:02}", year, month).bold());

    let mut table = output::create_table();
    table.set_header(vec!["", "Total", "Count"]);
    table.add_row(vec![
        "Income".to_string(),
        output::format_amount(summary.total_income).green().to_string(),
        summary.income_count.to_string(),
    ]);
    table.add_row(vec![
        "Expenses".to_string(),
        output::format_amount(summary.total_expenses).red().to_string(),
        summary.expense_count.to_string(),
    ]);
    table.add_row(vec![
        "Net".to_string(),
        output::balance_amount(summary.net_balance).to_string(),
        String::new(),
    ]);
    println!("{}", table);

    let spent = format!("Spent {} of income", output::format_percent(summary.spent_ratio));
    if summary.spent_ratio >= rust_decimal::Decimal::ONE_HUNDRED {
        println!("{}", spent.red());
    } else {
        println!("{}", spent.dimmed());
    }

    Ok(())
}
