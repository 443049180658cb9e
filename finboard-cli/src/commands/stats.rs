//! Stats command - totals, category breakdown, monthly trend and metrics

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use clap::Args;
use colored::Colorize;

use finboard_core::services::{Period, PeriodPreset, TransactionFilter, TransactionStats};

use super::{get_context, parse_amount, parse_day};
use crate::output;

#[derive(Args)]
pub struct StatsArgs {
    /// Look-back window: 1month, 3months, 6months, 1year or all
    #[arg(long, default_value = "3months")]
    period: String,
    /// Restrict to one month (1-12); overrides --period
    #[arg(long)]
    month: Option<u32>,
    /// Year for --month, defaults to the current year
    #[arg(long)]
    year: Option<i32>,
    /// Range start (YYYY-MM-DD); overrides --period and --month
    #[arg(long)]
    from: Option<String>,
    /// Range end (YYYY-MM-DD), defaults to today
    #[arg(long)]
    to: Option<String>,
    /// Account IDs (comma-separated), defaults to all accounts
    #[arg(long = "account", value_delimiter = ',')]
    accounts: Vec<i64>,
    /// Minimum amount
    #[arg(long)]
    min: Option<String>,
    /// Maximum amount
    #[arg(long)]
    max: Option<String>,
    /// income or expense
    #[arg(long = "type")]
    kind: Option<String>,
    #[arg(long)]
    category: Option<String>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

impl StatsArgs {
    fn period(&self, today: NaiveDate) -> Result<Option<Period>> {
        if let Some(from) = &self.from {
            let start = parse_day(from)?;
            let end = match &self.to {
                Some(to) => parse_day(to)?,
                None => today,
            };
            if start > end {
                anyhow::bail!("--from {} is after --to {}", start, end);
            }
            return Ok(Some(Period::Range { start, end }));
        }

        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                anyhow::bail!("Invalid month {}. Use 1-12", month);
            }
            let year = self.year.unwrap_or_else(|| today.year());
            return Ok(Some(Period::Month { month, year }));
        }

        if self.period.eq_ignore_ascii_case("all") {
            return Ok(None);
        }
        let preset: PeriodPreset = self.period.parse()?;
        Ok(Some(Period::Preset(preset)))
    }

    fn to_filter(&self, today: NaiveDate) -> Result<TransactionFilter> {
        Ok(TransactionFilter {
            period: self.period(today)?,
            account_ids: self.accounts.clone(),
            min_amount: self.min.as_deref().map(parse_amount).transpose()?,
            max_amount: self.max.as_deref().map(parse_amount).transpose()?,
            transaction_type: self.kind.as_deref().map(str::parse).transpose()?,
            category: self.category.clone(),
        })
    }
}

pub fn run(args: StatsArgs) -> Result<()> {
    let ctx = get_context()?;
    let today = ctx.today();
    let filter = args.to_filter(today)?;

    let pb = output::spinner("Loading transactions...");
    let stats = ctx.transaction_service.stats(&filter, today);
    pb.finish_and_clear();
    let stats = stats?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    if stats.dropped_dates > 0 {
        output::warning(&format!(
            "{} transaction(s) skipped because of unreadable dates",
            stats.dropped_dates
        ));
    }

    print_summary(&stats);
    print_categories(&stats);
    print_trend(&stats);

    Ok(())
}

fn print_summary(stats: &TransactionStats) {
    println!("{}", "Summary".bold());
    let mut table = output::create_table();
    table.add_row(vec![
        "Income".to_string(),
        output::format_amount(stats.totals.total_income).green().to_string(),
    ]);
    table.add_row(vec![
        "Expenses".to_string(),
        output::format_amount(stats.totals.total_expenses).red().to_string(),
    ]);
    table.add_row(vec![
        "Net".to_string(),
        output::balance_amount(stats.totals.net_income).to_string(),
    ]);
    table.add_row(vec![
        "Savings rate".to_string(),
        output::format_percent(stats.metrics.savings_rate),
    ]);
    table.add_row(vec![
        "Expense ratio".to_string(),
        output::format_percent(stats.metrics.expense_ratio),
    ]);
    table.add_row(vec![
        "Monthly average".to_string(),
        output::format_amount(stats.metrics.monthly_average),
    ]);
    table.add_row(vec![
        "Largest expense".to_string(),
        output::format_amount(stats.metrics.largest_expense),
    ]);
    table.add_row(vec![
        "Avg daily expense".to_string(),
        output::format_amount(stats.metrics.avg_daily_expense),
    ]);
    table.add_row(vec![
        "Transactions".to_string(),
        stats.transaction_count.to_string(),
    ]);
    println!("{}", table);
}

fn print_categories(stats: &TransactionStats) {
    if stats.category_breakdown.is_empty() {
        return;
    }
    println!();
    println!("{}", "Expenses by category".bold());
    let mut table = output::create_table();
    table.set_header(vec!["Category", "Amount", "Share"]);
    for share in &stats.category_breakdown {
        table.add_row(vec![
            share.category.clone(),
            output::format_amount(share.amount),
            output::format_percent(share.percentage),
        ]);
    }
    println!("{}", table);
}

fn print_trend(stats: &TransactionStats) {
    if stats.monthly_trend.is_empty() {
        return;
    }
    println!();
    println!("{}", "Monthly trend".bold());
    let mut table = output::create_table();
    table.set_header(vec!["Month", "Income", "Expenses", "Net"]);
    for month in &stats.monthly_trend {
        table.add_row(vec![
            month.month.clone(),
            output::format_amount(month.income),
            output::format_amount(month.expense),
            output::balance_amount(month.net).to_string(),
        ]);
    }
    println!("{}", table);
}
