//! Aggregation engine - pure transforms over transaction lists
//!
//! Everything here works on data that has already been fetched: no I/O, no
//! clock reads (callers pass `today`). Sums are exact decimals; percentages
//! are rounded to one decimal place and are zero whenever the denominator is
//! zero.
//!
//! Records whose date cannot be parsed are skipped by date-dependent
//! transforms. Each skip is counted in the result and logged at `warn`.
//! Records of an unknown type count toward neither the totals nor the
//! monthly trend.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{serialize_amount, Transaction, TransactionType};

/// Days used to spread total expenses into a daily average
const DAYS_PER_MONTH: i64 = 30;

// =============================================================================
// Periods
// =============================================================================

/// Relative look-back windows ending today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodPreset {
    OneMonth,
    #[default]
    ThreeMonths,
    SixMonths,
    OneYear,
}

impl PeriodPreset {
    fn months(self) -> u32 {
        match self {
            PeriodPreset::OneMonth => 1,
            PeriodPreset::ThreeMonths => 3,
            PeriodPreset::SixMonths => 6,
            PeriodPreset::OneYear => 12,
        }
    }
}

impl FromStr for PeriodPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "1month" | "1m" => Ok(PeriodPreset::OneMonth),
            "3months" | "3m" => Ok(PeriodPreset::ThreeMonths),
            "6months" | "6m" => Ok(PeriodPreset::SixMonths),
            "1year" | "1y" | "12m" => Ok(PeriodPreset::OneYear),
            other => Err(Error::validation(format!(
                "unknown period '{}', expected 1month, 3months, 6months or 1year",
                other
            ))),
        }
    }
}

impl fmt::Display for PeriodPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PeriodPreset::OneMonth => "1month",
            PeriodPreset::ThreeMonths => "3months",
            PeriodPreset::SixMonths => "6months",
            PeriodPreset::OneYear => "1year",
        };
        f.write_str(s)
    }
}

/// Date window for the period filter (bounds are inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Range { start: NaiveDate, end: NaiveDate },
    Month { month: u32, year: i32 },
    Preset(PeriodPreset),
}

impl Period {
    /// Resolve to inclusive `(start, end)` dates, or None if the period is invalid
    ///
    /// Presets subtract calendar months from `today`, clamping the day to the
    /// end of the target month (May 31 minus 3 months is Feb 28/29).
    pub fn bounds(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            Period::Range { start, end } => (start <= end).then_some((start, end)),
            Period::Month { month, year } => {
                let first = NaiveDate::from_ymd_opt(year, month, 1)?;
                let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
                Some((first, last))
            }
            Period::Preset(preset) => {
                let start = today.checked_sub_months(Months::new(preset.months()))?;
                Some((start, today))
            }
        }
    }
}

// =============================================================================
// Filters
// =============================================================================

/// Transactions retained by a date-aware filter
#[derive(Debug, Clone, Default)]
pub struct Filtered {
    pub transactions: Vec<Transaction>,
    /// Records skipped because their date could not be parsed
    pub dropped_dates: usize,
}

/// Keep transactions dated within `period`
pub fn filter_by_period(transactions: &[Transaction], period: &Period, today: NaiveDate) -> Filtered {
    let Some((start, end)) = period.bounds(today) else {
        tracing::warn!(?period, "invalid period, no transactions retained");
        return Filtered::default();
    };

    let mut out = Filtered::default();
    for tx in transactions {
        match tx.parsed_date() {
            Some(date) if date >= start && date <= end => out.transactions.push(tx.clone()),
            Some(_) => {}
            None => {
                warn_unparseable(tx);
                out.dropped_dates += 1;
            }
        }
    }
    out
}

/// Keep transactions belonging to one of `account_ids`; empty means all
pub fn filter_by_accounts(transactions: &[Transaction], account_ids: &[i64]) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| account_ids.is_empty() || account_ids.contains(&tx.account_id))
        .cloned()
        .collect()
}

/// Keep transactions with `min <= amount <= max`; a missing bound is open
pub fn filter_by_amount(
    transactions: &[Transaction],
    min: Option<Decimal>,
    max: Option<Decimal>,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| min.map_or(true, |m| tx.amount >= m))
        .filter(|tx| max.map_or(true, |m| tx.amount <= m))
        .cloned()
        .collect()
}

/// Keep transactions of the given type; `None` keeps everything
pub fn filter_by_type(
    transactions: &[Transaction],
    transaction_type: Option<&TransactionType>,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| transaction_type.map_or(true, |t| &tx.transaction_type == t))
        .cloned()
        .collect()
}

/// Keep transactions whose category label equals `category`
pub fn filter_by_category(transactions: &[Transaction], category: Option<&str>) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| category.map_or(true, |c| tx.category_label() == c))
        .cloned()
        .collect()
}

/// All client-side filters bundled, as selected in the stats view
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub period: Option<Period>,
    pub account_ids: Vec<i64>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub transaction_type: Option<TransactionType>,
    pub category: Option<String>,
}

impl TransactionFilter {
    /// Apply period, accounts, value range, type and category in that order
    pub fn apply(&self, transactions: &[Transaction], today: NaiveDate) -> Filtered {
        let mut out = match &self.period {
            Some(period) => filter_by_period(transactions, period, today),
            None => Filtered {
                transactions: transactions.to_vec(),
                dropped_dates: 0,
            },
        };

        out.transactions = filter_by_accounts(&out.transactions, &self.account_ids);
        out.transactions = filter_by_amount(&out.transactions, self.min_amount, self.max_amount);
        out.transactions = filter_by_type(&out.transactions, self.transaction_type.as_ref());
        out.transactions = filter_by_category(&out.transactions, self.category.as_deref());
        out
    }
}

// =============================================================================
// Summaries
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    #[serde(serialize_with = "serialize_amount")]
    pub total_income: Decimal,
    #[serde(serialize_with = "serialize_amount")]
    pub total_expenses: Decimal,
    #[serde(serialize_with = "serialize_amount")]
    pub net_income: Decimal,
}

pub fn compute_totals(transactions: &[Transaction]) -> Totals {
    let mut totals = Totals::default();
    for tx in transactions {
        match tx.transaction_type {
            TransactionType::Income => totals.total_income += tx.amount,
            TransactionType::Expense => totals.total_expenses += tx.amount,
            TransactionType::Other(_) => {}
        }
    }
    totals.net_income = totals.total_income - totals.total_expenses;
    totals
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    #[serde(serialize_with = "serialize_amount")]
    pub amount: Decimal,
    /// Share of total expenses, 0-100, one decimal place
    #[serde(serialize_with = "serialize_amount")]
    pub percentage: Decimal,
}

/// Expense totals per category, largest first
///
/// Equal amounts keep the order in which their category was first seen.
pub fn category_breakdown(transactions: &[Transaction]) -> Vec<CategoryShare> {
    let mut groups: Vec<(String, Decimal)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for tx in transactions.iter().filter(|tx| tx.transaction_type.is_expense()) {
        let label = tx.category_label();
        match index.get(label) {
            Some(&i) => groups[i].1 += tx.amount,
            None => {
                index.insert(label.to_string(), groups.len());
                groups.push((label.to_string(), tx.amount));
            }
        }
    }

    let total: Decimal = groups.iter().map(|(_, amount)| *amount).sum();
    let mut shares: Vec<CategoryShare> = groups
        .into_iter()
        .map(|(category, amount)| CategoryShare {
            percentage: percent(amount, total, 1),
            category,
            amount,
        })
        .collect();

    shares.sort_by(|a, b| b.amount.cmp(&a.amount));
    shares
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTrend {
    /// `YYYY-MM`
    pub month: String,
    #[serde(serialize_with = "serialize_amount")]
    pub income: Decimal,
    #[serde(serialize_with = "serialize_amount")]
    pub expense: Decimal,
    #[serde(serialize_with = "serialize_amount")]
    pub net: Decimal,
}

/// Income/expense per calendar month, oldest first
pub fn monthly_trend(transactions: &[Transaction]) -> Vec<MonthlyTrend> {
    group_by_month(transactions).0
}

fn group_by_month(transactions: &[Transaction]) -> (Vec<MonthlyTrend>, usize) {
    // YYYY-MM keys sort chronologically
    let mut months: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    let mut dropped = 0;

    for tx in transactions {
        let Some(date) = tx.parsed_date() else {
            warn_unparseable(tx);
            dropped += 1;
            continue;
        };
        let (income, expense) = match tx.transaction_type {
            TransactionType::Income => (tx.amount, Decimal::ZERO),
            TransactionType::Expense => (Decimal::ZERO, tx.amount),
            // Neither side of the ledger, so no month of its own
            TransactionType::Other(_) => continue,
        };
        let bucket = months.entry(date.format("%Y-%m").to_string()).or_default();
        bucket.0 += income;
        bucket.1 += expense;
    }

    let trend = months
        .into_iter()
        .map(|(month, (income, expense))| MonthlyTrend {
            month,
            income,
            expense,
            net: income - expense,
        })
        .collect();
    (trend, dropped)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PerformanceMetrics {
    /// Net income as a percentage of income
    #[serde(serialize_with = "serialize_amount")]
    pub savings_rate: Decimal,
    /// Expenses as a percentage of income
    #[serde(serialize_with = "serialize_amount")]
    pub expense_ratio: Decimal,
    /// Mean monthly net over the months present in the trend
    #[serde(serialize_with = "serialize_amount")]
    pub monthly_average: Decimal,
    #[serde(serialize_with = "serialize_amount")]
    pub largest_expense: Decimal,
    #[serde(serialize_with = "serialize_amount")]
    pub avg_daily_expense: Decimal,
}

pub fn performance_metrics(
    totals: &Totals,
    trend: &[MonthlyTrend],
    transactions: &[Transaction],
) -> PerformanceMetrics {
    let monthly_average = if trend.is_empty() {
        Decimal::ZERO
    } else {
        let sum: Decimal = trend.iter().map(|m| m.net).sum();
        sum / Decimal::from(trend.len())
    };

    let largest_expense = transactions
        .iter()
        .filter(|tx| tx.transaction_type.is_expense())
        .map(|tx| tx.amount)
        .max()
        .unwrap_or(Decimal::ZERO);

    let has_expenses = transactions.iter().any(|tx| tx.transaction_type.is_expense());
    let avg_daily_expense = if has_expenses {
        (totals.total_expenses / Decimal::from(DAYS_PER_MONTH)).round_dp(2)
    } else {
        Decimal::ZERO
    };

    PerformanceMetrics {
        savings_rate: percent(totals.net_income, totals.total_income, 1),
        expense_ratio: percent(totals.total_expenses, totals.total_income, 1),
        monthly_average,
        largest_expense,
        avg_daily_expense,
    }
}

/// Everything the stats view shows, derived in one pass over the list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionStats {
    #[serde(flatten)]
    pub totals: Totals,
    pub category_breakdown: Vec<CategoryShare>,
    pub monthly_trend: Vec<MonthlyTrend>,
    pub metrics: PerformanceMetrics,
    pub transaction_count: usize,
    pub dropped_dates: usize,
}

pub fn compute_stats(transactions: &[Transaction]) -> TransactionStats {
    let totals = compute_totals(transactions);
    let (monthly_trend, dropped_dates) = group_by_month(transactions);
    let metrics = performance_metrics(&totals, &monthly_trend, transactions);

    TransactionStats {
        totals,
        category_breakdown: category_breakdown(transactions),
        monthly_trend,
        metrics,
        transaction_count: transactions.len(),
        dropped_dates,
    }
}

/// Current-month card: totals, counts and how much of income was spent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
    #[serde(serialize_with = "serialize_amount")]
    pub total_income: Decimal,
    #[serde(serialize_with = "serialize_amount")]
    pub total_expenses: Decimal,
    #[serde(serialize_with = "serialize_amount")]
    pub net_balance: Decimal,
    pub income_count: usize,
    pub expense_count: usize,
    /// Expenses as a percentage of income, capped at 100
    #[serde(serialize_with = "serialize_amount")]
    pub spent_ratio: Decimal,
}

pub fn monthly_summary(transactions: &[Transaction]) -> MonthlySummary {
    let totals = compute_totals(transactions);
    let income_count = transactions
        .iter()
        .filter(|tx| tx.transaction_type.is_income())
        .count();
    let expense_count = transactions
        .iter()
        .filter(|tx| tx.transaction_type.is_expense())
        .count();

    MonthlySummary {
        total_income: totals.total_income,
        total_expenses: totals.total_expenses,
        net_balance: totals.net_income,
        income_count,
        expense_count,
        spent_ratio: percent(totals.total_expenses, totals.total_income, 1)
            .min(Decimal::ONE_HUNDRED),
    }
}

/// `100 * part / whole` rounded to `dp` places; zero when `whole` is zero
fn percent(part: Decimal, whole: Decimal, dp: u32) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(whole))
        .map(|p| p.round_dp(dp))
        .unwrap_or(Decimal::ZERO)
}

fn warn_unparseable(tx: &Transaction) {
    tracing::warn!(id = tx.id, date = %tx.date, "skipping transaction with unparseable date");
}
