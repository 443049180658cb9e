//! Output formatting utilities

use std::time::Duration;

use colored::{ColoredString, Colorize};
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;

use finboard_core::TransactionType;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Two decimal places, the way the dashboard shows money
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

/// Amount prefixed and coloured by direction
pub fn signed_amount(amount: Decimal, transaction_type: &TransactionType) -> ColoredString {
    match transaction_type {
        TransactionType::Income => format!("+{}", format_amount(amount)).green(),
        TransactionType::Expense => format!("-{}", format_amount(amount)).red(),
        TransactionType::Other(_) => format_amount(amount).normal(),
    }
}

/// Green when non-negative, red otherwise
pub fn balance_amount(amount: Decimal) -> ColoredString {
    if amount.is_sign_negative() && !amount.is_zero() {
        format_amount(amount).red()
    } else {
        format_amount(amount).green()
    }
}

pub fn format_percent(value: Decimal) -> String {
    format!("{:.1}%", value)
}

/// Spinner on stderr while waiting for the API; hidden when stderr is not a terminal
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
