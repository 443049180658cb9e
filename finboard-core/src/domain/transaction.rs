//! Transaction domain model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::serialize_amount;

/// Label used for expenses without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Direction of a transaction
///
/// The dashboard API spells these "entrada" / "saida". Both the wire
/// spelling and the English names are accepted on input; anything else is
/// kept verbatim in `Other` so a single odd record never fails a list
/// decode. `Other` counts as neither income nor expense.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionType {
    Income,
    Expense,
    Other(String),
}

impl TransactionType {
    /// Spelling used by the dashboard API
    pub fn as_wire(&self) -> &str {
        match self {
            TransactionType::Income => "entrada",
            TransactionType::Expense => "saida",
            TransactionType::Other(s) => s,
        }
    }

    pub fn is_income(&self) -> bool {
        matches!(self, TransactionType::Income)
    }

    pub fn is_expense(&self) -> bool {
        matches!(self, TransactionType::Expense)
    }
}

impl From<String> for TransactionType {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "entrada" | "income" => TransactionType::Income,
            "saida" | "saída" | "expense" => TransactionType::Expense,
            _ => TransactionType::Other(value),
        }
    }
}

impl From<TransactionType> for String {
    fn from(value: TransactionType) -> Self {
        value.as_wire().to_string()
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match TransactionType::from(s.to_string()) {
            TransactionType::Other(_) => Err(Error::validation(format!(
                "unknown transaction type '{}', expected income or expense",
                s
            ))),
            known => Ok(known),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Income => write!(f, "income"),
            TransactionType::Expense => write!(f, "expense"),
            TransactionType::Other(s) => write!(f, "{}", s),
        }
    }
}

/// A single financial transaction as served by the API
///
/// `date` is kept as the raw string from the payload and parsed on demand,
/// so records with malformed dates survive decoding and are dropped only by
/// the aggregations that need a date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: String,
    #[serde(default)]
    pub description: String,
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub category: Option<String>,
    /// Always non-negative; direction comes from `transaction_type`
    #[serde(serialize_with = "serialize_amount")]
    pub amount: Decimal,
    pub account_id: i64,
}

impl Transaction {
    /// Create a new transaction with required fields
    pub fn new(
        id: i64,
        date: impl Into<String>,
        transaction_type: TransactionType,
        amount: Decimal,
        account_id: i64,
    ) -> Self {
        Self {
            id,
            date: date.into(),
            description: String::new(),
            transaction_type,
            category: None,
            amount,
            account_id,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Calendar date of the transaction, or None if `date` is unparseable
    ///
    /// Accepts RFC 3339 timestamps (converted to the UTC date), naive
    /// timestamps with `T` or space separator, and plain `YYYY-MM-DD`.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }

    /// Category label used for grouping
    pub fn category_label(&self) -> &str {
        match self.category.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => UNCATEGORIZED,
        }
    }
}

/// Parse the date formats the API is known to emit
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Payload for creating or replacing a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub date: NaiveDateTime,
    pub description: String,
    pub transaction_type: TransactionType,
    pub category: String,
    #[serde(serialize_with = "serialize_amount")]
    pub amount: Decimal,
    pub account_id: i64,
}

impl NewTransaction {
    /// Validate form input before it is sent to the API
    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(Error::validation("description cannot be empty"));
        }
        if self.amount <= Decimal::ZERO {
            return Err(Error::validation("amount must be greater than zero"));
        }
        if let TransactionType::Other(t) = &self.transaction_type {
            return Err(Error::validation(format!("unknown transaction type '{}'", t)));
        }
        Ok(())
    }
}
