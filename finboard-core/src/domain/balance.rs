//! Balance history domain model

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::serialize_amount;

/// End-of-day balance of an account
///
/// The API returns these sparsely (one per day with activity); the dense
/// series produced by the balance service uses the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancePoint {
    pub date: NaiveDate,
    #[serde(serialize_with = "serialize_amount")]
    pub balance: Decimal,
}

impl BalancePoint {
    pub fn new(date: NaiveDate, balance: Decimal) -> Self {
        Self { date, balance }
    }
}
