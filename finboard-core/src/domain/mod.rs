//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod account;
pub mod balance;
mod goal;
pub mod result;
mod transaction;

pub use account::{Account, HealthStatus};
pub use balance::BalancePoint;
pub use goal::{Goal, GoalCategory, GoalDraft};
pub use transaction::{parse_date, NewTransaction, Transaction, TransactionType, UNCATEGORIZED};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serializer;

/// Amounts go over the wire as JSON numbers, matching the API's float fields
pub(crate) fn serialize_amount<S: Serializer>(
    amount: &Decimal,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(amount.to_f64().unwrap_or(0.0))
}
