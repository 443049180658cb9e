//! Savings goal domain model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::serialize_amount;

/// What a goal is saving for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalCategory {
    #[default]
    Savings,
    House,
    Car,
    Education,
    Travel,
    Emergency,
}

impl GoalCategory {
    pub const ALL: [GoalCategory; 6] = [
        GoalCategory::Savings,
        GoalCategory::House,
        GoalCategory::Car,
        GoalCategory::Education,
        GoalCategory::Travel,
        GoalCategory::Emergency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalCategory::Savings => "savings",
            GoalCategory::House => "house",
            GoalCategory::Car => "car",
            GoalCategory::Education => "education",
            GoalCategory::Travel => "travel",
            GoalCategory::Emergency => "emergency",
        }
    }
}

impl FromStr for GoalCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| {
                Error::validation(format!(
                    "unknown goal category '{}', expected savings, house, car, education, travel or emergency",
                    s
                ))
            })
    }
}

impl fmt::Display for GoalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A savings goal tracked locally in goals.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: GoalCategory,
    #[serde(serialize_with = "serialize_amount")]
    pub target_amount: Decimal,
    #[serde(default, serialize_with = "serialize_amount")]
    pub current_amount: Decimal,
    pub target_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Share of the target reached, 0-100, one decimal place
    pub fn progress_percentage(&self) -> Decimal {
        if self.target_amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let pct = self
            .current_amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.checked_div(self.target_amount))
            .unwrap_or(Decimal::ONE_HUNDRED);
        pct.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED).round_dp(1)
    }

    /// Days from `today` until the target date; negative once it has passed
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.target_date - today).num_days()
    }

    pub fn is_completed(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed() && self.days_remaining(today) < 0
    }

    /// Amount still missing to reach the target
    pub fn remaining_amount(&self) -> Decimal {
        (self.target_amount - self.current_amount).max(Decimal::ZERO)
    }
}

/// Form input for creating or replacing a goal
#[derive(Debug, Clone, PartialEq)]
pub struct GoalDraft {
    pub title: String,
    pub description: String,
    pub category: GoalCategory,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub target_date: NaiveDate,
}

impl GoalDraft {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::validation("goal title cannot be empty"));
        }
        if self.target_amount <= Decimal::ZERO {
            return Err(Error::validation("target amount must be greater than zero"));
        }
        if self.current_amount < Decimal::ZERO {
            return Err(Error::validation("current amount cannot be negative"));
        }
        Ok(())
    }
}

impl From<&Goal> for GoalDraft {
    fn from(goal: &Goal) -> Self {
        Self {
            title: goal.title.clone(),
            description: goal.description.clone(),
            category: goal.category,
            target_amount: goal.target_amount,
            current_amount: goal.current_amount,
            target_date: goal.target_date,
        }
    }
}
