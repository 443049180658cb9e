//! Account domain model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::serialize_amount;

/// A financial account as served by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    #[serde(default, serialize_with = "serialize_amount")]
    pub balance: Decimal,
}

impl Account {
    pub fn new(id: i64, name: impl Into<String>, balance: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            balance,
        }
    }

    /// Validate a new account name before renaming
    pub fn validate_name(name: &str) -> Result<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("account name cannot be empty"));
        }
        Ok(trimmed.to_string())
    }
}

/// Health endpoint payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}
