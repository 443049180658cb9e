//! Status service - API health and account overview

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::{serialize_amount, Account, HealthStatus};
use crate::services::api::ApiClient;

pub struct StatusService {
    api: Arc<ApiClient>,
}

impl StatusService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub fn health(&self) -> Result<HealthStatus> {
        self.api.get("health", &[])
    }

    /// Overall status; an unreachable API is reported, not returned as an error
    pub fn get_status(&self) -> StatusSummary {
        let mut summary = StatusSummary {
            api_url: self.api.base_url().to_string(),
            healthy: false,
            service: None,
            error: None,
            accounts: Vec::new(),
            total_balance: Decimal::ZERO,
            cached_entries: 0,
        };

        match self.health() {
            Ok(health) => {
                summary.healthy = health.is_healthy();
                summary.service = health.service;
            }
            Err(e) => {
                tracing::warn!(error = %e, "health check failed");
                summary.error = Some(e.to_string());
                return summary;
            }
        }

        match self.api.get::<Vec<Account>>("accounts/", &[]) {
            Ok(accounts) => {
                summary.total_balance = accounts.iter().map(|a| a.balance).sum();
                summary.accounts = accounts
                    .into_iter()
                    .map(|a| AccountSummary {
                        id: a.id,
                        name: a.name,
                        balance: a.balance,
                    })
                    .collect();
            }
            Err(e) => summary.error = Some(e.to_string()),
        }

        summary.cached_entries = self.api.cache().len();
        summary
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub api_url: String,
    pub healthy: bool,
    pub service: Option<String>,
    pub error: Option<String>,
    pub accounts: Vec<AccountSummary>,
    #[serde(serialize_with = "serialize_amount")]
    pub total_balance: Decimal,
    pub cached_entries: usize,
}

#[derive(Debug, Serialize)]
pub struct AccountSummary {
    pub id: i64,
    pub name: String,
    #[serde(serialize_with = "serialize_amount")]
    pub balance: Decimal,
}
