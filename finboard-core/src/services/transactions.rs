//! Transaction service - listing, mutations and derived stats

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};
use crate::domain::{NewTransaction, Transaction, TransactionType};
use crate::ports::Method;
use crate::services::aggregation::{self, MonthlySummary, TransactionFilter, TransactionStats};
use crate::services::api::ApiClient;

/// Server-side page size (the API's default `limit`)
pub const PAGE_SIZE: u32 = 100;

/// Cache prefixes touched by any transaction mutation; balances change too
const TRANSACTION_KEYS: &[&str] = &["transactions", "accounts"];

/// Server-side filters for `GET /transactions/`
///
/// Only the fields that are set are sent as query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub transaction_type: Option<TransactionType>,
    pub category: Option<String>,
    pub account_id: Option<i64>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

impl TransactionQuery {
    pub fn for_month(month: u32, year: i32) -> Self {
        Self {
            month: Some(month),
            year: Some(year),
            ..Default::default()
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(skip) = self.skip {
            params.push(("skip", skip.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(month) = self.month {
            params.push(("month", month.to_string()));
        }
        if let Some(year) = self.year {
            params.push(("year", year.to_string()));
        }
        if let Some(t) = &self.transaction_type {
            params.push(("transaction_type", t.as_wire().to_string()));
        }
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        if let Some(account_id) = self.account_id {
            params.push(("account_id", account_id.to_string()));
        }
        if let Some(min) = self.min_amount {
            params.push(("min_amount", min.to_string()));
        }
        if let Some(max) = self.max_amount {
            params.push(("max_amount", max.to_string()));
        }
        params
    }
}

pub struct TransactionService {
    api: Arc<ApiClient>,
}

impl TransactionService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// One page of transactions matching `query`
    pub fn list(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        self.api.get("transactions/", &query.params())
    }

    /// Every transaction matching `query`, following `skip`/`limit` pages
    ///
    /// `query.skip` is the starting offset; `query.limit` (default
    /// [`PAGE_SIZE`]) is the page size. Stops at the first short page, at
    /// a page identical to the previous one (a server ignoring `skip`), or
    /// when the offset would overflow.
    pub fn list_all(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        let limit = query.limit.unwrap_or(PAGE_SIZE).max(1);
        let mut skip = query.skip.unwrap_or(0);
        let mut all = Vec::new();
        let mut previous_ids: Vec<i64> = Vec::new();

        loop {
            let page_query = TransactionQuery {
                skip: Some(skip),
                limit: Some(limit),
                ..query.clone()
            };
            let page = self.list(&page_query)?;
            let fetched = page.len();

            let ids: Vec<i64> = page.iter().map(|tx| tx.id).collect();
            if fetched > 0 && ids == previous_ids {
                tracing::warn!(skip, limit, "server repeated the previous page, stopping pagination");
                break;
            }
            all.extend(page);

            if fetched < limit as usize {
                break;
            }
            match skip.checked_add(limit) {
                Some(next) => skip = next,
                None => {
                    tracing::warn!(skip, limit, "page offset overflow, stopping pagination");
                    break;
                }
            }
            previous_ids = ids;
        }

        tracing::debug!(count = all.len(), "fetched all transactions");
        Ok(all)
    }

    pub fn create(&self, payload: &NewTransaction) -> Result<Transaction> {
        payload.validate()?;
        let body = serde_json::to_value(payload)?;
        let created: Transaction = self.api.send_as(
            Method::Post,
            "transactions/",
            Some(&body),
            TRANSACTION_KEYS,
        )?;
        tracing::info!(id = created.id, "transaction created");
        Ok(created)
    }

    pub fn update(&self, id: i64, payload: &NewTransaction) -> Result<Transaction> {
        payload.validate()?;
        let body = serde_json::to_value(payload)?;
        let updated: Transaction = self.api.send_as(
            Method::Put,
            &format!("transactions/{}", id),
            Some(&body),
            TRANSACTION_KEYS,
        )?;
        tracing::info!(id, "transaction updated");
        Ok(updated)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.api.send(
            Method::Delete,
            &format!("transactions/{}", id),
            None,
            TRANSACTION_KEYS,
        )?;
        tracing::info!(id, "transaction deleted");
        Ok(())
    }

    /// Look up a single transaction by id among all transactions
    pub fn find(&self, id: i64) -> Result<Transaction> {
        self.list_all(&TransactionQuery::default())?
            .into_iter()
            .find(|tx| tx.id == id)
            .ok_or_else(|| Error::validation(format!("transaction {} not found", id)))
    }

    /// Fetch everything, apply `filter` client-side and aggregate
    pub fn stats(&self, filter: &TransactionFilter, today: NaiveDate) -> Result<TransactionStats> {
        let transactions = self.list_all(&TransactionQuery::default())?;
        let filtered = filter.apply(&transactions, today);

        let mut stats = aggregation::compute_stats(&filtered.transactions);
        stats.dropped_dates += filtered.dropped_dates;
        Ok(stats)
    }

    /// Totals for one calendar month, filtered server-side
    pub fn monthly_summary(&self, month: u32, year: i32) -> Result<MonthlySummary> {
        if !(1..=12).contains(&month) {
            return Err(Error::validation(format!("invalid month {}", month)));
        }
        let transactions = self.list_all(&TransactionQuery::for_month(month, year))?;
        Ok(aggregation::monthly_summary(&transactions))
    }

    /// Raw export blob, never cached
    pub fn export(&self) -> Result<JsonValue> {
        self.api.get_uncached("export")
    }
}
