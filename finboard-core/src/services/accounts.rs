//! Account service - account listing, renaming and balance history

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::result::{Error, Result};
use crate::domain::{Account, BalancePoint};
use crate::ports::Method;
use crate::services::api::ApiClient;
use crate::services::balance::fill_balance_series;
use crate::services::sequence::RequestSequencer;

pub struct AccountService {
    api: Arc<ApiClient>,
    sequencer: Arc<RequestSequencer>,
}

impl AccountService {
    pub fn new(api: Arc<ApiClient>, sequencer: Arc<RequestSequencer>) -> Self {
        Self { api, sequencer }
    }

    pub fn list(&self) -> Result<Vec<Account>> {
        self.api.get("accounts/", &[])
    }

    pub fn get(&self, id: i64) -> Result<Account> {
        self.list()?
            .into_iter()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::validation(format!("account {} not found", id)))
    }

    /// Rename an account; the name is trimmed and must not be empty
    pub fn rename(&self, id: i64, name: &str) -> Result<Account> {
        let name = Account::validate_name(name)?;
        let body = json!({ "name": name });
        let account: Account = self.api.send_as(
            Method::Patch,
            &format!("accounts/{}/name", id),
            Some(&body),
            &["accounts"],
        )?;
        tracing::info!(id, name = %account.name, "account renamed");
        Ok(account)
    }

    /// Sparse end-of-day balances for the last `days` days, as served
    pub fn balance_history(&self, id: i64, days: u32) -> Result<Vec<BalancePoint>> {
        self.api.get(
            &format!("accounts/{}/balance-history", id),
            &[("days", days.to_string())],
        )
    }

    /// Dense `days`-point series ending at `today` for each account
    ///
    /// Histories are fetched in parallel. A response that was superseded
    /// by a newer request for the same account while in flight is dropped,
    /// so that account is missing from the result. Any fetch error fails
    /// the whole call.
    pub fn balance_series(
        &self,
        account_ids: &[i64],
        days: u32,
        today: NaiveDate,
    ) -> Result<BTreeMap<i64, Vec<BalancePoint>>> {
        let results: Vec<(i64, Result<Option<Vec<BalancePoint>>>)> = thread::scope(|scope| {
            let handles: Vec<_> = account_ids
                .iter()
                .map(|&id| {
                    let ticket = self.sequencer.begin(&format!("balance-history:{}", id));
                    let handle = scope.spawn(move || {
                        self.balance_history(id, days)
                            .map(|points| self.sequencer.accept(&ticket, points))
                    });
                    (id, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(id, handle)| {
                    let result = handle.join().unwrap_or_else(|_| {
                        Err(Error::Other(format!("balance history worker for account {} panicked", id)))
                    });
                    (id, result)
                })
                .collect()
        });

        let mut series = BTreeMap::new();
        for (id, result) in results {
            if let Some(points) = result? {
                series.insert(id, fill_balance_series(&points, today, days));
            }
        }
        Ok(series)
    }
}
