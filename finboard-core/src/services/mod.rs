//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. The cache,
//! sequencer, aggregation and balance modules are the reusable core; the
//! account, transaction and status services bind them to API endpoints;
//! goals are stored locally.

mod accounts;
pub mod aggregation;
pub mod api;
pub mod balance;
pub mod cache;
mod goals;
pub mod sequence;
mod status;
mod transactions;

pub use accounts::AccountService;
pub use aggregation::{
    compute_stats, CategoryShare, Filtered, MonthlySummary, MonthlyTrend, PerformanceMetrics,
    Period, PeriodPreset, Totals, TransactionFilter, TransactionStats,
};
pub use api::ApiClient;
pub use balance::{align_series, fill_balance_series};
pub use cache::{CacheLookup, QueryCache, DEFAULT_CACHE_TTL};
pub use goals::{GoalService, GOALS_FILE};
pub use sequence::{RequestSequencer, Ticket};
pub use status::{AccountSummary, StatusService, StatusSummary};
pub use transactions::{TransactionQuery, TransactionService, PAGE_SIZE};
