//! Finboard Core - data layer for the personal finance dashboard
//!
//! This crate implements the core logic following hexagonal architecture:
//!
//! - **domain**: Core entities (Account, Transaction, BalancePoint, Goal)
//! - **ports**: Trait definitions for external dependencies (HttpTransport, Clock)
//! - **services**: Query cache, aggregation engine and API-bound services
//! - **adapters**: Concrete implementations (reqwest transport)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;

use std::path::Path;
use std::sync::Arc;

use adapters::ReqwestTransport;
use config::Config;
use ports::{Clock, HttpTransport, SystemClock};
use services::*;

// Re-export commonly used types at crate root
pub use domain::{Account, BalancePoint, HealthStatus, NewTransaction, Transaction, TransactionType};
pub use domain::result::{Error, Result};

/// Main context for Finboard operations
///
/// This is the primary entry point for all business logic. It holds the
/// configuration, the shared query cache and all services.
pub struct FinboardContext {
    pub config: Config,
    pub clock: Arc<dyn Clock>,
    pub api: Arc<ApiClient>,
    pub account_service: AccountService,
    pub transaction_service: TransactionService,
    pub status_service: StatusService,
}

impl FinboardContext {
    /// Create a new Finboard context talking to the configured API
    pub fn new(finboard_dir: &Path) -> Result<Self> {
        let config = Config::load(finboard_dir)?;
        let transport = Arc::new(ReqwestTransport::new(config.request_timeout)?);
        Ok(Self::with_transport(config, transport, Arc::new(SystemClock)))
    }

    /// Build a context around an explicit transport and clock
    pub fn with_transport(
        config: Config,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = Arc::new(
            QueryCache::new(Arc::clone(&transport))
                .with_ttl(config.cache_ttl)
                .with_clock(Arc::clone(&clock)),
        );
        let api = Arc::new(ApiClient::new(config.api_url.clone(), transport, cache));
        let sequencer = Arc::new(RequestSequencer::new());

        tracing::debug!(api_url = %config.api_url, ttl_secs = config.cache_ttl.as_secs(), "finboard context ready");

        Self {
            account_service: AccountService::new(Arc::clone(&api), sequencer),
            transaction_service: TransactionService::new(Arc::clone(&api)),
            status_service: StatusService::new(Arc::clone(&api)),
            config,
            clock,
            api,
        }
    }

    /// Calendar date used as "today" by period presets and balance windows
    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.today()
    }
}
