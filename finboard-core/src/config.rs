//! Configuration management
//!
//! Settings live in `settings.json` inside the finboard directory:
//! ```json
//! {
//!   "api": { "baseUrl": "http://localhost:8000", "timeoutSecs": 30 },
//!   "cache": { "ttlSecs": 30 },
//!   "balance": { "historyDays": 30 }
//! }
//! ```
//! Fields the CLI does not manage are preserved when saving.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30;
pub const DEFAULT_HISTORY_DAYS: u32 = 30;

pub const ENV_API_URL: &str = "FINBOARD_API_URL";
pub const ENV_CACHE_TTL: &str = "FINBOARD_CACHE_TTL_SECS";

pub const KEY_API_URL: &str = "api-url";
pub const KEY_TIMEOUT: &str = "timeout-secs";
pub const KEY_CACHE_TTL: &str = "cache-ttl-secs";
pub const KEY_HISTORY_DAYS: &str = "history-days";

/// Keys accepted by [`Config::get`] and [`Config::set`]
pub const CONFIG_KEYS: &[&str] = &[KEY_API_URL, KEY_TIMEOUT, KEY_CACHE_TTL, KEY_HISTORY_DAYS];

const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    api: ApiSettings,
    #[serde(default)]
    cache: CacheSettings,
    #[serde(default)]
    balance: BalanceSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    history_days: Option<u32>,
}

/// Finboard configuration (resolved view of settings plus env overrides)
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
    pub history_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }
}

impl Config {
    /// Load config from the finboard directory, applying env overrides
    ///
    /// The API URL can be overridden with FINBOARD_API_URL and the cache TTL
    /// with FINBOARD_CACHE_TTL_SECS.
    pub fn load(finboard_dir: &Path) -> Result<Self> {
        Self::load_with_env(finboard_dir, |key| std::env::var(key).ok())
    }

    /// Like [`Config::load`] but with an explicit environment lookup
    pub fn load_with_env<F>(finboard_dir: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::from_settings(read_settings(finboard_dir)?);

        if let Some(url) = env(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config.api_url = url.trim().to_string();
        }
        if let Some(ttl) = env(ENV_CACHE_TTL) {
            let secs: u64 = ttl.trim().parse().map_err(|_| {
                Error::Config(format!("{} must be a whole number of seconds, got '{}'", ENV_CACHE_TTL, ttl))
            })?;
            config.cache_ttl = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Settings as stored on disk, without env overrides or validation
    ///
    /// This is the view to edit and save: an override set in the
    /// environment never leaks into settings.json, and `set` can still
    /// repair a file holding a bad value.
    pub fn load_file(finboard_dir: &Path) -> Result<Self> {
        Ok(Self::from_settings(read_settings(finboard_dir)?))
    }

    fn from_settings(raw: SettingsFile) -> Self {
        Self {
            api_url: raw
                .api
                .base_url
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            request_timeout: Duration::from_secs(
                raw.api.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            cache_ttl: Duration::from_secs(raw.cache.ttl_secs.unwrap_or(DEFAULT_CACHE_TTL_SECS)),
            history_days: raw.balance.history_days.unwrap_or(DEFAULT_HISTORY_DAYS),
        }
    }

    /// Current value of a settable key, as shown by `fb config`
    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            KEY_API_URL => Ok(self.api_url.clone()),
            KEY_TIMEOUT => Ok(self.request_timeout.as_secs().to_string()),
            KEY_CACHE_TTL => Ok(self.cache_ttl.as_secs().to_string()),
            KEY_HISTORY_DAYS => Ok(self.history_days.to_string()),
            other => Err(unknown_key(other)),
        }
    }

    /// Change one setting; the result is validated before it is kept
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        let mut updated = self.clone();
        match key {
            KEY_API_URL => updated.api_url = value.trim_end_matches('/').to_string(),
            KEY_TIMEOUT => updated.request_timeout = Duration::from_secs(parse_number(key, value)?),
            KEY_CACHE_TTL => updated.cache_ttl = Duration::from_secs(parse_number(key, value)?),
            KEY_HISTORY_DAYS => updated.history_days = parse_number(key, value)?,
            other => return Err(unknown_key(other)),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Save config to the finboard directory
    ///
    /// The file is re-read first so fields the CLI does not manage survive.
    pub fn save(&self, finboard_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(finboard_dir)?;
        let mut settings = read_settings(finboard_dir)?;

        settings.api.base_url = Some(self.api_url.clone());
        settings.api.timeout_secs = Some(self.request_timeout.as_secs());
        settings.cache.ttl_secs = Some(self.cache_ttl.as_secs());
        settings.balance.history_days = Some(self.history_days);

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(finboard_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api_url)
            .map_err(|e| Error::Config(format!("Invalid API URL '{}': {}", self.api_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "API URL must use http or https, got '{}'",
                self.api_url
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::Config("Request timeout must be greater than zero".into()));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a whole number, got '{}'", key, value)))
}

fn unknown_key(key: &str) -> Error {
    Error::Config(format!(
        "unknown setting '{}', expected one of: {}",
        key,
        CONFIG_KEYS.join(", ")
    ))
}

fn read_settings(finboard_dir: &Path) -> Result<SettingsFile> {
    let settings_path = finboard_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }

    let content = std::fs::read_to_string(&settings_path)?;
    match serde_json::from_str(&content) {
        Ok(settings) => Ok(settings),
        Err(e) => {
            tracing::warn!(path = %settings_path.display(), error = %e, "ignoring unreadable settings file");
            Ok(SettingsFile::default())
        }
    }
}
