//! Query cache - time-boxed memoization of API reads
//!
//! Entries are keyed by URL plus a canonical (sorted) query string and are
//! valid for a fixed TTL. Expired entries are purged lazily on access.
//! Invalidation is coarse: `clear(Some(pattern))` drops every key that
//! contains `pattern` as a substring.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use url::form_urlencoded;

use crate::domain::result::{Error, Result};
use crate::ports::{Clock, HttpTransport, SystemClock};

/// How long a cached read stays fresh
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// Outcome of a cache lookup
///
/// `Miss` is distinct from any cached value, including `null`, `0` or `[]`.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<T> {
    Hit(T),
    Miss,
}

impl<T> CacheLookup<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            CacheLookup::Hit(v) => Some(v),
            CacheLookup::Miss => None,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: JsonValue,
    fetched_at: DateTime<Utc>,
}

/// Memoizing front for GET requests
pub struct QueryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
    transport: Arc<dyn HttpTransport>,
}

impl QueryCache {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: to_chrono(DEFAULT_CACHE_TTL),
            clock: Arc::new(SystemClock),
            transport,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = to_chrono(ttl);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the canonical key for a request
    ///
    /// Parameters are sorted by name (stable, so repeated names keep their
    /// relative order) and form-urlencoded. The result is also the URL that
    /// gets requested on a miss.
    pub fn key<K, V>(url: &str, params: &[(K, V)]) -> String
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut sorted: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_ref(), v.as_ref()))
            .collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(sorted)
            .finish();

        if query.is_empty() {
            url.to_string()
        } else {
            format!("{}?{}", url, query)
        }
    }

    /// Look up a fresh entry; a stale one is evicted and reported as a miss
    pub fn get(&self, key: &str) -> CacheLookup<JsonValue> {
        let now = self.clock.now();
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if self.is_fresh(entry, now) => {
                tracing::trace!(key, "cache hit");
                CacheLookup::Hit(entry.payload.clone())
            }
            Some(_) => {
                entries.remove(key);
                tracing::debug!(key, "cache entry expired");
                CacheLookup::Miss
            }
            None => CacheLookup::Miss,
        }
    }

    /// Store `payload` under `key` with a fresh timestamp
    pub fn set(&self, key: impl Into<String>, payload: JsonValue) {
        let entry = CacheEntry {
            payload,
            fetched_at: self.clock.now(),
        };
        self.lock().insert(key.into(), entry);
    }

    /// Evict entries whose key contains `pattern`, or everything when `None`
    ///
    /// Returns the number of entries removed.
    pub fn clear(&self, pattern: Option<&str>) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        match pattern {
            Some(p) => entries.retain(|key, _| !key.contains(p)),
            None => entries.clear(),
        }
        let removed = before - entries.len();
        tracing::debug!(pattern = pattern.unwrap_or("*"), removed, "cache cleared");
        removed
    }

    /// Number of live entries (expired ones are purged first)
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        entries.retain(|_, entry| now.signed_duration_since(entry.fetched_at) < self.ttl);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the cached payload for `(url, params)` or fetch and cache it
    ///
    /// Failures (transport, status, body) are returned as-is and leave the
    /// cache untouched. No retry is attempted.
    pub fn fetch_with_cache<K, V>(&self, url: &str, params: &[(K, V)]) -> Result<JsonValue>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let key = Self::key(url, params);
        if let CacheLookup::Hit(payload) = self.get(&key) {
            return Ok(payload);
        }

        tracing::debug!(key = %key, "cache miss, fetching");
        let payload = self.transport.get_json(&key)?;
        self.set(key, payload.clone());
        Ok(payload)
    }

    /// `fetch_with_cache` followed by decoding into `T`
    pub fn fetch_as<T, K, V>(&self, url: &str, params: &[(K, V)]) -> Result<T>
    where
        T: DeserializeOwned,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let payload = self.fetch_with_cache(url, params)?;
        serde_json::from_value(payload)
            .map_err(|e| Error::parse(format!("Unexpected payload from {}: {}", url, e)))
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.fetched_at) < self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // Entries are plain data; a panic elsewhere cannot leave them torn
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn to_chrono(ttl: Duration) -> chrono::Duration {
    chrono::Duration::milliseconds(ttl.as_millis().min(i64::MAX as u128) as i64)
}
