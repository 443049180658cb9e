//! API client - endpoint resolution over the cache and transport
//!
//! Reads go through the shared [`QueryCache`]; mutations go straight to the
//! transport and are followed by coarse invalidation of the affected key
//! prefixes. Domain services build on this rather than on the transport.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};
use crate::ports::{HttpTransport, Method};
use crate::services::cache::QueryCache;

pub struct ApiClient {
    base_url: String,
    cache: Arc<QueryCache>,
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        cache: Arc<QueryCache>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            cache,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Absolute URL for an API path such as `transactions/` or `accounts/3/name`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Cached GET, decoded into `T`
    pub fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        self.cache.fetch_as(&self.endpoint(path), params)
    }

    /// GET that bypasses the cache entirely
    pub fn get_uncached(&self, path: &str) -> Result<JsonValue> {
        self.transport.get_json(&self.endpoint(path))
    }

    /// Mutating request; on success, evicts every key containing one of `invalidates`
    ///
    /// Nothing is evicted when the request fails.
    pub fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&JsonValue>,
        invalidates: &[&str],
    ) -> Result<JsonValue> {
        let url = self.endpoint(path);
        let response = self.transport.send_json(method, &url, body)?;
        for pattern in invalidates {
            self.cache.clear(Some(pattern));
        }
        Ok(response)
    }

    /// `send` followed by decoding the response into `T`
    pub fn send_as<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&JsonValue>,
        invalidates: &[&str],
    ) -> Result<T> {
        let response = self.send(method, path, body, invalidates)?;
        serde_json::from_value(response)
            .map_err(|e| Error::parse(format!("Unexpected response from {}: {}", path, e)))
    }
}
