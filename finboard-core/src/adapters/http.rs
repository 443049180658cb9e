//! Dashboard API transport over reqwest
//!
//! Blocking client with a request timeout; maps transport failures, status
//! codes and body decoding onto the core error taxonomy.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};
use crate::ports::{HttpTransport, Method};

const UA: &str = concat!("finboard/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed implementation of [`HttpTransport`]
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(UA)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    fn execute(&self, url: &str, request: RequestBuilder) -> Result<JsonValue> {
        let response = request.send().map_err(|e| self.map_request_error(url, e))?;
        Self::check_response_status(url, &response)?;
        Self::decode_body(url, response)
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, url: &str, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::network(format!(
                "Request to {} timed out after {} seconds",
                url,
                self.timeout.as_secs()
            ))
        } else if error.is_connect() {
            Error::network(format!("Unable to connect to {}", url))
        } else {
            Error::network(format!("Request to {} failed: {}", url, error))
        }
    }

    fn check_response_status(url: &str, response: &Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::request(status.as_u16(), url))
        }
    }

    fn decode_body(url: &str, response: Response) -> Result<JsonValue> {
        let body = response
            .text()
            .map_err(|e| Error::network(format!("Failed to read response from {}: {}", url, e)))?;

        if body.trim().is_empty() {
            return Ok(JsonValue::Null);
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::parse(format!("Invalid JSON from {}: {}", url, e)))
    }
}

impl HttpTransport for ReqwestTransport {
    fn get_json(&self, url: &str) -> Result<JsonValue> {
        tracing::debug!(url, "GET");
        self.execute(url, self.client.get(url))
    }

    fn send_json(&self, method: Method, url: &str, body: Option<&JsonValue>) -> Result<JsonValue> {
        tracing::debug!(url, %method, "sending mutation");
        let mut request = match method {
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Patch => self.client.patch(url),
            Method::Delete => self.client.delete(url),
        };
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(url, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_refused_is_network_error() {
        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        // Port 9 (discard) is essentially never listening on loopback
        let err = transport.get_json("http://127.0.0.1:9/health").unwrap_err();
        assert!(matches!(err, Error::Network(_)), "got {:?}", err);
        assert_eq!(err.status(), None);
    }
}
