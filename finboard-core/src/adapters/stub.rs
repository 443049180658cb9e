//! In-memory transport for unit tests
//!
//! Responses are registered per (method, url-without-query); every call is
//! recorded so tests can assert how many network round trips happened.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};
use crate::ports::{HttpTransport, Method};

#[derive(Debug, Clone)]
enum StubResponse {
    Json(JsonValue),
    Status(u16),
}

/// A recorded request
#[derive(Debug, Clone, PartialEq)]
pub struct StubCall {
    pub method: String,
    pub url: String,
    pub body: Option<JsonValue>,
}

#[derive(Debug, Default)]
pub struct StubTransport {
    responses: Mutex<HashMap<(String, String), StubResponse>>,
    calls: Mutex<Vec<StubCall>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_get(&self, url: &str, body: JsonValue) {
        self.register("GET", url, StubResponse::Json(body));
    }

    pub fn fail_get(&self, url: &str, status: u16) {
        self.register("GET", url, StubResponse::Status(status));
    }

    pub fn on_send(&self, method: Method, url: &str, body: JsonValue) {
        self.register(&method.to_string(), url, StubResponse::Json(body));
    }

    pub fn fail_send(&self, method: Method, url: &str, status: u16) {
        self.register(&method.to_string(), url, StubResponse::Status(status));
    }

    pub fn calls(&self) -> Vec<StubCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of GET requests whose url (query included) starts with `prefix`
    pub fn get_count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == "GET" && c.url.starts_with(prefix))
            .count()
    }

    fn register(&self, method: &str, url: &str, response: StubResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), url.to_string()), response);
    }

    fn respond(&self, method: &str, url: &str, body: Option<&JsonValue>) -> Result<JsonValue> {
        self.calls.lock().unwrap().push(StubCall {
            method: method.to_string(),
            url: url.to_string(),
            body: body.cloned(),
        });

        let path = url.split('?').next().unwrap_or(url);
        let response = self
            .responses
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned();

        match response {
            Some(StubResponse::Json(v)) => Ok(v),
            Some(StubResponse::Status(status)) => Err(Error::request(status, url)),
            None => Err(Error::request(404, url)),
        }
    }
}

impl HttpTransport for StubTransport {
    fn get_json(&self, url: &str) -> Result<JsonValue> {
        self.respond("GET", url, None)
    }

    fn send_json(&self, method: Method, url: &str, body: Option<&JsonValue>) -> Result<JsonValue> {
        self.respond(&method.to_string(), url, body)
    }
}
