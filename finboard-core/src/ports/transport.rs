//! HTTP transport port
//!
//! Defines how the core talks to the dashboard API. The query cache and the
//! API facade depend only on this trait; the reqwest adapter is the
//! production implementation.

use std::fmt;

use serde_json::Value as JsonValue;

use crate::domain::result::Result;

/// Mutating HTTP methods (reads always go through `get_json`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// JSON-over-HTTP transport
///
/// Implementations must return `Error::Request` for non-2xx statuses,
/// `Error::Network` when no response was received, and `Error::Parse` when
/// the body is not valid JSON. An empty success body maps to `Null`.
pub trait HttpTransport: Send + Sync {
    /// GET `url` (query string already attached) and decode the JSON body
    fn get_json(&self, url: &str) -> Result<JsonValue>;

    /// Send a mutating request with an optional JSON body
    fn send_json(&self, method: Method, url: &str, body: Option<&JsonValue>) -> Result<JsonValue>;
}
