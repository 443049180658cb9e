//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    /// The API answered with a non-2xx status
    #[error("Request to {url} failed: HTTP {status}")]
    Request { status: u16, url: String },

    /// The request never produced a response (connect failure, timeout, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// A response body could not be decoded into the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a request error for a non-success status
    pub fn request(status: u16, url: impl Into<String>) -> Self {
        Self::Request {
            status,
            url: url.into(),
        }
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// HTTP status carried by a request error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
