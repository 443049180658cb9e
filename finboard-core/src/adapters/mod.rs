//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest blocking client for the HttpTransport port
//! - in-memory stub transport for unit tests

pub mod http;

#[cfg(test)]
pub mod stub;

pub use http::ReqwestTransport;
