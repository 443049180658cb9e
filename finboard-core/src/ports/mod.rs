//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core services
//! depend only on these traits, not on concrete implementations.

mod clock;
mod transport;

pub use clock::{Clock, ManualClock, SystemClock};
pub use transport::{HttpTransport, Method};
