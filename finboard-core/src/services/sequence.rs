//! Request sequencing - last-issued-wins for overlapping reads
//!
//! Each logical query (e.g. "transactions", "balance-history:3") gets a
//! monotonically increasing sequence number per `begin`. A response is only
//! accepted if its ticket is still the latest issued for that query; late
//! answers to superseded requests are discarded.

use std::collections::HashMap;
use std::sync::Mutex;

/// Handle for one issued request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    query: String,
    seq: u64,
}

impl Ticket {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: Mutex<HashMap<String, u64>>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new ticket for `query`, superseding any earlier one
    pub fn begin(&self, query: &str) -> Ticket {
        let mut latest = match self.latest.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let seq = latest.entry(query.to_string()).or_insert(0);
        *seq += 1;
        Ticket {
            query: query.to_string(),
            seq: *seq,
        }
    }

    /// True if no newer ticket has been issued for the same query
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        let latest = match self.latest.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        latest.get(&ticket.query) == Some(&ticket.seq)
    }

    /// Pass `value` through only if `ticket` is still current
    pub fn accept<T>(&self, ticket: &Ticket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            tracing::debug!(
                query = %ticket.query,
                seq = ticket.seq,
                "discarding superseded response"
            );
            None
        }
    }
}
