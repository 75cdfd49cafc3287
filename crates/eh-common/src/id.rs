//! Event correlation identifiers.
//!
//! Every `handle` invocation gets an `EventId` so the per-event log lines
//! can be correlated after the fact, even when several invocations append
//! to the same runner log file.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Event ID for correlating log lines of one handled event.
///
/// Format: `eh-<date>-<time>-<random>`
/// Example: `eh-20260807-143022-abc123`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    /// Generate a new event ID.
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        let random: String = uuid::Uuid::new_v4()
            .to_string()
            .chars()
            .take(6)
            .collect();
        EventId(format!("eh-{}-{}", now.format("%Y%m%d-%H%M%S"), random))
    }

    /// Parse an existing event ID string.
    pub fn parse(s: &str) -> Option<Self> {
        if s.starts_with("eh-") && s.len() > 18 {
            Some(EventId(s.to_string()))
        } else {
            None
        }
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
