//! Rendered podium summary.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Summary handed to a [`Notifier`](crate::services::Notifier).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
    pub title: String,

    /// Grouped podium lines, already truncated
    pub description: String,

    /// RGB color as an integer
    pub color: u32,

    pub timestamp: DateTime<Utc>,

    pub footer: String,

    /// Number of podium lines rendered before truncation
    pub podium_count: usize,
}

impl Summary {
    /// Whether the summary carries any podium.
    pub fn has_podiums(&self) -> bool {
        self.podium_count > 0
    }

    /// Timestamp in RFC 3339 form, as sent to the transport.
    pub fn timestamp_rfc3339(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, false)
    }
}
