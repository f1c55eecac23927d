//! Race result data structures.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rider name used when the row has no profile link.
pub const UNKNOWN_RIDER: &str = "Unknown";

/// Category code used when no category letter was found.
pub const UNKNOWN_CATEGORY: &str = "?";

/// One rider's placement in one event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultRecord {
    /// Event display name (link text)
    pub event_name: String,

    /// Absolute URL of the event page
    pub event_link: String,

    /// Event date, tagged as UTC
    pub occurred_at: DateTime<Utc>,

    /// Rider display name, or [`UNKNOWN_RIDER`]
    pub rider_name: String,

    /// Finishing position (1-based)
    pub position: u32,

    /// Single-letter category, or [`UNKNOWN_CATEGORY`]
    pub category: String,
}

impl ResultRecord {
    /// Deterministic dedup key for this result.
    pub fn identity(&self) -> ResultIdentity {
        ResultIdentity::new(
            &self.event_link,
            &self.rider_name,
            self.position,
            &self.occurred_at,
        )
    }

    /// Whether the position counts as a podium for the given cut-off.
    pub fn is_podium(&self, max_position: u32) -> bool {
        self.position >= 1 && self.position <= max_position
    }
}

/// Stable identity of a result, `link|rider|position|date`.
///
/// The date is rendered as `YYYY-MM-DDTHH:MM:SS+00:00`. Backslashes and pipes
/// inside the text components are escaped so that distinct tuples never share
/// a key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultIdentity(String);

impl ResultIdentity {
    pub fn new(link: &str, rider: &str, position: u32, occurred_at: &DateTime<Utc>) -> Self {
        Self(format!(
            "{}|{}|{}|{}",
            escape(link),
            escape(rider),
            position,
            occurred_at.format("%Y-%m-%dT%H:%M:%S%:z")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResultIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResultIdentity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

fn escape(component: &str) -> String {
    if !component.contains(['\\', '|']) {
        return component.to_string();
    }
    component.replace('\\', "\\\\").replace('|', "\\|")
}

/// Set of identities that were already announced.
///
/// Backed by a sorted set so serialization is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeenSet(BTreeSet<ResultIdentity>);

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identity: &ResultIdentity) -> bool {
        self.0.contains(identity)
    }

    /// Insert an identity, returning `false` if it was already present.
    pub fn insert(&mut self, identity: ResultIdentity) -> bool {
        self.0.insert(identity)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate identities in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &ResultIdentity> {
        self.0.iter()
    }
}

impl FromIterator<ResultIdentity> for SeenSet {
    fn from_iter<I: IntoIterator<Item = ResultIdentity>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<ResultIdentity> for SeenSet {
    fn extend<I: IntoIterator<Item = ResultIdentity>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for SeenSet {
    type Item = ResultIdentity;
    type IntoIter = std::collections::btree_set::IntoIter<ResultIdentity>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
