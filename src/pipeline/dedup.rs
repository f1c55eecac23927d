//! Dedup against previously announced results.
//!
//! Results are matched by their identity; anything already present in the seen
//! set is dropped before the summary is built.

use crate::models::{ResultRecord, SeenSet};

/// Records not yet announced, with their identities.
#[derive(Debug, Clone, Default)]
pub struct UnseenResults {
    /// Records to announce, in input order
    pub records: Vec<ResultRecord>,
    /// Identities to merge once the announcement succeeded
    pub identities: SeenSet,
}

impl UnseenResults {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Keep records whose identity is absent from `seen`.
///
/// A result listed twice on the same page is kept once.
pub fn filter_unseen(records: Vec<ResultRecord>, seen: &SeenSet) -> UnseenResults {
    let mut unseen = UnseenResults::default();

    for record in records {
        let id = record.identity();
        if seen.contains(&id) || !unseen.identities.insert(id) {
            continue;
        }
        unseen.records.push(record);
    }

    unseen
}

/// Union of `seen` and `new`.
pub fn merge(mut seen: SeenSet, new: SeenSet) -> SeenSet {
    seen.extend(new);
    seen
}
