//! Persistence of already announced results.
//!
//! The store holds one JSON array of result identities, rewritten as a whole
//! after every successful notification.
//!
//! ```text
//! weekly_seen.json
//! [
//!   "https://zwiftpower.com/events.php?zid=1|Alice|1|2025-01-05T00:00:00+00:00",
//!   ...
//! ]
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::SeenSet;

// Re-export for convenience
pub use local::LocalSeenStore;

/// Trait for seen-set storage backends.
#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Load the seen set.
    ///
    /// Never fails: a missing or unreadable store is an empty set.
    async fn load(&self) -> SeenSet;

    /// Replace the stored set with `seen`.
    async fn save(&self, seen: &SeenSet) -> Result<()>;
}
