//! Trailing window and podium filter.

use chrono::{DateTime, Duration, Utc};

use crate::models::{ResultRecord, WindowConfig};

/// Keep podium results from the trailing window ending at `now`.
///
/// A record qualifies when `occurred_at >= now - days` and its position is
/// between 1 and `max_position`. Records dated after `now` are kept.
pub fn filter_podiums(
    records: Vec<ResultRecord>,
    now: DateTime<Utc>,
    window: &WindowConfig,
) -> Vec<ResultRecord> {
    let since = window_start(now, window);
    records
        .into_iter()
        .filter(|r| r.occurred_at >= since && r.is_podium(window.max_position))
        .collect()
}

/// First instant inside the window, clamped to the earliest representable time.
pub fn window_start(now: DateTime<Utc>, window: &WindowConfig) -> DateTime<Utc> {
    Duration::try_days(i64::from(window.days))
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
