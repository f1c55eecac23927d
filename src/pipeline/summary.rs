//! Summary rendering.
//!
//! Podiums are grouped per event; groups are ordered by case-insensitive
//! event name and riders inside a group by position. Ties keep the order in
//! which results appeared on the page, so output is a pure function of the
//! input list and `now`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{ResultRecord, Summary, SummaryConfig, WindowConfig};
use crate::pipeline::filter::window_start;
use crate::utils::truncate_chars;

/// Podiums of one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventGroup<'a> {
    pub event_name: &'a str,
    pub event_link: &'a str,
    pub results: Vec<&'a ResultRecord>,
}

impl EventGroup<'_> {
    /// Markdown block: linked event header, then one line per rider.
    pub fn render(&self) -> String {
        let mut out = format!("**[{}]({})**", self.event_name, self.event_link);
        for r in &self.results {
            out.push('\n');
            out.push_str(&format_line(r));
        }
        out
    }
}

/// `#<position> — <rider> (Cat <category>)`
pub fn format_line(record: &ResultRecord) -> String {
    format!(
        "#{} — {} (Cat {})",
        record.position, record.rider_name, record.category
    )
}

/// Group records by `(event_name, event_link)` in display order.
pub fn group_by_event(records: &[ResultRecord]) -> Vec<EventGroup<'_>> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut groups: Vec<EventGroup<'_>> = Vec::new();

    for record in records {
        let key = (record.event_name.as_str(), record.event_link.as_str());
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(EventGroup {
                event_name: key.0,
                event_link: key.1,
                results: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].results.push(record);
    }

    for group in &mut groups {
        group.results.sort_by_key(|r| r.position);
    }
    groups.sort_by_cached_key(|g| g.event_name.to_lowercase());
    groups
}

/// Render the summary for the new podiums of this period.
pub fn build_summary(
    records: &[ResultRecord],
    now: DateTime<Utc>,
    config: &SummaryConfig,
    window: &WindowConfig,
) -> Summary {
    let (title, body) = if records.is_empty() {
        (config.empty_title.clone(), config.empty_body.clone())
    } else {
        let blocks: Vec<String> = group_by_event(records)
            .iter()
            .map(EventGroup::render)
            .collect();
        (config.title.clone(), blocks.join("\n\n"))
    };

    let description = truncate_chars(&body, config.max_description_chars).to_string();
    if description.len() < body.len() {
        log::warn!(
            "Summary truncated to {} characters",
            config.max_description_chars
        );
    }

    Summary {
        title,
        description,
        color: config.color,
        timestamp: now,
        footer: footer(records.len(), window_start(now, window), now),
        podium_count: records.len(),
    }
}

fn footer(count: usize, since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let noun = if count == 1 { "podium" } else { "podiums" };
    format!(
        "{count} {noun} · {} – {}",
        since.format("%Y-%m-%d"),
        now.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 12, 18, 0, 0).unwrap()
    }

    fn record(event: &str, zid: u32, rider: &str, position: u32) -> ResultRecord {
        ResultRecord {
            event_name: event.to_string(),
            event_link: format!("https://zwiftpower.com/events.php?zid={zid}"),
            occurred_at: Utc.with_ymd_and_hms(2025, 1, 10, 19, 0, 0).unwrap(),
            rider_name: rider.to_string(),
            position,
            category: "B".to_string(),
        }
    }

    fn build(records: &[ResultRecord]) -> Summary {
        build_summary(
            records,
            now(),
            &SummaryConfig::default(),
            &WindowConfig::default(),
        )
    }

    #[test]
    fn test_positions_ascending_within_event() {
        let summary = build(&[
            record("Stage 1", 1, "Bob", 2),
            record("Stage 1", 1, "Alice", 1),
        ]);

        assert_eq!(
            summary.description,
            "**[Stage 1](https://zwiftpower.com/events.php?zid=1)**\n\
             #1 — Alice (Cat B)\n\
             #2 — Bob (Cat B)"
        );
        assert_eq!(summary.title, SummaryConfig::default().title);
        assert_eq!(summary.podium_count, 2);
    }

    #[test]
    fn test_events_ordered_case_insensitive() {
        let summary = build(&[
            record("zwift Race", 3, "C", 1),
            record("Alpha Cup", 2, "B", 1),
            record("beta Crit", 1, "A", 1),
        ]);

        let headers: Vec<&str> = summary
            .description
            .lines()
            .filter(|l| l.starts_with("**"))
            .collect();
        assert_eq!(headers.len(), 3);
        assert!(headers[0].contains("Alpha Cup"));
        assert!(headers[1].contains("beta Crit"));
        assert!(headers[2].contains("zwift Race"));
        assert!(summary.description.contains(")**\n#1 — B (Cat B)\n\n**[beta"));
    }

    #[test]
    fn test_same_name_different_link_kept_apart() {
        let groups_input = [record("Crit", 1, "A", 1), record("Crit", 2, "B", 1)];
        let groups = group_by_event(&groups_input);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].event_link, "https://zwiftpower.com/events.php?zid=1");
    }

    #[test]
    fn test_empty_placeholder() {
        let summary = build(&[]);
        let config = SummaryConfig::default();

        assert_eq!(summary.title, config.empty_title);
        assert_eq!(summary.description, config.empty_body);
        assert!(!summary.has_podiums());
        assert_eq!(summary.footer, "0 podiums · 2025-01-05 – 2025-01-12");
    }

    #[test]
    fn test_truncation() {
        let records: Vec<ResultRecord> = (1..=200)
            .map(|i| record(&format!("Event {i:03}"), i, "Ääkkönen", 1))
            .collect();
        let config = SummaryConfig {
            max_description_chars: 100,
            ..SummaryConfig::default()
        };

        let summary = build_summary(&records, now(), &config, &WindowConfig::default());
        assert_eq!(summary.description.chars().count(), 100);
        assert_eq!(summary.podium_count, 200);
    }

    #[test]
    fn test_deterministic() {
        let records = vec![
            record("B", 2, "Y", 3),
            record("a", 1, "X", 2),
            record("B", 2, "Z", 1),
        ];
        let first = build(&records);
        let second = build(&records);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(first.timestamp, now());
        assert_eq!(first.footer, "3 podiums · 2025-01-05 – 2025-01-12");
    }
}
