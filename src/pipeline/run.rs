// src/pipeline/run.rs

//! Weekly podium run.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::{build_summary, filter_podiums, filter_unseen, merge};
use crate::services::{Notifier, ResultSource, RowExtractor};
use crate::storage::SeenStore;

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    /// Records extracted from the page
    pub parsed: usize,
    /// Records inside the window with a podium position
    pub podiums: usize,
    /// Podiums not announced before
    pub new_podiums: usize,
    /// Whether a summary was handed to the notifier
    pub delivered: bool,
    /// Whether the seen store was rewritten
    pub state_saved: bool,
}

/// Run the pipeline once.
///
/// The seen store is written only after the notifier accepted a summary that
/// carried new podiums. Any error before that leaves the store untouched, so
/// the same podiums are retried on the next run.
pub async fn run_weekly(
    config: &Config,
    source: &dyn ResultSource,
    notifier: &dyn Notifier,
    store: &dyn SeenStore,
    now: DateTime<Utc>,
) -> Result<RunOutcome> {
    let extractor = RowExtractor::new(&config.extractor, &config.source.base_url)?;
    let seen = store.load().await;

    let html = source.fetch_page().await?;
    let records = extractor.extract(&html);
    let mut outcome = RunOutcome {
        parsed: records.len(),
        ..RunOutcome::default()
    };
    log::info!("Parsed {} results", outcome.parsed);

    let podiums = filter_podiums(records, now, &config.window);
    outcome.podiums = podiums.len();

    let unseen = filter_unseen(podiums, &seen);
    outcome.new_podiums = unseen.records.len();
    log::info!(
        "Podiums in window: {} ({} new)",
        outcome.podiums,
        outcome.new_podiums
    );

    if unseen.is_empty() && !config.run.always_notify {
        log::info!("No new podiums to post");
        return Ok(outcome);
    }

    let summary = build_summary(&unseen.records, now, &config.summary, &config.window);
    notifier.deliver(&summary).await?;
    outcome.delivered = true;

    if config.run.dry_run {
        log::info!("Dry run, seen store left unchanged");
        return Ok(outcome);
    }

    if !unseen.identities.is_empty() {
        let merged = merge(seen, unseen.identities);
        store.save(&merged).await?;
        outcome.state_saved = true;
        log::info!("Marked {} podiums as seen", outcome.new_podiums);
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::TimeZone;

    use super::*;
    use crate::error::AppError;
    use crate::models::{SeenSet, Summary};

    enum StaticSource {
        Page(String),
        Forbidden,
    }

    impl StaticSource {
        fn page(html: String) -> Self {
            Self::Page(html)
        }
    }

    #[async_trait]
    impl ResultSource for StaticSource {
        async fn fetch_page(&self) -> Result<String> {
            match self {
                Self::Page(html) => Ok(html.clone()),
                Self::Forbidden => Err(AppError::unauthenticated(
                    "https://zwiftpower.com/team.php?id=1",
                    "HTTP 403",
                )),
            }
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        fail: bool,
        sent: Mutex<Vec<Summary>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn deliver(&self, summary: &Summary) -> Result<()> {
            if self.fail {
                return Err(AppError::Delivery {
                    status: 500,
                    body: "boom".into(),
                });
            }
            self.sent.lock().unwrap().push(summary.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        seen: Mutex<SeenSet>,
        saves: Mutex<usize>,
    }

    #[async_trait]
    impl SeenStore for MemoryStore {
        async fn load(&self) -> SeenSet {
            self.seen.lock().unwrap().clone()
        }

        async fn save(&self, seen: &SeenSet) -> Result<()> {
            *self.seen.lock().unwrap() = seen.clone();
            *self.saves.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 12, 18, 0, 0).unwrap()
    }

    fn row(position: u32, date: &str, zid: u32, event: &str, rider: &str) -> String {
        format!(
            r#"<tr>
                <td>{position}</td>
                <td>{date}</td>
                <td><a href="events.php?zid={zid}">{event}</a></td>
                <td><a href="profile.php?z=1{position}">{rider}</a></td>
            </tr>"#
        )
    }

    fn page(rows: &[String]) -> String {
        format!("<html><body><table>{}</table></body></html>", rows.concat())
    }

    fn sample_page() -> String {
        page(&[
            row(2, "2025-01-10", 1, "Stage 1", "Bob"),
            row(1, "2025-01-10", 1, "Stage 1", "Alice"),
            row(7, "2025-01-10", 1, "Stage 1", "Carol"),
            row(1, "2024-12-01", 2, "Old Race", "Dave"),
        ])
    }

    #[tokio::test]
    async fn test_new_podiums_delivered_and_saved() {
        let config = Config::default();
        let source = StaticSource::page(sample_page());
        let notifier = RecordingNotifier::default();
        let store = MemoryStore::default();

        let outcome = run_weekly(&config, &source, &notifier, &store, now())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RunOutcome {
                parsed: 4,
                podiums: 2,
                new_podiums: 2,
                delivered: true,
                state_saved: true,
            }
        );

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let alice = sent[0].description.find("#1 — Alice").unwrap();
        let bob = sent[0].description.find("#2 — Bob").unwrap();
        assert!(alice < bob);
        assert_eq!(store.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let config = Config::default();
        let source = StaticSource::page(sample_page());
        let notifier = RecordingNotifier::default();
        let store = MemoryStore::default();

        run_weekly(&config, &source, &notifier, &store, now())
            .await
            .unwrap();
        let before = store.seen.lock().unwrap().clone();

        let outcome = run_weekly(&config, &source, &notifier, &store, now())
            .await
            .unwrap();

        assert_eq!(outcome.new_podiums, 0);
        assert!(!outcome.delivered);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
        assert_eq!(*store.seen.lock().unwrap(), before);
        assert_eq!(*store.saves.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_seen_result_excluded_from_summary() {
        let config = Config::default();
        let html = page(&[
            row(1, "2025-01-10", 1, "Stage 1", "Alice"),
            row(3, "2025-01-11", 2, "Stage 2", "Bob"),
        ]);
        let store = MemoryStore::default();
        let first = RowExtractor::new(&config.extractor, &config.source.base_url)
            .unwrap()
            .extract(&html)
            .remove(0);
        store.seen.lock().unwrap().insert(first.identity());

        let notifier = RecordingNotifier::default();
        let outcome = run_weekly(&config, &StaticSource::page(html), &notifier, &store, now())
            .await
            .unwrap();

        assert_eq!(outcome.new_podiums, 1);
        let sent = notifier.sent.lock().unwrap();
        assert!(!sent[0].description.contains("Alice"));
        assert!(sent[0].description.contains("#3 — Bob"));
        assert_eq!(store.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_all_seen_leaves_state_unchanged() {
        let config = Config::default();
        let html = page(&[row(1, "2025-01-10", 1, "Stage 1", "Alice")]);
        let store = MemoryStore::default();
        let record = RowExtractor::new(&config.extractor, &config.source.base_url)
            .unwrap()
            .extract(&html)
            .remove(0);
        store.seen.lock().unwrap().insert(record.identity());
        let before = store.seen.lock().unwrap().clone();

        let notifier = RecordingNotifier::default();
        let outcome = run_weekly(&config, &StaticSource::page(html), &notifier, &store, now())
            .await
            .unwrap();

        assert_eq!(outcome.podiums, 1);
        assert_eq!(outcome.new_podiums, 0);
        assert!(notifier.sent.lock().unwrap().is_empty());
        assert_eq!(*store.seen.lock().unwrap(), before);
        assert_eq!(*store.saves.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_without_always_notify() {
        let config = Config::default();
        let notifier = RecordingNotifier::default();
        let store = MemoryStore::default();

        let outcome = run_weekly(
            &config,
            &StaticSource::page(page(&[])),
            &notifier,
            &store,
            now(),
        )
        .await
        .unwrap();

        assert!(!outcome.delivered);
        assert!(notifier.sent.lock().unwrap().is_empty());
        assert_eq!(*store.saves.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_with_always_notify() {
        let mut config = Config::default();
        config.run.always_notify = true;
        let notifier = RecordingNotifier::default();
        let store = MemoryStore::default();

        let outcome = run_weekly(
            &config,
            &StaticSource::page(page(&[])),
            &notifier,
            &store,
            now(),
        )
        .await
        .unwrap();

        assert!(outcome.delivered);
        assert!(!outcome.state_saved);
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].description, config.summary.empty_body);
        assert_eq!(*store.saves.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delivery_failure_keeps_state() {
        let config = Config::default();
        let notifier = RecordingNotifier {
            fail: true,
            ..RecordingNotifier::default()
        };
        let store = MemoryStore::default();

        let err = run_weekly(
            &config,
            &StaticSource::page(sample_page()),
            &notifier,
            &store,
            now(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Delivery { status: 500, .. }));
        assert!(store.seen.lock().unwrap().is_empty());
        assert_eq!(*store.saves.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_delivery() {
        let config = Config::default();
        let source = StaticSource::Forbidden;
        let notifier = RecordingNotifier::default();
        let store = MemoryStore::default();

        let err = run_weekly(&config, &source, &notifier, &store, now())
            .await
            .unwrap_err();

        assert!(err.is_auth());
        assert!(notifier.sent.lock().unwrap().is_empty());
        assert_eq!(*store.saves.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_dry_run_never_saves() {
        let mut config = Config::default();
        config.run.dry_run = true;
        let notifier = RecordingNotifier::default();
        let store = MemoryStore::default();

        let outcome = run_weekly(
            &config,
            &StaticSource::page(sample_page()),
            &notifier,
            &store,
            now(),
        )
        .await
        .unwrap();

        assert!(outcome.delivered);
        assert!(!outcome.state_saved);
        assert_eq!(*store.saves.lock().unwrap(), 0);
    }
}
