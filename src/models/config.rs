//! Application configuration structures.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variable holding the Discord webhook URL.
pub const ENV_WEBHOOK_URL: &str = "DISCORD_WEBHOOK_URL";
/// Environment variable holding the ZwiftPower session cookie.
pub const ENV_COOKIE: &str = "ZWIFTPOWER_COOKIE";
/// Environment variable overriding the team id.
pub const ENV_TEAM_ID: &str = "ZWIFTPOWER_TEAM_ID";
/// Environment variable enabling the "no podiums" notification.
pub const ENV_ALWAYS_NOTIFY: &str = "PODIUMS_ALWAYS_NOTIFY";

/// Longest accepted trailing window.
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Results page location and session
    #[serde(default)]
    pub source: SourceConfig,

    /// HTTP client settings shared by fetch and delivery
    #[serde(default)]
    pub http: HttpConfig,

    /// Row extraction heuristics
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Trailing window and podium cut-off
    #[serde(default)]
    pub window: WindowConfig,

    /// Summary rendering
    #[serde(default)]
    pub summary: SummaryConfig,

    /// Delivery destination
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Seen-results persistence
    #[serde(default)]
    pub state: StateConfig,

    /// Run-level switches
    #[serde(default)]
    pub run: RunConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, or the defaults when the file does not exist.
    ///
    /// A file that exists but cannot be read or parsed is an error. Falling
    /// back there would silently point the run at the default seen store.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match Self::load(&path) {
            Err(AppError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!("Config {:?} not found. Using defaults.", path.as_ref());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Apply secrets and switches from the environment.
    ///
    /// `lookup` is usually `|key| std::env::var(key).ok()`. Empty values are ignored.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(url) = get(ENV_WEBHOOK_URL) {
            self.notifier.webhook_url = url;
        }
        if let Some(cookie) = get(ENV_COOKIE) {
            self.source.cookie = cookie;
        }
        if let Some(team_id) = get(ENV_TEAM_ID) {
            self.source.team_id = team_id;
        }
        if let Some(flag) = get(ENV_ALWAYS_NOTIFY) {
            self.run.always_notify = matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        self
    }

    /// Validate configuration values before any network activity.
    pub fn validate(&self) -> Result<()> {
        if self.source.cookie.trim().is_empty() {
            return Err(AppError::config(format!(
                "source.cookie is empty (set {ENV_COOKIE} to a logged-in session cookie)"
            )));
        }
        if !self.run.dry_run && self.notifier.webhook_url.trim().is_empty() {
            return Err(AppError::config(format!(
                "notifier.webhook_url is empty (set {ENV_WEBHOOK_URL})"
            )));
        }
        if !self.source.base_url.starts_with("http://")
            && !self.source.base_url.starts_with("https://")
        {
            return Err(AppError::validation("source.base_url must be an http(s) URL"));
        }
        if self.source.team_id.trim().is_empty() {
            return Err(AppError::validation("source.team_id is empty"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.window.days == 0 || self.window.days > MAX_WINDOW_DAYS {
            return Err(AppError::validation(format!(
                "window.days must be between 1 and {MAX_WINDOW_DAYS}"
            )));
        }
        if self.window.max_position == 0 {
            return Err(AppError::validation("window.max_position must be > 0"));
        }
        if self.summary.max_description_chars == 0 {
            return Err(AppError::validation(
                "summary.max_description_chars must be > 0",
            ));
        }
        Ok(())
    }

    /// URL of the team results page.
    pub fn team_url(&self) -> String {
        format!(
            "{}/team.php?id={}",
            self.source.base_url.trim_end_matches('/'),
            self.source.team_id.trim()
        )
    }
}

/// Results page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Site root, used to resolve relative links
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// ZwiftPower team id
    #[serde(default = "defaults::team_id")]
    pub team_id: String,

    /// Raw `Cookie` header of a logged-in session
    #[serde(default)]
    pub cookie: String,

    /// Substrings that identify a login page served in place of results
    #[serde(default = "defaults::login_markers")]
    pub login_markers: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            team_id: defaults::team_id(),
            cookie: String::new(),
            login_markers: defaults::login_markers(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Row extraction heuristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Rows with fewer cells are skipped
    #[serde(default = "defaults::min_cells")]
    pub min_cells: usize,

    /// Substring of an event page link
    #[serde(default = "defaults::event_marker")]
    pub event_marker: String,

    /// Regex matched against rider profile links
    #[serde(default = "defaults::rider_pattern")]
    pub rider_pattern: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_cells: defaults::min_cells(),
            event_marker: defaults::event_marker(),
            rider_pattern: defaults::rider_pattern(),
        }
    }
}

/// Trailing window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Length of the trailing window in days
    #[serde(default = "defaults::window_days")]
    pub days: u32,

    /// Highest position that still counts as a podium
    #[serde(default = "defaults::max_position")]
    pub max_position: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            days: defaults::window_days(),
            max_position: defaults::max_position(),
        }
    }
}

/// Summary rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Title when podiums were found
    #[serde(default = "defaults::title")]
    pub title: String,

    /// Title when nothing qualified
    #[serde(default = "defaults::empty_title")]
    pub empty_title: String,

    /// Body placeholder when nothing qualified
    #[serde(default = "defaults::empty_body")]
    pub empty_body: String,

    /// Embed color
    #[serde(default = "defaults::color")]
    pub color: u32,

    /// Hard limit on the rendered body, in characters
    #[serde(default = "defaults::max_description_chars")]
    pub max_description_chars: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            title: defaults::title(),
            empty_title: defaults::empty_title(),
            empty_body: defaults::empty_body(),
            color: defaults::color(),
            max_description_chars: defaults::max_description_chars(),
        }
    }
}

/// Delivery settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Discord webhook URL
    #[serde(default)]
    pub webhook_url: String,
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// JSON file with already announced results
    #[serde(default = "defaults::state_path")]
    pub path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: defaults::state_path(),
        }
    }
}

/// Run-level switches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Notify with a placeholder even when no new podiums exist
    #[serde(default)]
    pub always_notify: bool,

    /// Log the summary instead of delivering it; never writes state
    #[serde(default)]
    pub dry_run: bool,
}

mod defaults {
    use std::path::PathBuf;

    // Source defaults
    pub fn base_url() -> String {
        "https://zwiftpower.com".into()
    }
    pub fn team_id() -> String {
        "20561".into()
    }
    pub fn login_markers() -> Vec<String> {
        vec!["ucp.php?mode=login".into(), "name=\"password\"".into()]
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "RCF Podiums Bot".into()
    }
    pub fn timeout() -> u64 {
        20
    }

    // Extractor defaults
    pub fn min_cells() -> usize {
        4
    }
    pub fn event_marker() -> String {
        "events.php".into()
    }
    pub fn rider_pattern() -> String {
        r"profile\.php\?z=\d+".into()
    }

    // Window defaults
    pub fn window_days() -> u32 {
        7
    }
    pub fn max_position() -> u32 {
        3
    }

    // Summary defaults
    pub fn title() -> String {
        "RCF – Weekly podiums (ZwiftPower)".into()
    }
    pub fn empty_title() -> String {
        "RCF – No podiums this week (ZwiftPower)".into()
    }
    pub fn empty_body() -> String {
        "No podiums this week.".into()
    }
    pub fn color() -> u32 {
        0x00BC8C
    }
    pub fn max_description_chars() -> usize {
        3900
    }

    // State defaults
    pub fn state_path() -> PathBuf {
        PathBuf::from("weekly_seen.json")
    }
}
