//! Results page fetching.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, COOKIE};
use reqwest::{Client, StatusCode};

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::services::RowExtractor;
use crate::utils::http;

/// Supplies the raw markup of the results page.
#[async_trait]
pub trait ResultSource: Send + Sync {
    /// Fetch the page text.
    ///
    /// Fails with [`AppError::Unauthenticated`] when the session is not accepted.
    async fn fetch_page(&self) -> Result<String>;
}

/// ZwiftPower team page fetched with a logged-in session cookie.
pub struct ZwiftPowerSource {
    client: Client,
    url: String,
    cookie: String,
    login_markers: Vec<String>,
    extractor: RowExtractor,
}

impl ZwiftPowerSource {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http::create_async_client(&config.http)?,
            url: config.team_url(),
            cookie: config.source.cookie.clone(),
            login_markers: config.source.login_markers.clone(),
            extractor: RowExtractor::new(&config.extractor, &config.source.base_url)?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Classify a response, separating auth problems from other failures.
    ///
    /// A page counts as a login page only when it carries a login marker and
    /// no candidate result rows. Result pages link to the login form too.
    fn check_response(&self, status: StatusCode, body: String) -> Result<String> {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppError::unauthenticated(
                &self.url,
                format!("HTTP {}", status.as_u16()),
            ));
        }
        if status.is_client_error() || status.is_server_error() {
            return Err(AppError::Fetch {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        if let Some(marker) = login_marker(&body, &self.login_markers) {
            if !self.extractor.has_candidates(&body) {
                return Err(AppError::unauthenticated(
                    &self.url,
                    format!("login page served (matched '{marker}')"),
                ));
            }
        }
        Ok(body)
    }
}

#[async_trait]
impl ResultSource for ZwiftPowerSource {
    async fn fetch_page(&self) -> Result<String> {
        log::debug!("Fetching {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .header(COOKIE, &self.cookie)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        self.check_response(status, body)
    }
}

/// Returns the first login marker found in the page.
fn login_marker<'a>(body: &str, markers: &'a [String]) -> Option<&'a str> {
    markers
        .iter()
        .find(|m| !m.is_empty() && body.contains(m.as_str()))
        .map(String::as_str)
}
