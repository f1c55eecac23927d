//! Summary delivery.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{Config, Summary};
use crate::utils::http;

/// Delivers a rendered summary to the outside world.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver the summary. Any non-success answer is an error.
    async fn deliver(&self, summary: &Summary) -> Result<()>;
}

/// Discord webhook payload.
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    embeds: [Embed<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    title: &'a str,
    description: &'a str,
    color: u32,
    timestamp: String,
    footer: Footer<'a>,
}

#[derive(Debug, Serialize)]
struct Footer<'a> {
    text: &'a str,
}

impl<'a> WebhookPayload<'a> {
    fn from_summary(summary: &'a Summary) -> Self {
        Self {
            embeds: [Embed {
                kind: "rich",
                title: &summary.title,
                description: &summary.description,
                color: summary.color,
                timestamp: summary.timestamp_rfc3339(),
                footer: Footer {
                    text: &summary.footer,
                },
            }],
        }
    }
}

/// Posts summaries as a rich embed to a Discord webhook.
pub struct DiscordNotifier {
    client: Client,
    webhook_url: String,
}

impl DiscordNotifier {
    pub fn new(config: &Config) -> Result<Self> {
        if config.notifier.webhook_url.trim().is_empty() {
            return Err(AppError::config("notifier.webhook_url is empty"));
        }
        Ok(Self {
            client: http::create_async_client(&config.http)?,
            webhook_url: config.notifier.webhook_url.trim().to_string(),
        })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn deliver(&self, summary: &Summary) -> Result<()> {
        let payload = WebhookPayload::from_summary(summary);
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = if status.is_success() {
            String::new()
        } else {
            response.text().await.unwrap_or_default()
        };
        check_status(status, body)?;

        log::debug!("Webhook accepted summary with HTTP {}", status.as_u16());
        Ok(())
    }
}

/// Only a 2xx answer counts as delivered. Redirects are failures too.
fn check_status(status: StatusCode, body: String) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    Err(AppError::Delivery {
        status: status.as_u16(),
        body,
    })
}

/// Logs summaries instead of sending them.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, summary: &Summary) -> Result<()> {
        let payload = serde_json::to_string_pretty(&WebhookPayload::from_summary(summary))?;
        log::info!("Dry run, webhook payload:\n{}", payload);
        Ok(())
    }
}
