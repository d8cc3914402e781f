use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use thiserror::Error;

/// Failure to hand a message to a channel. Never retried.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Transport failure. The webhook URL is stripped since it embeds the token.
    #[error("webhook request failed: {0}")]
    Http(reqwest::Error),
    #[error("webhook rejected message ({0})")]
    Rejected(reqwest::StatusCode),
}

impl From<reqwest::Error> for DeliveryError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}

/// Destination for rendered alert text.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, channel: &str, message: &str) -> Result<(), DeliveryError>;
}

/// Posts messages to Discord webhooks as `{"content": ...}`.
pub struct DiscordWebhook {
    http: reqwest::Client,
}

impl DiscordWebhook {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()
            .context("failed to build webhook client")?;
        Ok(Self { http })
    }
}

#[async_trait]
impl NotificationSink for DiscordWebhook {
    async fn deliver(&self, channel: &str, message: &str) -> Result<(), DeliveryError> {
        let payload = serde_json::json!({ "content": message });
        let resp = self.http.post(channel).json(&payload).send().await?;
        // Discord answers 204 No Content on success.
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(DeliveryError::Rejected(resp.status()))
        }
    }
}
