//! Generic JSON webhook channel.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use super::{Alert, AlertChannel};
use crate::config::WebhookConfig;

pub struct WebhookChannel {
    url: String,
    headers: HashMap<String, String>,
}

impl WebhookChannel {
    pub fn from_config(config: &WebhookConfig) -> Self {
        Self {
            url: config.url.clone(),
            headers: config.headers.clone(),
        }
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    level: &'a str,
    title: &'a str,
    message: &'a str,
    timestamp: String,
    source: &'a str,
}

#[async_trait]
impl AlertChannel for WebhookChannel {
    fn name(&self) -> &'static str {
        "Webhook"
    }

    async fn send(&self, client: &Client, alert: &Alert) -> Result<()> {
        let payload = WebhookPayload {
            level: alert.level.as_str(),
            title: &alert.title,
            message: &alert.message,
            timestamp: chrono::Utc::now().to_rfc3339(),
            source: "hostmerge",
        };

        let mut request = client.post(&self.url).json(&payload);
        // Header names/values are validated when the config is deserialized
        for (key, value) in &self.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request.send().await.context("Failed to send webhook")?;
        let status = response.status();
        if !status.is_success() {
            bail!("Webhook returned {}", status);
        }

        debug!("Webhook alert sent");
        Ok(())
    }
}
