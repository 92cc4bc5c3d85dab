//! Gotify channel.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::{Alert, AlertChannel};
use crate::config::{GotifyConfig, SecureString};

pub struct GotifyChannel {
    url: String,
    token: SecureString,
}

impl GotifyChannel {
    pub fn from_config(config: &GotifyConfig) -> Self {
        Self {
            url: format!("{}/message", config.url.trim_end_matches('/')),
            token: config.get_token(),
        }
    }
}

#[async_trait]
impl AlertChannel for GotifyChannel {
    fn name(&self) -> &'static str {
        "Gotify"
    }

    async fn send(&self, client: &Client, alert: &Alert) -> Result<()> {
        #[derive(Serialize)]
        struct GotifyMessage<'a> {
            title: &'a str,
            message: &'a str,
            priority: u8,
        }

        let payload = GotifyMessage {
            title: &alert.title,
            message: &alert.message,
            priority: alert.level.gotify_priority(),
        };

        let response = client
            .post(&self.url)
            .header("X-Gotify-Key", self.token.as_str())
            .json(&payload)
            .send()
            .await
            .context("Failed to send Gotify alert")?;

        // Response body may echo the token; only the status is reported
        let status = response.status();
        if !status.is_success() {
            bail!("Gotify returned {}", status);
        }

        debug!("Gotify alert sent");
        Ok(())
    }
}
