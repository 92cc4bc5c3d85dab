//! Telegram Bot API channel.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::{Alert, AlertChannel};
use crate::config::{SecureString, TelegramConfig};
use crate::utils::truncate;

/// Telegram rejects messages longer than this
const MAX_MESSAGE_LEN: usize = 4096;

const MAX_TITLE_LEN: usize = 256;

pub struct TelegramChannel {
    api_url: String,
    token: SecureString,
    chat_id: String,
}

impl TelegramChannel {
    pub fn from_config(config: &TelegramConfig) -> Self {
        Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.get_token(),
            chat_id: config.get_chat_id(),
        }
    }
}

/// Escape the characters legacy Markdown treats as markup.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Render an alert as legacy Markdown.
///
/// Raw text is cut before escaping so a cut never splits an escape sequence.
fn format_text(alert: &Alert) -> String {
    let title = truncate(&alert.title, MAX_TITLE_LEN);
    // "*", "*" and "\n" around the title
    let budget = MAX_MESSAGE_LEN.saturating_sub(title.len() + 3);
    let message = truncate(&alert.message, budget);
    format!("*{}*\n{}", escape_markdown(&title), escape_markdown(&message))
}

#[async_trait]
impl AlertChannel for TelegramChannel {
    fn name(&self) -> &'static str {
        "Telegram"
    }

    async fn send(&self, client: &Client, alert: &Alert) -> Result<()> {
        if self.token.is_empty() || self.chat_id.is_empty() {
            bail!("Telegram bot token or chat id is not configured");
        }

        #[derive(Serialize)]
        struct SendMessage<'a> {
            chat_id: &'a str,
            text: String,
            parse_mode: &'a str,
            disable_web_page_preview: bool,
        }

        let payload = SendMessage {
            chat_id: &self.chat_id,
            text: format_text(alert),
            parse_mode: "Markdown",
            disable_web_page_preview: true,
        };

        // The token is part of the path: never let it reach an error message
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.token.as_str());
        let response = client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to send Telegram message: {}", e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Telegram returned {}", status);
        }

        debug!("Telegram notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::AlertLevel;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn channel(api_url: &str) -> TelegramChannel {
        TelegramChannel {
            api_url: api_url.to_string(),
            token: SecureString::from("123:ABC"),
            chat_id: "-1001".to_string(),
        }
    }

    fn alert() -> Alert {
        Alert {
            level: AlertLevel::Info,
            title: "Hosts file updated".to_string(),
            message: "Total lines: 2".to_string(),
        }
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("ad_server.example.com"), "ad\\_server.example.com");
        assert_eq!(escape_markdown("*bold* `code` [link"), "\\*bold\\* \\`code\\` \\[link");
        assert_eq!(escape_markdown("plain text"), "plain text");
    }

    #[test]
    fn test_long_message_keeps_escapes_whole() {
        let long = Alert {
            level: AlertLevel::Warning,
            title: "Hosts file updated".to_string(),
            message: "_".repeat(5000),
        };
        let text = format_text(&long);

        assert!(text.starts_with("*Hosts file updated*\n\\_"));
        assert!(text.ends_with("\\_..."));
        // Every backslash escapes exactly one markup character
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                assert_eq!(chars.next(), Some('_'));
            }
        }
        let unescaped = text.replace("\\_", "_");
        assert!(unescaped.len() <= MAX_MESSAGE_LEN);
    }

    #[tokio::test]
    async fn test_send_posts_to_bot_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:ABC/sendMessage"))
            .and(body_partial_json(serde_json::json!({
                "chat_id": "-1001",
                "parse_mode": "Markdown",
                "text": "*Hosts file updated*\nTotal lines: 2"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
            .expect(1)
            .mount(&server)
            .await;

        channel(&server.uri()).send(&Client::new(), &alert()).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = channel(&server.uri())
            .send(&Client::new(), &alert())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("401"));
        assert!(!err.to_string().contains("123:ABC"));
    }

    #[tokio::test]
    async fn test_send_without_credentials() {
        let channel = TelegramChannel {
            api_url: "https://api.telegram.org".to_string(),
            token: SecureString::default(),
            chat_id: String::new(),
        };
        let err = channel.send(&Client::new(), &alert()).await.unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }
}
