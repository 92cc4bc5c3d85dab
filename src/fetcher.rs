//! HTTP fetcher for downloading hosts-format source lists.

use anyhow::{Context, Result};
use futures::future::join_all;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info};

use crate::error::HostmergeError;
use crate::utils::{format_count, redact_url};

/// Maximum size per source list (50 MB)
/// The largest common aggregated hosts files are ~5-15 MB
pub const MAX_SOURCE_SIZE: usize = 50 * 1024 * 1024;

/// Lines downloaded from one source
///
/// A failed source carries no lines and the error that caused it.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub url: String,
    pub lines: Vec<String>,
    pub error: Option<String>,
}

impl FetchResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// HTTP client for fetching lists
pub struct Fetcher {
    client: Client,
    max_size: usize,
}

impl Fetcher {
    /// Create a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("hostmerge/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            max_size: MAX_SOURCE_SIZE,
        })
    }

    /// Override the per-source body size limit
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Fetch one source. Failures become an empty result; they never abort the run.
    pub async fn fetch_source(&self, url: &str) -> FetchResult {
        match self.fetch_text(url).await {
            Ok(content) => {
                let lines: Vec<String> = content.lines().map(str::to_string).collect();
                info!(
                    "Downloaded {} lines from {}",
                    format_count(lines.len()),
                    redact_url(url)
                );
                FetchResult {
                    url: url.to_string(),
                    lines,
                    error: None,
                }
            }
            Err(e) => {
                error!("Error downloading {}: {}", redact_url(url), e);
                FetchResult {
                    url: url.to_string(),
                    lines: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Fetch every source concurrently and wait for all of them.
    ///
    /// Results are returned in the order of `urls`.
    pub async fn fetch_all(&self, urls: &[String]) -> Vec<FetchResult> {
        join_all(urls.iter().map(|url| self.fetch_source(url))).await
    }

    async fn fetch_text(&self, url: &str) -> Result<String, HostmergeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HostmergeError::Network(describe_reqwest_error(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HostmergeError::Network(format!("HTTP {}", status)));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_size as u64 {
                return Err(HostmergeError::Network(format!(
                    "Response too large: {} bytes (max: {} bytes)",
                    content_length, self.max_size
                )));
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| HostmergeError::Network(describe_reqwest_error(e)))?;

        // Content-Length may be absent (chunked transfer)
        if body.len() > self.max_size {
            return Err(HostmergeError::Network(format!(
                "Downloaded content too large: {} bytes (max: {} bytes)",
                body.len(),
                self.max_size
            )));
        }

        String::from_utf8(body.to_vec())
            .map_err(|e| HostmergeError::Parse(format!("Body is not valid UTF-8: {}", e.utf8_error())))
    }
}

fn describe_reqwest_error(e: reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        "connection failed".to_string()
    } else {
        // reqwest embeds the full URL, query string included, in its Display output
        e.without_url().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> Fetcher {
        Fetcher::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_source_splits_lines() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hosts"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("# header\r\n0.0.0.0 a.example.com\r\nb.example.com\n"),
            )
            .mount(&server)
            .await;

        let result = fetcher().fetch_source(&format!("{}/hosts", server.uri())).await;
        assert!(result.is_ok());
        assert_eq!(
            result.lines,
            vec!["# header", "0.0.0.0 a.example.com", "b.example.com"]
        );
    }

    #[tokio::test]
    async fn test_fetch_source_http_error_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = fetcher().fetch_source(&format!("{}/missing", server.uri())).await;
        assert!(!result.is_ok());
        assert!(result.lines.is_empty());
        assert!(result.error.unwrap().contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_source_too_large() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(2048)))
            .mount(&server)
            .await;

        let result = fetcher()
            .with_max_size(1024)
            .fetch_source(&server.uri())
            .await;
        assert!(result.lines.is_empty());
        assert!(result.error.unwrap().contains("too large"));
    }

    #[tokio::test]
    async fn test_fetch_source_invalid_utf8() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'a', 0xff, 0xfe, b'\n']))
            .mount(&server)
            .await;

        let result = fetcher().fetch_source(&server.uri()).await;
        assert!(result.lines.is_empty());
        assert!(result.error.unwrap().contains("UTF-8"));
    }

    #[tokio::test]
    async fn test_fetch_source_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("slow.example.com")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let result = Fetcher::new(Duration::from_millis(200))
            .unwrap()
            .fetch_source(&server.uri())
            .await;
        assert!(result.lines.is_empty());
        assert_eq!(result.error.as_deref(), Some("Network error: request timed out"));
    }

    #[tokio::test]
    async fn test_fetch_source_unreachable() {
        // Port 9 (discard) on localhost is closed in test environments
        let result = fetcher().fetch_source("http://127.0.0.1:9/hosts").await;
        assert!(!result.is_ok());
        assert!(result.lines.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_all_preserves_order_and_isolates_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("a.example.com")
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/c"))
            .respond_with(ResponseTemplate::new(200).set_body_string("c.example.com"))
            .mount(&server)
            .await;

        let urls: Vec<String> = ["a", "b", "c"]
            .iter()
            .map(|p| format!("{}/{}", server.uri(), p))
            .collect();
        let results = fetcher().fetch_all(&urls).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].lines, vec!["a.example.com"]);
        assert!(!results[1].is_ok());
        assert_eq!(results[2].lines, vec!["c.example.com"]);
        for (result, url) in results.iter().zip(&urls) {
            assert_eq!(&result.url, url);
        }
    }

    #[tokio::test]
    async fn test_fetch_all_empty() {
        assert!(fetcher().fetch_all(&[]).await.is_empty());
    }
}
