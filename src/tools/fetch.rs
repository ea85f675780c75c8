//! HTTP page fetching.

use crate::config::ScraperSettings;
use crate::error::Result;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

/// Browser-like user agent sent with every page request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Page fetch failure. Every variant names the URL it concerns.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
}

/// Fetches raw HTML over HTTP(S) with a fixed timeout and user agent. No retries.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Create a fetcher from scraper settings.
    pub fn new(settings: &ScraperSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }

    /// GET `url` and return the response body.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        let request_error = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Request {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        };

        let response = self.client.get(url).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await.map_err(request_error)?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
