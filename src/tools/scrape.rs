//! The web scraper tool: fetch a page and extract its text.

use super::{extract_with_limit, required_str, Fetcher, Tool};
use crate::config::ScraperSettings;
use crate::error::Result;
use async_trait::async_trait;
use tracing::{info, warn};

/// Fetches a URL and returns its extracted plain text.
///
/// Fetch failures are returned as `Error scraping <url>: <cause>` text.
pub struct WebScraperTool {
    fetcher: Fetcher,
    max_chars: usize,
}

impl WebScraperTool {
    pub fn new(settings: &ScraperSettings) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(settings)?,
            max_chars: settings.max_chars,
        })
    }

    /// Scrape a page, folding any failure into the returned text.
    pub async fn scrape(&self, url: &str) -> String {
        match self.fetcher.fetch(url).await {
            Ok(html) => {
                let text = extract_with_limit(&html, self.max_chars);
                info!("Extracted {} chars from {}", text.chars().count(), url);
                text
            }
            Err(e) => {
                warn!("Scrape failed: {}", e);
                format!("Error scraping {}: {}", url, e)
            }
        }
    }
}

#[async_trait]
impl Tool for WebScraperTool {
    fn name(&self) -> &str {
        "web_scraper"
    }

    fn description(&self) -> &str {
        "Scrapes the content from a given URL to extract relevant information."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL of the webpage to scrape."
                }
            },
            "required": ["url"]
        })
    }

    async fn invoke(&self, args: serde_json::Value) -> Result<String> {
        let url = required_str(&args, "url")?;
        Ok(self.scrape(url).await)
    }
}
