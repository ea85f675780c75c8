//! Web search via the Serper API.

use super::{required_str, Tool};
use crate::config::SearchSettings;
use crate::error::{Result, StudyError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Searches the web and returns the top organic results as text.
pub struct WebSearchTool {
    client: Client,
    settings: SearchSettings,
}

impl WebSearchTool {
    pub fn new(settings: &SearchSettings) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            client,
            settings: settings.clone(),
        })
    }

    /// The API key is read on each call so a missing key fails on first use.
    fn api_key(&self) -> Result<String> {
        match std::env::var(&self.settings.api_key_env) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(StudyError::MissingCredential(self.settings.api_key_env.clone())),
        }
    }

    /// Run a search query.
    pub async fn search(&self, query: &str) -> Result<Vec<OrganicResult>> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .post(&self.settings.endpoint)
            .header("X-API-KEY", api_key)
            .json(&SerperRequest {
                q: query,
                num: self.settings.num_results,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StudyError::Search(format!("HTTP {}: {}", status.as_u16(), message)));
        }

        let data: SerperResponse = response
            .json()
            .await
            .map_err(|e| StudyError::Search(format!("JSON parse error: {}", e)))?;

        debug!("Search for '{}' returned {} results", query, data.organic.len());
        Ok(data.organic)
    }
}

/// Render results the way the search stage sees them.
fn format_results(results: &[OrganicResult]) -> String {
    if results.is_empty() {
        return "No search results found.".to_string();
    }

    results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{}. {}\n   Link: {}\n   {}",
                i + 1,
                r.title,
                r.link,
                r.snippet.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the internet for a query and return the most relevant results with their links."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "search_query": {
                    "type": "string",
                    "description": "Mandatory search query you want to use to search the internet"
                }
            },
            "required": ["search_query"]
        })
    }

    async fn invoke(&self, args: serde_json::Value) -> Result<String> {
        let query = required_str(&args, "search_query")?;
        match self.search(query).await {
            Ok(results) => Ok(format_results(&results)),
            Err(e @ StudyError::MissingCredential(_)) => Err(e),
            Err(e) => {
                warn!("Search failed: {}", e);
                Ok(format!("Error searching for '{}': {}", query, e))
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: u32,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

/// One organic search hit.
#[derive(Debug, Clone, Deserialize)]
pub struct OrganicResult {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: Option<String>,
}
