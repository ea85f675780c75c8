//! OpenAI-compatible client configuration.
//!
//! Gemini and Groq both expose OpenAI-compatible chat endpoints, so every
//! provider is reached through the same client with a different base URL.

use crate::config::ProviderConfig;
use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for model API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create a client for a provider, with the API key taken from the environment.
///
/// A missing key is not an error here; see [`provider_api_key`].
pub fn create_client(provider: &ProviderConfig) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()?;

    let config = OpenAIConfig::new()
        .with_api_base(provider.api_base.clone())
        .with_api_key(provider_api_key(provider).unwrap_or_default());

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// Read a provider's API key, treating an empty value as absent.
pub fn provider_api_key(provider: &ProviderConfig) -> Option<String> {
    std::env::var(&provider.api_key_env)
        .ok()
        .filter(|key| !key.is_empty())
}
