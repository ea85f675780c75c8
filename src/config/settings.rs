//! Configuration settings for studyforge.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub providers: ProviderSettings,
    pub pipeline: PipelineSettings,
    pub scraper: ScraperSettings,
    pub search: SearchSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory where study guides are written and read back.
    pub output_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// An OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    /// Base URL of the OpenAI-compatible API.
    pub api_base: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_temperature() -> f32 {
    0.7
}

/// Named model providers, referenced by the pipeline stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderSettings(pub BTreeMap<String, ProviderConfig>);

impl Default for ProviderSettings {
    fn default() -> Self {
        let mut providers = BTreeMap::new();
        providers.insert(
            "gemini".to_string(),
            ProviderConfig {
                api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
                api_key_env: "GEMINI_API_KEY".to_string(),
                model: "gemini-2.0-flash-exp".to_string(),
                temperature: 0.7,
            },
        );
        providers.insert(
            "groq".to_string(),
            ProviderConfig {
                api_base: "https://api.groq.com/openai/v1".to_string(),
                api_key_env: "GROQ_API_KEY".to_string(),
                model: "llama-3.1-8b-instant".to_string(),
                temperature: 0.7,
            },
        );
        Self(providers)
    }
}

impl ProviderSettings {
    /// Look up a provider by name.
    pub fn get(&self, name: &str) -> crate::error::Result<&ProviderConfig> {
        self.0.get(name).ok_or_else(|| {
            crate::error::StudyError::Config(format!("Unknown model provider: {}", name))
        })
    }
}

/// Which provider each stage talks to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StageProviders {
    pub search: String,
    pub scrape: String,
    pub synthesize: String,
    pub format: String,
}

impl Default for StageProviders {
    fn default() -> Self {
        Self {
            search: "gemini".to_string(),
            scrape: "gemini".to_string(),
            synthesize: "gemini".to_string(),
            format: "gemini".to_string(),
        }
    }
}

/// Pipeline orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Process-wide ceiling on model invocations per minute.
    pub max_rpm: u32,
    /// Maximum model invocations within a single stage.
    pub max_iterations: usize,
    pub stages: StageProviders,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_rpm: 5,
            max_iterations: 15,
            stages: StageProviders::default(),
        }
    }
}

/// Web page fetching and extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Extracted text is truncated beyond this many characters.
    pub max_chars: usize,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: crate::tools::DEFAULT_USER_AGENT.to_string(),
            max_chars: crate::tools::DEFAULT_MAX_CHARS,
        }
    }
}

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Serper search endpoint.
    pub endpoint: String,
    /// Environment variable holding the Serper API key.
    pub api_key_env: String,
    /// Number of results requested per query.
    pub num_results: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://google.serper.dev/search".to_string(),
            api_key_env: "SERPER_API_KEY".to_string(),
            num_results: 10,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom stage prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("studyforge")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }
}
