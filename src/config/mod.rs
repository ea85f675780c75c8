//! Configuration module for studyforge.
//!
//! Handles loading and managing application settings and stage prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, StagePrompt};
pub use settings::{
    GeneralSettings, PipelineSettings, PromptSettings, ProviderConfig, ProviderSettings,
    ScraperSettings, SearchSettings, ServerSettings, Settings, StageProviders,
};
