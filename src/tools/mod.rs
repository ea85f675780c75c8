//! Tools exposed to pipeline stages.
//!
//! A tool is a named capability with a JSON-schema argument description that
//! the model may decide to call during a stage. The stage runner is the only
//! caller. Tools report their own failures (unreachable pages, unwritable
//! paths) as text so the model can react; an `Err` from [`Tool::invoke`] is
//! reserved for malformed arguments and missing credentials.

mod extract;
mod fetch;
mod scrape;
mod search;
#[cfg(test)]
mod testing;
mod write;

pub use extract::{extract, extract_with_limit, DEFAULT_MAX_CHARS, TRUNCATION_MARKER};
pub use fetch::{FetchError, Fetcher, DEFAULT_USER_AGENT};
pub use scrape::WebScraperTool;
pub use search::WebSearchTool;
pub use write::{resolve_path, write_file, FileWriteTool, WriteError};

use crate::error::{Result, StudyError};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// A capability a stage's model can invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to call this tool.
    fn name(&self) -> &str;

    /// What the tool does, shown to the model.
    fn description(&self) -> &str;

    /// JSON schema of the tool's arguments.
    fn parameters(&self) -> serde_json::Value;

    /// Run the tool with parsed JSON arguments.
    async fn invoke(&self, args: serde_json::Value) -> Result<String>;

    /// Describe this tool for a model request.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Model-facing description of a tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// The tools assigned to one stage.
#[derive(Clone, Default)]
pub struct Toolbox {
    tools: Vec<Arc<dyn Tool>>,
}

impl Toolbox {
    /// An empty toolbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool.
    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Definitions for every tool, in insertion order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Invoke a tool by name with raw JSON arguments from the model.
    pub async fn call(&self, name: &str, arguments: &str) -> Result<String> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| StudyError::Agent(format!("Unknown tool: {}", name)))?;

        let args: serde_json::Value = if arguments.trim().is_empty() {
            serde_json::Value::Object(Default::default())
        } else {
            serde_json::from_str(arguments)
                .map_err(|e| StudyError::Agent(format!("Invalid tool arguments: {}", e)))?
        };

        tool.invoke(args).await
    }
}

impl std::fmt::Debug for Toolbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Read a required string argument.
pub(crate) fn required_str<'a>(args: &'a serde_json::Value, key: &str) -> Result<&'a str> {
    args[key]
        .as_str()
        .ok_or_else(|| StudyError::Agent(format!("Missing '{}' argument", key)))
}
