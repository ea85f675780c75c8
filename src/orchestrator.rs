//! Pipeline orchestrator for studyforge.
//!
//! Runs the four stages (search, scrape, synthesize, format) strictly in
//! order, handing each stage's output to the next as context, then picks up
//! the study guide the format stage wrote.

use crate::agent::{ChatModel, OpenAiChatModel, StageKind, StageResult, StageRunner, StageSpec};
use crate::config::{Prompts, Settings};
use crate::error::{Result, StudyError};
use crate::rate_limit::InvocationLimiter;
use crate::tools::{FileWriteTool, Tool, Toolbox, WebScraperTool, WebSearchTool};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Returned when neither the output file nor the format stage produced anything.
pub const FAILURE_SENTINEL: &str = "Failed to generate output";

/// Derive the study guide file name for a topic.
///
/// `"Quantum Computing"` becomes `quantum_computing_exam.md`.
pub fn output_file_name(topic: &str) -> String {
    format!("{}_exam.md", topic.to_lowercase().replace(' ', "_"))
}

/// The chat model used by each stage.
#[derive(Clone)]
pub struct StageModels {
    pub search: Arc<dyn ChatModel>,
    pub scrape: Arc<dyn ChatModel>,
    pub synthesize: Arc<dyn ChatModel>,
    pub format: Arc<dyn ChatModel>,
}

impl StageModels {
    /// Use one model for every stage.
    pub fn uniform(model: Arc<dyn ChatModel>) -> Self {
        Self {
            search: model.clone(),
            scrape: model.clone(),
            synthesize: model.clone(),
            format: model,
        }
    }

    /// Build models from the configured provider of each stage. Stages that
    /// share a provider share a client.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut built: HashMap<String, Arc<dyn ChatModel>> = HashMap::new();
        let mut model_for = |name: &str| -> Result<Arc<dyn ChatModel>> {
            if let Some(model) = built.get(name) {
                return Ok(model.clone());
            }
            let provider = settings.providers.get(name)?;
            let model: Arc<dyn ChatModel> = Arc::new(OpenAiChatModel::new(provider)?);
            built.insert(name.to_string(), model.clone());
            Ok(model)
        };

        let stages = &settings.pipeline.stages;
        Ok(Self {
            search: model_for(&stages.search)?,
            scrape: model_for(&stages.scrape)?,
            synthesize: model_for(&stages.synthesize)?,
            format: model_for(&stages.format)?,
        })
    }

    fn for_stage(&self, kind: StageKind) -> Arc<dyn ChatModel> {
        match kind {
            StageKind::Search => self.search.clone(),
            StageKind::Scrape => self.scrape.clone(),
            StageKind::Synthesize => self.synthesize.clone(),
            StageKind::Format => self.format.clone(),
        }
    }
}

/// The capabilities handed to stages: search for the search stage, scraping
/// for the scrape stage, file writing for the format stage.
#[derive(Clone)]
pub struct StageTools {
    pub search: Arc<dyn Tool>,
    pub scrape: Arc<dyn Tool>,
    pub write: Arc<dyn Tool>,
}

impl StageTools {
    /// Build the real tools from settings; files are written to the output dir.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            search: Arc::new(WebSearchTool::new(&settings.search)?),
            scrape: Arc::new(WebScraperTool::new(&settings.scraper)?),
            write: Arc::new(FileWriteTool::new(settings.output_dir())),
        })
    }

    fn for_stage(&self, kind: StageKind) -> Toolbox {
        match kind {
            StageKind::Search => Toolbox::new().with(self.search.clone()),
            StageKind::Scrape => Toolbox::new().with(self.scrape.clone()),
            StageKind::Synthesize => Toolbox::new(),
            StageKind::Format => Toolbox::new().with(self.write.clone()),
        }
    }
}

/// The main orchestrator for the study guide pipeline.
pub struct Orchestrator {
    prompts: Prompts,
    models: StageModels,
    tools: StageTools,
    limiter: Arc<InvocationLimiter>,
    output_dir: PathBuf,
    max_iterations: usize,
}

impl Orchestrator {
    /// Create an orchestrator from settings, with its own rate limiter.
    pub fn new(settings: &Settings) -> Result<Self> {
        let limiter = Arc::new(InvocationLimiter::per_minute(settings.pipeline.max_rpm));
        Self::with_limiter(settings, limiter)
    }

    /// Create an orchestrator from settings that shares an existing rate limiter.
    pub fn with_limiter(settings: &Settings, limiter: Arc<InvocationLimiter>) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        info!(
            "Pipeline providers: search={}, scrape={}, synthesize={}, format={}; ceiling {} rpm",
            settings.pipeline.stages.search,
            settings.pipeline.stages.scrape,
            settings.pipeline.stages.synthesize,
            settings.pipeline.stages.format,
            limiter.max_per_window()
        );

        Ok(Self::with_components(
            prompts,
            StageModels::from_settings(settings)?,
            StageTools::from_settings(settings)?,
            limiter,
            settings.output_dir(),
        )
        .with_max_iterations(settings.pipeline.max_iterations))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        prompts: Prompts,
        models: StageModels,
        tools: StageTools,
        limiter: Arc<InvocationLimiter>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            prompts,
            models,
            tools,
            limiter,
            output_dir,
            max_iterations: 15,
        }
    }

    /// Set maximum model invocations per stage.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Directory the study guide is written to and read from.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Build the spec for one stage with the topic interpolated.
    pub fn stage_spec(&self, kind: StageKind, topic: &str) -> StageSpec {
        let mut vars = HashMap::new();
        vars.insert("topic".to_string(), topic.to_string());
        vars.insert("output_file".to_string(), output_file_name(topic));

        let template = match kind {
            StageKind::Search => &self.prompts.search,
            StageKind::Scrape => &self.prompts.scrape,
            StageKind::Synthesize => &self.prompts.synthesize,
            StageKind::Format => &self.prompts.format,
        };

        StageSpec::new(
            kind,
            template.render(&self.prompts, &vars),
            self.tools.for_stage(kind),
        )
    }

    /// Run the full pipeline for a topic and return the study guide.
    #[instrument(skip(self), fields(topic = %topic))]
    pub async fn run(&self, topic: &str) -> Result<PipelineOutput> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(StudyError::InvalidInput("Topic is required".to_string()));
        }

        let mut stages: Vec<StageResult> = Vec::with_capacity(StageKind::ALL.len());
        let mut current = Some(StageKind::Search);

        while let Some(kind) = current {
            let spec = self.stage_spec(kind, topic);
            let runner = StageRunner::new(self.models.for_stage(kind), self.limiter.clone())
                .with_max_iterations(self.max_iterations);

            info!("Running {} stage", kind);
            let context = stages.last().map(|s| s.output.as_str());
            let result = runner.run(&spec, context).await?;

            if result.degraded {
                warn!("{} stage returned degraded output", kind);
            }
            info!(
                "{} stage finished: {} chars, {} tool call(s), {} invocation(s)",
                kind,
                result.output.len(),
                result.tool_calls.len(),
                result.iterations
            );

            stages.push(result);
            current = kind.next();
        }

        let output_path = self.output_dir.join(output_file_name(topic));
        let final_output = stages.last().map(|s| s.output.as_str()).unwrap_or_default();
        let (markdown, source) = self.collect_document(&output_path, final_output).await?;

        Ok(PipelineOutput {
            topic: topic.to_string(),
            output_path,
            markdown,
            source,
            stages,
        })
    }

    /// Prefer the written file, then the format stage's text, then the sentinel.
    async fn collect_document(
        &self,
        output_path: &Path,
        final_output: &str,
    ) -> Result<(String, DocumentSource)> {
        if output_path.exists() {
            let markdown = tokio::fs::read_to_string(output_path).await?;
            info!("Read study guide from {}", output_path.display());
            return Ok((markdown, DocumentSource::File));
        }

        if !final_output.trim().is_empty() {
            warn!(
                "{} was not written; returning the format stage's text",
                output_path.display()
            );
            return Ok((final_output.to_string(), DocumentSource::StageOutput));
        }

        warn!("Pipeline produced no output");
        Ok((FAILURE_SENTINEL.to_string(), DocumentSource::Sentinel))
    }
}

/// Where the returned document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSource {
    /// Read back from the file the format stage wrote.
    File,
    /// The format stage's raw answer.
    StageOutput,
    /// Nothing was produced.
    Sentinel,
}

/// Result of a pipeline run.
#[derive(Debug)]
pub struct PipelineOutput {
    pub topic: String,
    /// Where the study guide was expected to be written.
    pub output_path: PathBuf,
    /// The study guide markdown.
    pub markdown: String,
    pub source: DocumentSource,
    /// Every stage's result, in execution order.
    pub stages: Vec<StageResult>,
}
