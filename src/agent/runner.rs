//! Stage runner with tool calling loop.

use super::model::{ChatMessage, ChatModel, ToolCallRequest};
use super::stage::{StageKind, StageSpec};
use crate::error::Result;
use crate::rate_limit::InvocationLimiter;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Runs one stage against a chat model, executing the tool calls it asks for.
///
/// Every model invocation first waits on the shared [`InvocationLimiter`].
/// Tool failures are fed back to the model as text; model errors abort the
/// stage.
pub struct StageRunner {
    model: Arc<dyn ChatModel>,
    limiter: Arc<InvocationLimiter>,
    max_iterations: usize,
}

impl StageRunner {
    /// Create a runner for the given model and shared limiter.
    pub fn new(model: Arc<dyn ChatModel>, limiter: Arc<InvocationLimiter>) -> Self {
        Self {
            model,
            limiter,
            max_iterations: 15,
        }
    }

    /// Set maximum model invocations for one stage.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Run a stage with the previous stage's output as context.
    #[instrument(skip(self, spec, context), fields(stage = %spec.kind, model = self.model.name()))]
    pub async fn run(&self, spec: &StageSpec, context: Option<&str>) -> Result<StageResult> {
        let mut messages = vec![
            ChatMessage::System(spec.system_prompt()),
            ChatMessage::User(spec.task_prompt(context)),
        ];
        let tools = spec.tools.definitions();

        let mut tool_calls_made = Vec::new();
        let mut last_content: Option<String> = None;

        for iteration in 1..=self.max_iterations {
            debug!("Stage {} iteration {}", spec.kind, iteration);

            self.limiter.acquire().await;
            let reply = self.model.complete(&messages, &tools).await?;

            if reply.tool_calls.is_empty() {
                return Ok(StageResult {
                    kind: spec.kind,
                    output: reply.content.unwrap_or_default(),
                    tool_calls: tool_calls_made,
                    iterations: iteration,
                    degraded: false,
                });
            }

            if let Some(content) = reply.content.as_ref().filter(|c| !c.trim().is_empty()) {
                last_content = Some(content.clone());
            }

            messages.push(ChatMessage::Assistant {
                content: reply.content.clone(),
                tool_calls: reply.tool_calls.clone(),
            });

            for call in &reply.tool_calls {
                let record = self.execute_tool_call(spec, call).await;
                messages.push(ChatMessage::Tool {
                    call_id: call.id.clone(),
                    content: record.result.clone(),
                });
                tool_calls_made.push(record);
            }
        }

        warn!(
            "Stage {} exceeded {} iterations without a final answer",
            spec.kind, self.max_iterations
        );

        let output = last_content.unwrap_or_else(|| {
            format!(
                "Stage {} stopped after {} model invocations without a final answer.",
                spec.kind, self.max_iterations
            )
        });

        Ok(StageResult {
            kind: spec.kind,
            output,
            tool_calls: tool_calls_made,
            iterations: self.max_iterations,
            degraded: true,
        })
    }

    /// Execute a single tool call and return a record of it.
    async fn execute_tool_call(&self, spec: &StageSpec, call: &ToolCallRequest) -> ToolCallRecord {
        info!("Stage {} calling tool: {} with args: {}", spec.kind, call.name, call.arguments);

        let result = match spec.tools.call(&call.name, &call.arguments).await {
            Ok(output) => output,
            Err(e) => format!("Tool error: {}", e),
        };

        ToolCallRecord {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
            result,
        }
    }
}

/// Output of one stage.
#[derive(Debug, Clone)]
pub struct StageResult {
    pub kind: StageKind,
    /// The stage's final text, passed to the next stage as context.
    pub output: String,
    /// Record of all tool calls made during the stage.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of model invocations used.
    pub iterations: usize,
    /// True when the stage gave up before the model produced a final answer.
    pub degraded: bool,
}

/// Record of a tool call made during a stage.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::model::ModelReply;
    use crate::agent::testing::{call, ScriptedModel};
    use crate::config::StagePrompt;
    use crate::error::StudyError;
    use crate::tools::{FileWriteTool, Toolbox};

    fn limiter() -> Arc<InvocationLimiter> {
        Arc::new(InvocationLimiter::per_minute(1000))
    }

    fn spec(tools: Toolbox) -> StageSpec {
        StageSpec::new(
            StageKind::Format,
            StagePrompt {
                role: "Learning Materials Designer".to_string(),
                goal: "Format content".to_string(),
                backstory: "You format things.".to_string(),
                description: "Save to guide.md".to_string(),
                expected_output: "A markdown file.".to_string(),
            },
            tools,
        )
    }

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            name: "web_scraper".to_string(),
            arguments: r#"{"url": "https://example.com"}"#.to_string(),
            result: "page".to_string(),
        };
        assert_eq!(format!("{}", record), r#"web_scraper({"url": "https://example.com"})"#);
    }

    #[tokio::test]
    async fn test_plain_answer_with_context() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(ModelReply::text("final answer"))]));
        let runner = StageRunner::new(model.clone(), limiter());

        let result = runner.run(&spec(Toolbox::new()), Some("upstream notes")).await.unwrap();
        assert_eq!(result.output, "final answer");
        assert_eq!(result.iterations, 1);
        assert!(!result.degraded);

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        match &requests[0][1] {
            ChatMessage::User(task) => assert!(task.contains("upstream notes")),
            other => panic!("Expected user message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_executes_tool_and_feeds_result_back() {
        let dir = tempfile::tempdir().unwrap();
        let tools = Toolbox::new().with(Arc::new(FileWriteTool::new(dir.path())));
        let model = Arc::new(ScriptedModel::new(vec![
            Ok(ModelReply::tool_calls(vec![call(
                "call_1",
                "file_writer",
                serde_json::json!({ "file_path": "guide.md", "content": "# Guide" }),
            )])),
            Ok(ModelReply::text("Saved.")),
        ]));
        let runner = StageRunner::new(model.clone(), limiter());

        let result = runner.run(&spec(tools), None).await.unwrap();
        assert_eq!(result.output, "Saved.");
        assert_eq!(result.iterations, 2);
        assert_eq!(result.tool_calls.len(), 1);
        assert!(result.tool_calls[0].result.starts_with("Successfully wrote content to"));
        assert_eq!(std::fs::read_to_string(dir.path().join("guide.md")).unwrap(), "# Guide");

        let second = &model.requests()[1];
        assert!(matches!(second[2], ChatMessage::Assistant { .. }));
        match &second[3] {
            ChatMessage::Tool { call_id, content } => {
                assert_eq!(call_id, "call_1");
                assert!(content.starts_with("Successfully wrote"));
            }
            other => panic!("Expected tool message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_is_reported_to_model() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok(ModelReply::tool_calls(vec![call("c1", "teleport", serde_json::json!({}))])),
            Ok(ModelReply::text("carried on")),
        ]));
        let runner = StageRunner::new(model, limiter());

        let result = runner.run(&spec(Toolbox::new()), None).await.unwrap();
        assert_eq!(result.output, "carried on");
        assert!(result.tool_calls[0].result.starts_with("Tool error: "));
        assert!(result.tool_calls[0].result.contains("Unknown tool: teleport"));
    }

    #[tokio::test]
    async fn test_iteration_cap_degrades_instead_of_failing() {
        let replies = (0..3)
            .map(|i| {
                Ok(ModelReply::tool_calls(vec![call(
                    &format!("c{}", i),
                    "teleport",
                    serde_json::json!({}),
                )]))
            })
            .collect();
        let model = Arc::new(ScriptedModel::new(replies));
        let runner = StageRunner::new(model, limiter()).with_max_iterations(3);

        let result = runner.run(&spec(Toolbox::new()), None).await.unwrap();
        assert!(result.degraded);
        assert_eq!(result.iterations, 3);
        assert!(result.output.contains("without a final answer"));
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let model = Arc::new(ScriptedModel::new(vec![Err("provider unavailable".to_string())]));
        let runner = StageRunner::new(model, limiter());

        let err = runner.run(&spec(Toolbox::new()), None).await.unwrap_err();
        assert!(matches!(err, StudyError::Model(ref m) if m.contains("provider unavailable")));
    }
}
