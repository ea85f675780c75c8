//! Stage descriptions.

use crate::config::StagePrompt;
use crate::tools::Toolbox;
use std::fmt;

/// The four pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Search,
    Scrape,
    Synthesize,
    Format,
}

impl StageKind {
    /// All stages in the order they run.
    pub const ALL: [StageKind; 4] = [
        StageKind::Search,
        StageKind::Scrape,
        StageKind::Synthesize,
        StageKind::Format,
    ];

    /// The stage that follows this one, if any.
    pub fn next(self) -> Option<StageKind> {
        match self {
            StageKind::Search => Some(StageKind::Scrape),
            StageKind::Scrape => Some(StageKind::Synthesize),
            StageKind::Synthesize => Some(StageKind::Format),
            StageKind::Format => None,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Search => write!(f, "search"),
            StageKind::Scrape => write!(f, "scrape"),
            StageKind::Synthesize => write!(f, "synthesize"),
            StageKind::Format => write!(f, "format"),
        }
    }
}

/// Everything a stage runner needs to know about one stage, with the topic
/// already interpolated. Upstream context is passed separately at run time.
#[derive(Debug, Clone)]
pub struct StageSpec {
    pub kind: StageKind,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub description: String,
    pub expected_output: String,
    pub tools: Toolbox,
}

impl StageSpec {
    /// Build a spec from a rendered prompt and a tool set.
    pub fn new(kind: StageKind, prompt: StagePrompt, tools: Toolbox) -> Self {
        Self {
            kind,
            role: prompt.role,
            goal: prompt.goal,
            backstory: prompt.backstory,
            description: prompt.description,
            expected_output: prompt.expected_output,
            tools,
        }
    }

    /// System message describing the agent.
    pub fn system_prompt(&self) -> String {
        let mut prompt = format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        );
        if !self.tools.is_empty() {
            prompt.push_str(&format!(
                "\nYou have access to these tools: {}. Call them when they help; \
                 when you have what you need, answer directly without calling a tool.",
                self.tools.names().join(", ")
            ));
        }
        prompt
    }

    /// User message describing the task, with optional upstream context.
    pub fn task_prompt(&self, context: Option<&str>) -> String {
        let mut prompt = format!(
            "Current Task: {}\n\nThis is the expected criteria for your final answer: {}\n\
             You MUST return the actual complete content as the final answer, not a summary.",
            self.description.trim(),
            self.expected_output.trim()
        );
        if let Some(ctx) = context.filter(|c| !c.trim().is_empty()) {
            prompt.push_str(&format!(
                "\n\nThis is the context you're working with:\n{}",
                ctx
            ));
        }
        prompt.push_str("\n\nBegin!");
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> StageSpec {
        StageSpec::new(
            StageKind::Synthesize,
            StagePrompt {
                role: "Educational Content Developer".to_string(),
                goal: "Create study materials on Rust".to_string(),
                backstory: "You write exams.".to_string(),
                description: "  Write questions.  ".to_string(),
                expected_output: "Questions and answers.".to_string(),
            },
            Toolbox::new(),
        )
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(StageKind::Search.next(), Some(StageKind::Scrape));
        assert_eq!(StageKind::Format.next(), None);

        let mut order = vec![StageKind::Search];
        while let Some(next) = order.last().and_then(|k| k.next()) {
            order.push(next);
        }
        assert_eq!(order, StageKind::ALL.to_vec());
    }

    #[test]
    fn test_system_prompt() {
        let prompt = spec().system_prompt();
        assert!(prompt.starts_with("You are Educational Content Developer. You write exams."));
        assert!(prompt.contains("Your personal goal is: Create study materials on Rust"));
        assert!(!prompt.contains("tools"));
    }

    #[test]
    fn test_task_prompt_with_and_without_context() {
        let without = spec().task_prompt(None);
        assert!(without.starts_with("Current Task: Write questions."));
        assert!(!without.contains("context you're working with"));

        let blank = spec().task_prompt(Some("   "));
        assert_eq!(blank, without);

        let with = spec().task_prompt(Some("Ownership and borrowing notes"));
        assert!(with.contains("This is the context you're working with:\nOwnership and borrowing notes"));
        assert!(with.ends_with("Begin!"));
    }

    #[test]
    fn test_display() {
        assert_eq!(StageKind::Scrape.to_string(), "scrape");
    }
}
