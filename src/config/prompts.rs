//! Prompt templates for the pipeline stages.
//!
//! Each stage is described by a role, goal, backstory, task description and
//! expected output. Templates may reference `{{topic}}` and `{{output_file}}`,
//! plus any custom variables from the config. Prompts can be customized by
//! placing `search.toml`, `scrape.toml`, `synthesize.toml` or `format.toml` in
//! the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").unwrap());

/// Collection of all stage prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub search: StagePrompt,
    pub scrape: StagePrompt,
    pub synthesize: StagePrompt,
    pub format: StagePrompt,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Templates describing one stage's agent and task.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StagePrompt {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub description: String,
    pub expected_output: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            search: StagePrompt {
                role: "Web Search Specialist".to_string(),
                goal: "Find the most relevant and authoritative resource on {{topic}}".to_string(),
                backstory: "You are an expert in finding high-quality information sources about {{topic}}."
                    .to_string(),
                description: r#"Search for ONLY ONE high-quality, authoritative resource on {{topic}}, covering:
- Fundamentals
- Current state
- Applications
- Future developments
Return ONLY ONE URL."#
                    .to_string(),
                expected_output: "A single high-quality URL about {{topic}}.".to_string(),
            },
            scrape: StagePrompt {
                role: "Content Extraction Specialist".to_string(),
                goal: "Extract and process valuable content about {{topic}}".to_string(),
                backstory: "You are skilled at extracting information from websites and organizing it."
                    .to_string(),
                description: r#"Use the web_scraper tool to extract content from the URL provided.
Organize key concepts, definitions, applications, and developments."#
                    .to_string(),
                expected_output: "A concise collection of organized information about {{topic}}."
                    .to_string(),
            },
            synthesize: StagePrompt {
                role: "Educational Content Developer".to_string(),
                goal: "Create structured study materials and questions on {{topic}}".to_string(),
                backstory: "You specialize in creating study content with relevant questions."
                    .to_string(),
                description: r#"Create study materials with:
- Clear explanations
- Key definitions
- Core principles
- Applications
- 5-10 exam-style questions (MCQs, short answer, essay)
Provide answers and explanations."#
                    .to_string(),
                expected_output: "Structured study materials with questions and answers.".to_string(),
            },
            format: StagePrompt {
                role: "Learning Materials Designer".to_string(),
                goal: "Format content on {{topic}} into optimal learning structure".to_string(),
                backstory: "You are an expert in formatting and designing educational materials."
                    .to_string(),
                description: r#"Format study materials into markdown ({{output_file}}) with:
- Table of contents
- Proper headings
- Highlighted key terms
- Bullets/numbered lists
- Q&A sections
- Summary at the end
Save to {{output_file}} using the file_writer tool."#
                    .to_string(),
                expected_output: "Formatted markdown file ({{output_file}}).".to_string(),
            },
            variables: HashMap::new(),
        }
    }
}

impl StagePrompt {
    /// Render every field of this prompt with the given variables.
    pub fn render(&self, prompts: &Prompts, vars: &HashMap<String, String>) -> StagePrompt {
        StagePrompt {
            role: prompts.render_with_custom(&self.role, vars),
            goal: prompts.render_with_custom(&self.goal, vars),
            backstory: prompts.render_with_custom(&self.backstory, vars),
            description: prompts.render_with_custom(&self.description, vars),
            expected_output: prompts.render_with_custom(&self.expected_output, vars),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            for (file, slot) in [
                ("search.toml", &mut prompts.search),
                ("scrape.toml", &mut prompts.scrape),
                ("synthesize.toml", &mut prompts.synthesize),
                ("format.toml", &mut prompts.format),
            ] {
                let path = custom_path.join(file);
                if path.exists() {
                    let content = std::fs::read_to_string(&path)?;
                    *slot = toml::from_str(&content)?;
                }
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Substitution is a single pass: values are never rescanned, and unknown
    /// placeholders are left as written.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
