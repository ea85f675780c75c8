//! studyforge - Study Guides from a Topic
//!
//! Turns a topic into a markdown study guide by chaining four LLM agents,
//! each with its own role and tools.
//!
//! # Overview
//!
//! A request for a topic runs four stages in strict order:
//! - **search** finds one authoritative URL (web search tool)
//! - **scrape** fetches that page and organizes its content (web scraper tool)
//! - **synthesize** writes explanations, definitions and 5-10 Q&A pairs
//! - **format** lays it out as markdown and saves it (file writer tool)
//!
//! Each stage's answer becomes the next stage's context. Model invocations
//! across all stages and all concurrent requests share one per-minute ceiling.
//!
//! # Architecture
//!
//! - `config` - Settings and stage prompt templates
//! - `tools` - Fetcher, extractor, writer and search capabilities
//! - `agent` - Stage specs, the chat model seam and the tool-calling runner
//! - `rate_limit` - Process-wide model invocation ceiling
//! - `orchestrator` - Stage sequencing and final document selection
//! - `server` - The `POST /generate` HTTP API
//!
//! # Example
//!
//! ```rust,no_run
//! use studyforge::config::Settings;
//! use studyforge::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(&settings)?;
//!
//!     let output = orchestrator.run("Quantum Computing").await?;
//!     println!("{}", output.markdown);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod rate_limit;
pub mod server;
pub mod tools;

pub use error::{Result, StudyError};
