//! Stage agents with tool calling.
//!
//! Each pipeline stage is an LLM agent with a role, a goal and a set of tools.
//! The runner lets the model decide whether and when to call those tools and
//! loops until it produces a final answer.

mod model;
mod runner;
mod stage;
#[cfg(test)]
pub(crate) mod testing;

pub use model::{ChatMessage, ChatModel, ModelReply, OpenAiChatModel, ToolCallRequest};
pub use runner::{StageResult, StageRunner, ToolCallRecord};
pub use stage::{StageKind, StageSpec};
