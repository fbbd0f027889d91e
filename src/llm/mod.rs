//! Reasoning engine clients
//!
//! The agent only needs one capability from a language model: given a system
//! prompt and a user message, return text. Two providers implement it:
//! - `OllamaReasoner` for a local Ollama runtime (`/api/chat`)
//! - `ClaudeReasoner` for the Anthropic Messages API

pub mod claude;
pub mod ollama;

use async_trait::async_trait;

pub use claude::ClaudeReasoner;
pub use ollama::OllamaReasoner;

/// Text-completion capable service
#[async_trait]
pub trait Reasoner: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> anyhow::Result<String>;
}

