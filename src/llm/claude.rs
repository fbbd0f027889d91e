//! Claude API Client
//!
//! Anthropic Messages API as a reasoning engine. The system prompt is sent
//! as a cached block since planner/observer prompts repeat across calls.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Reasoner;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: usize = 2048;

/// Claude API client
#[derive(Clone)]
pub struct ClaudeReasoner {
    client: Client,
    api_key: Option<String>,
    model: String,
}

/// System message block with cache control
#[derive(Debug, Serialize)]
struct SystemBlock<'a> {
    r#type: &'static str,
    text: &'a str,
    cache_control: CacheControl,
}

#[derive(Debug, Serialize)]
struct CacheControl {
    r#type: &'static str,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: usize,
    system: Vec<SystemBlock<'a>>,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    r#type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: usize,
    output_tokens: usize,
    #[serde(default)]
    cache_read_input_tokens: usize,
}

impl ClaudeReasoner {
    /// `model` is a hint: haiku, sonnet or opus
    pub fn new(api_key: Option<&str>, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.is_empty()).map(str::to_string),
            model: Self::model_id(model).to_string(),
        }
    }

    /// Check if API key is configured
    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    /// Get model ID from hint
    fn model_id(model: &str) -> &'static str {
        match model.to_lowercase().as_str() {
            "haiku" => "claude-3-5-haiku-20241022",
            "opus" => "claude-3-opus-20240229",
            _ => "claude-sonnet-4-20250514",
        }
    }
}

/// Join the text blocks of a response
fn join_text(content: Vec<ContentBlock>) -> String {
    content
        .into_iter()
        .filter_map(|b| if b.r#type == "text" { b.text } else { None })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Reasoner for ClaudeReasoner {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("ANTHROPIC_API_KEY not set - Claude reasoning unavailable"))?;

        let request = MessageRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system: vec![SystemBlock {
                r#type: "text",
                text: system_prompt,
                cache_control: CacheControl { r#type: "ephemeral" },
            }],
            messages: vec![Message {
                role: "user",
                content: user_message,
            }],
        };

        debug!("Calling Claude API: model={}, user_len={}", self.model, user_message.len());

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            anyhow::bail!("Claude API error {}: {}", status, text);
        }

        let result: MessageResponse = response.json().await?;
        info!(
            "Claude response: model={}, in={}, out={}, cache_read={}",
            self.model, result.usage.input_tokens, result.usage.output_tokens, result.usage.cache_read_input_tokens
        );

        Ok(join_text(result.content))
    }
}
