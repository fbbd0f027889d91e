//! Configuration management

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::agent::{ExecutorConfig, PlannerConfig};
use crate::llm::ollama::OllamaConfig;
use crate::llm::{ClaudeReasoner, OllamaReasoner, Reasoner};

/// Which reasoning engine backs the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Local Ollama runtime
    Ollama,
    /// Anthropic Messages API
    Claude,
}

impl Provider {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "ollama" | "local" => Ok(Self::Ollama),
            "claude" | "anthropic" | "cloud" => Ok(Self::Claude),
            other => anyhow::bail!("Unknown LOCALMIND_PROVIDER: {}", other),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen address
    pub bind_addr: SocketAddr,

    pub provider: Provider,

    /// Ollama base URL
    pub ollama_url: String,

    /// Ollama chat model
    pub ollama_model: String,

    /// Anthropic API key (required for the claude provider)
    pub anthropic_api_key: Option<String>,

    /// Claude model hint (haiku, sonnet, opus)
    pub claude_model: String,

    /// Per-step tool timeout
    pub step_timeout: Duration,

    /// Executor loop bound
    pub max_iterations: usize,

    /// Tools exposed to the planner per request
    pub max_tools: usize,

    /// Run logs older than this are evicted
    pub log_retention: Duration,

    /// How often the eviction sweep runs
    pub cleanup_interval: Duration,

    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            provider: Provider::Ollama,
            ollama_url: "http://127.0.0.1:11434".to_string(),
            ollama_model: "qwen2.5:7b-instruct".to_string(),
            anthropic_api_key: None,
            claude_model: "sonnet".to_string(),
            step_timeout: Duration::from_millis(30_000),
            max_iterations: 5,
            max_tools: 6,
            log_retention: Duration::from_secs(3600),
            cleanup_interval: Duration::from_secs(300),
            log_json: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup (defaults for missing keys)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let number = |key: &str, default: u64| -> Result<u64> {
            match var(key) {
                Some(v) => v.parse().with_context(|| format!("{} must be a number, got {:?}", key, v)),
                None => Ok(default),
            }
        };

        let bind_addr = match var("LOCALMIND_BIND") {
            Some(addr) => addr
                .parse()
                .with_context(|| format!("Invalid LOCALMIND_BIND: {}", addr))?,
            None => defaults.bind_addr,
        };

        let provider = match var("LOCALMIND_PROVIDER") {
            Some(p) => Provider::parse(&p)?,
            None => defaults.provider,
        };

        let log_json = var("LOCALMIND_LOG_JSON")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(defaults.log_json);

        Ok(Self {
            bind_addr,
            provider,
            ollama_url: var("OLLAMA_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.ollama_url),
            ollama_model: var("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            anthropic_api_key: var("ANTHROPIC_API_KEY"),
            claude_model: var("CLAUDE_MODEL").unwrap_or(defaults.claude_model),
            step_timeout: Duration::from_millis(number("LOCALMIND_STEP_TIMEOUT_MS", 30_000)?),
            max_iterations: number("LOCALMIND_MAX_ITERATIONS", 5)? as usize,
            max_tools: number("LOCALMIND_MAX_TOOLS", 6)? as usize,
            log_retention: Duration::from_secs(number("LOCALMIND_LOG_RETENTION_SECS", 3600)?),
            cleanup_interval: Duration::from_secs(number("LOCALMIND_CLEANUP_INTERVAL_SECS", 300)?.max(1)),
            log_json,
        })
    }

    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            step_timeout: self.step_timeout,
            max_iterations: self.max_iterations,
        }
    }

    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig::default()
    }

    /// Reasoning engine for the configured provider
    pub fn build_reasoner(&self) -> Result<Arc<dyn Reasoner>> {
        match self.provider {
            Provider::Ollama => {
                let reasoner = OllamaReasoner::new(OllamaConfig {
                    base_url: self.ollama_url.clone(),
                    model: self.ollama_model.clone(),
                    ..OllamaConfig::default()
                })?;
                Ok(Arc::new(reasoner))
            }
            Provider::Claude => {
                let reasoner = ClaudeReasoner::new(self.anthropic_api_key.as_deref(), &self.claude_model);
                if !reasoner.is_available() {
                    anyhow::bail!("LOCALMIND_PROVIDER=claude requires ANTHROPIC_API_KEY");
                }
                Ok(Arc::new(reasoner))
            }
        }
    }
}
