//! Shared test doubles

#![allow(dead_code)]

use async_trait::async_trait;
use localmind_agent::agent::{ProgressEvent, StepCallback};
use localmind_agent::llm::Reasoner;
use localmind_agent::tools::{Params, Tool, ToolCategory, ToolContext, ToolId, ToolResult, ToolSchema};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Reasoner that replays canned replies in order and records every call
#[derive(Default)]
pub struct ScriptedReasoner {
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedReasoner {
    pub fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Replies where `Err` entries fail the call
    pub fn with_results(replies: Vec<Result<&str, &str>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// (system prompt, user message) pairs in call order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Reasoner for ScriptedReasoner {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> anyhow::Result<String> {
        self.calls
            .lock()
            .push((system_prompt.to_string(), user_message.to_string()));
        match self.replies.lock().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(e)) => Err(anyhow::anyhow!(e)),
            None => Err(anyhow::anyhow!("script exhausted")),
        }
    }
}

/// Tool that never completes, standing in for the given id
pub struct HangingTool(pub ToolId);

#[async_trait]
impl Tool for HangingTool {
    fn id(&self) -> ToolId {
        self.0
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Safe
    }

    fn describe(&self) -> ToolSchema {
        ToolSchema::new(self.0.as_str(), "Never answers", ToolCategory::Safe)
    }

    async fn execute(&self, _params: &Params, _context: &ToolContext) -> anyhow::Result<ToolResult> {
        std::future::pending().await
    }
}

/// Tool whose every call fails with an unexpected error
pub struct BrokenTool(pub ToolId);

#[async_trait]
impl Tool for BrokenTool {
    fn id(&self) -> ToolId {
        self.0
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Safe
    }

    fn describe(&self) -> ToolSchema {
        ToolSchema::new(self.0.as_str(), "Always breaks", ToolCategory::Safe)
    }

    async fn execute(&self, _params: &Params, _context: &ToolContext) -> anyhow::Result<ToolResult> {
        anyhow::bail!("backend exploded")
    }
}

/// Collects progress events in emission order
pub fn event_collector() -> (StepCallback, Arc<Mutex<Vec<ProgressEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let callback: StepCallback = Arc::new(move |event| sink.lock().push(event));
    (callback, events)
}

pub fn kinds(events: &[ProgressEvent]) -> Vec<&'static str> {
    events.iter().map(|e| e.kind()).collect()
}

pub fn params(value: serde_json::Value) -> Params {
    value.as_object().cloned().unwrap_or_default()
}
