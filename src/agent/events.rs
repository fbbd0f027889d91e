//! Progress events
//!
//! The live-progress contract consumed by the chat frontend. Each event
//! serializes to one flat JSON object tagged by `type`:
//!
//! ```text
//! planning    { steps, complexity }
//! step        { index, total, description }
//! tool_call   { tool, params }
//! tool_result { tool, result, success }
//! final       { content }
//! error       { error }
//! done        {}
//! ```

use serde::Serialize;
use std::sync::Arc;

use super::planner::{Complexity, Step};
use crate::tools::{Params, ToolResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Planning {
        steps: Vec<Step>,
        complexity: Complexity,
    },
    Step {
        /// 1-based
        index: usize,
        total: usize,
        description: String,
    },
    ToolCall {
        tool: String,
        params: Params,
    },
    ToolResult {
        tool: String,
        result: ToolResult,
        success: bool,
    },
    Final {
        content: Option<String>,
    },
    Error {
        error: String,
    },
    Done,
}

impl ProgressEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Planning { .. } => "planning",
            Self::Step { .. } => "step",
            Self::ToolCall { .. } => "tool_call",
            Self::ToolResult { .. } => "tool_result",
            Self::Final { .. } => "final",
            Self::Error { .. } => "error",
            Self::Done => "done",
        }
    }

    /// JSON payload for an SSE `data:` line
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!("{{\"type\":\"error\",\"error\":\"event encoding failed: {}\"}}", e)
        })
    }
}

/// Receives progress events inline, in production order
pub type StepCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;
