//! Knowledge Tool
//!
//! Store information for later recall, or query what was stored.

use async_trait::async_trait;
use chrono::Local;
use serde_json::json;
use std::sync::Arc;

use super::{str_param, Params, Tool, ToolCategory, ToolContext, ToolId, ToolResult, ToolSchema};
use crate::backends::KnowledgeBase;

/// Key used when the caller is not signed in
const ANONYMOUS_USER: &str = "anonymous";

pub struct KnowledgeTool {
    knowledge: Arc<dyn KnowledgeBase>,
}

impl KnowledgeTool {
    pub fn new(knowledge: Arc<dyn KnowledgeBase>) -> Self {
        Self { knowledge }
    }
}

fn format_hits(hits: &[crate::backends::KnowledgeHit]) -> String {
    if hits.is_empty() {
        return "No relevant knowledge found".to_string();
    }

    let mut formatted = String::from("[Relevant Knowledge]\n\n");
    for hit in hits {
        formatted.push_str(&format!("From \"{}\":\n{}\n\n", hit.document_name, hit.excerpt));
    }
    formatted
}

#[async_trait]
impl Tool for KnowledgeTool {
    fn id(&self) -> ToolId {
        ToolId::Knowledge
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Safe
    }

    fn describe(&self) -> ToolSchema {
        ToolSchema::new(
            "knowledge",
            "Store information for later recall, or query stored knowledge.",
            ToolCategory::Safe,
        )
        .with_enum_param("operation", "Operation: store new knowledge or query existing", &["store", "query"], true)
        .with_string_param("content", "Content to store or query to search", true)
        .with_string_param("documentName", "Name for stored document (optional)", false)
    }

    async fn execute(&self, params: &Params, context: &ToolContext) -> anyhow::Result<ToolResult> {
        let Some(content) = str_param(params, "content") else {
            return Ok(ToolResult::error("Content required"));
        };
        let user_id = context.user().unwrap_or(ANONYMOUS_USER);

        let outcome = match str_param(params, "operation").unwrap_or_default() {
            "store" => {
                let name = str_param(params, "documentName")
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Note {}", Local::now().format("%-m/%-d/%Y, %-I:%M:%S %p")));
                self.knowledge.store(user_id, &name, content).await.map(|()| {
                    ToolResult::ok(json!({
                        "success": true,
                        "message": format!("Stored as \"{}\"", name),
                        "documentName": name,
                    }))
                })
            }
            "query" => self.knowledge.query(user_id, content).await.map(|hits| {
                ToolResult::ok(json!({
                    "formatted": format_hits(&hits),
                    "results": hits,
                    "query": content,
                }))
            }),
            other => return Ok(ToolResult::error(format!("Unknown operation: {}", other))),
        };

        Ok(outcome.unwrap_or_else(|e| ToolResult::error(format!("Knowledge operation failed: {}", e))))
    }
}
