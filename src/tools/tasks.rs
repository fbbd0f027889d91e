//! Tasks Tool (per-user tasks and reminders)

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::{str_param, Params, Tool, ToolCategory, ToolContext, ToolId, ToolResult, ToolSchema};
use crate::backends::DocumentStore;

pub struct TasksTool {
    store: Arc<dyn DocumentStore>,
}

impl TasksTool {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for TasksTool {
    fn id(&self) -> ToolId {
        ToolId::Tasks
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Safe
    }

    fn describe(&self) -> ToolSchema {
        ToolSchema::new("tasks", "Create, complete, and list user tasks and reminders.", ToolCategory::Safe)
            .with_enum_param("operation", "Operation to perform", &["create", "complete", "list"], true)
            .with_string_param("content", "Task content (for create)", false)
            .with_string_param("taskId", "Task ID or search term (for complete)", false)
    }

    async fn execute(&self, params: &Params, context: &ToolContext) -> anyhow::Result<ToolResult> {
        let Some(user_id) = context.user() else {
            return Ok(ToolResult::error("Tasks require authentication"));
        };

        let operation = str_param(params, "operation").unwrap_or_default();
        let outcome = match operation {
            "create" => {
                let Some(content) = str_param(params, "content") else {
                    return Ok(ToolResult::error("Content required for create"));
                };
                self.store.add_task(user_id, content).await.map(|_| {
                    ToolResult::ok(json!({
                        "success": true,
                        "message": format!("Task added: \"{}\"", content),
                    }))
                })
            }
            "list" => self.store.list_open_tasks(user_id).await.map(|tasks| {
                let formatted = if tasks.is_empty() {
                    "No pending tasks".to_string()
                } else {
                    tasks
                        .iter()
                        .map(|t| format!("[ ] {}", t.content))
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                ToolResult::ok(json!({ "tasks": tasks, "formatted": formatted }))
            }),
            "complete" => {
                let Some(term) = str_param(params, "taskId") else {
                    return Ok(ToolResult::error("Task ID or search term required"));
                };
                self.store.complete_task_matching(user_id, term).await.map(|found| match found {
                    Some(_) => ToolResult::ok(json!({
                        "success": true,
                        "message": format!("Task completed: \"{}\"", term),
                    })),
                    None => ToolResult::error(format!("Task not found: \"{}\"", term)),
                })
            }
            other => return Ok(ToolResult::error(format!("Unknown operation: {}", other))),
        };

        Ok(outcome.unwrap_or_else(|e| ToolResult::error(format!("Tasks operation failed: {}", e))))
    }
}
