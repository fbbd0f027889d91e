//! Notes Tool (per-user notes)

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::{str_param, usize_param, Params, Tool, ToolCategory, ToolContext, ToolId, ToolResult, ToolSchema};
use crate::backends::DocumentStore;

pub struct NotesTool {
    store: Arc<dyn DocumentStore>,
}

impl NotesTool {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for NotesTool {
    fn id(&self) -> ToolId {
        ToolId::Notes
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Safe
    }

    fn describe(&self) -> ToolSchema {
        ToolSchema::new("notes", "Create, read, and manage user notes.", ToolCategory::Safe)
            .with_enum_param("operation", "Operation to perform", &["create", "read", "list"], true)
            .with_string_param("content", "Note content (for create)", false)
            .with_number_param("limit", "Max notes to return (for list)", 5, false)
    }

    async fn execute(&self, params: &Params, context: &ToolContext) -> anyhow::Result<ToolResult> {
        let Some(user_id) = context.user() else {
            return Ok(ToolResult::error("Notes require authentication"));
        };

        let operation = str_param(params, "operation").unwrap_or_default();
        let outcome = match operation {
            "create" => {
                let Some(content) = str_param(params, "content") else {
                    return Ok(ToolResult::error("Content required for create"));
                };
                self.store.add_note(user_id, content).await.map(|_| {
                    ToolResult::ok(json!({
                        "success": true,
                        "message": format!("Note saved: \"{}\"", content),
                    }))
                })
            }
            "list" | "read" => {
                let limit = usize_param(params, "limit", 5);
                self.store.list_notes(user_id, limit).await.map(|notes| {
                    let formatted = if notes.is_empty() {
                        "No notes found".to_string()
                    } else {
                        notes
                            .iter()
                            .enumerate()
                            .map(|(i, n)| format!("{}. {}", i + 1, n.content))
                            .collect::<Vec<_>>()
                            .join("\n")
                    };
                    ToolResult::ok(json!({ "notes": notes, "formatted": formatted }))
                })
            }
            other => return Ok(ToolResult::error(format!("Unknown operation: {}", other))),
        };

        Ok(outcome.unwrap_or_else(|e| ToolResult::error(format!("Notes operation failed: {}", e))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::InMemoryDocumentStore;

    fn params(value: serde_json::Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_requires_authentication() {
        let tool = NotesTool::new(Arc::new(InMemoryDocumentStore::new()));
        let result = tool
            .execute(&params(json!({"operation": "list"})), &ToolContext::default())
            .await
            .unwrap();
        assert!(result.error.unwrap().contains("authentication"));
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let tool = NotesTool::new(Arc::new(InMemoryDocumentStore::new()));
        let ctx = ToolContext::for_user("u1");

        let saved = tool
            .execute(&params(json!({"operation": "create", "content": "buy milk"})), &ctx)
            .await
            .unwrap();
        assert_eq!(saved.get("message"), Some(&json!("Note saved: \"buy milk\"")));

        tool.execute(&params(json!({"operation": "create", "content": "call mom"})), &ctx)
            .await
            .unwrap();

        let listed = tool.execute(&params(json!({"operation": "read"})), &ctx).await.unwrap();
        assert_eq!(listed.get("formatted"), Some(&json!("1. call mom\n2. buy milk")));
    }

    #[tokio::test]
    async fn test_empty_list_and_bad_input() {
        let tool = NotesTool::new(Arc::new(InMemoryDocumentStore::new()));
        let ctx = ToolContext::for_user("u1");

        let listed = tool.execute(&params(json!({"operation": "list"})), &ctx).await.unwrap();
        assert_eq!(listed.get("formatted"), Some(&json!("No notes found")));

        let missing = tool.execute(&params(json!({"operation": "create"})), &ctx).await.unwrap();
        assert_eq!(missing.error.as_deref(), Some("Content required for create"));

        let unknown = tool.execute(&params(json!({"operation": "delete"})), &ctx).await.unwrap();
        assert_eq!(unknown.error.as_deref(), Some("Unknown operation: delete"));
    }
}
