//! Email Tool (Gmail, read-only)

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use super::{str_param, usize_param, Params, Tool, ToolCategory, ToolContext, ToolId, ToolResult, ToolSchema};
use crate::backends::GoogleWorkspace;

const FILTERS: [&str; 3] = ["recent", "unread", "all"];
const DEFAULT_LIMIT: usize = 5;

pub struct EmailTool {
    google: Arc<dyn GoogleWorkspace>,
}

impl EmailTool {
    pub fn new(google: Arc<dyn GoogleWorkspace>) -> Self {
        Self { google }
    }
}

#[async_trait]
impl Tool for EmailTool {
    fn id(&self) -> ToolId {
        ToolId::Email
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Sensitive
    }

    fn describe(&self) -> ToolSchema {
        ToolSchema::new(
            "email",
            "Read emails from Gmail inbox. Can fetch recent or unread messages.",
            ToolCategory::Sensitive,
        )
        .with_enum_param("filter", "Email filter", &FILTERS, false)
        .with_number_param("limit", "Maximum emails to return", DEFAULT_LIMIT as i64, false)
    }

    async fn execute(&self, params: &Params, context: &ToolContext) -> anyhow::Result<ToolResult> {
        if str_param(params, "operation") == Some("send") {
            return Ok(ToolResult::error("Sending email requires user confirmation")
                .with("requiresConfirmation", true));
        }

        let filter = str_param(params, "filter")
            .filter(|f| FILTERS.contains(f))
            .unwrap_or("recent");
        let limit = usize_param(params, "limit", DEFAULT_LIMIT);

        let Some(token) = context.token() else {
            return Ok(ToolResult::error("Gmail not connected").with("needsAuth", true));
        };

        match self.google.recent_emails(token, filter, limit).await {
            Ok(mut listing) => {
                listing.items.truncate(limit);
                Ok(ToolResult::ok(json!({
                    "emails": listing.items,
                    "formatted": listing.formatted,
                    "filter": filter,
                })))
            }
            Err(e) => {
                warn!("Email fetch failed: {}", e);
                Ok(ToolResult::error(format!("Email fetch failed: {}", e)))
            }
        }
    }
}
