//! Calendar Tool (Google Calendar, read-only)

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use super::{str_param, Params, Tool, ToolCategory, ToolContext, ToolId, ToolResult, ToolSchema};
use crate::backends::GoogleWorkspace;

const TIMEFRAMES: [&str; 3] = ["today", "tomorrow", "week"];

pub struct CalendarTool {
    google: Arc<dyn GoogleWorkspace>,
}

impl CalendarTool {
    pub fn new(google: Arc<dyn GoogleWorkspace>) -> Self {
        Self { google }
    }
}

#[async_trait]
impl Tool for CalendarTool {
    fn id(&self) -> ToolId {
        ToolId::Calendar
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Sensitive
    }

    fn describe(&self) -> ToolSchema {
        ToolSchema::new(
            "calendar",
            "Read and manage Google Calendar events. Can fetch today, tomorrow, or this week's events.",
            ToolCategory::Sensitive,
        )
        .with_enum_param("timeframe", "Time range to fetch events for", &TIMEFRAMES, true)
        .with_enum_param("operation", "Operation to perform", &["read", "create"], false)
    }

    async fn execute(&self, params: &Params, context: &ToolContext) -> anyhow::Result<ToolResult> {
        let operation = str_param(params, "operation").unwrap_or("read");
        if operation == "create" {
            return Ok(ToolResult::error("Calendar event creation requires user confirmation")
                .with("requiresConfirmation", true));
        }

        let timeframe = str_param(params, "timeframe")
            .filter(|t| TIMEFRAMES.contains(t))
            .unwrap_or("today");

        let Some(token) = context.token() else {
            return Ok(ToolResult::error("Google Calendar not connected").with("needsAuth", true));
        };

        match self.google.calendar_events(token, timeframe).await {
            Ok(listing) => Ok(ToolResult::ok(json!({
                "events": listing.items,
                "formatted": listing.formatted,
                "timeframe": timeframe,
            }))),
            Err(e) => {
                warn!("Calendar fetch failed: {}", e);
                Ok(ToolResult::error(format!("Calendar fetch failed: {}", e)))
            }
        }
    }
}
