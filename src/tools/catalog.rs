//! Tool catalog and relevance selector
//!
//! Built once at startup and shared read-only. Lookup goes through
//! `ToolId::from_name`, so anything outside the closed set is an unknown tool.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use super::calculator::CalculatorTool;
use super::calendar::CalendarTool;
use super::email::EmailTool;
use super::knowledge::KnowledgeTool;
use super::notes::NotesTool;
use super::search::SearchTool;
use super::stubs::StubTool;
use super::tasks::TasksTool;
use super::{Params, Tool, ToolCategory, ToolContext, ToolId, ToolResult, ToolSchema};
use crate::backends::Backends;

/// Any digit or arithmetic operator pulls the calculator in
static MATH_HINT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d+\-*/=]").expect("valid math regex"));

/// Selector options
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectOptions {
    /// Allow dangerous stubs into the selection
    pub include_dangerous: bool,
}

/// Result of a direct, by-name dispatch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DispatchOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ToolResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub blocked: bool,
}

impl DispatchOutcome {
    fn failed(error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }
}

/// The fixed set of invocable tools
#[derive(Clone)]
pub struct ToolCatalog {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolCatalog {
    /// Catalog over an explicit tool list. Order is the selector's tie-break order.
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Every tool, wired to the given backends
    pub fn standard(backends: &Backends) -> Self {
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(CalendarTool::new(backends.google.clone())),
            Arc::new(EmailTool::new(backends.google.clone())),
            Arc::new(NotesTool::new(backends.documents.clone())),
            Arc::new(TasksTool::new(backends.documents.clone())),
            Arc::new(SearchTool::new(backends.search.clone())),
            Arc::new(CalculatorTool),
            Arc::new(KnowledgeTool::new(backends.knowledge.clone())),
            Arc::new(StubTool::browser()),
            Arc::new(StubTool::filesystem()),
            Arc::new(StubTool::system()),
        ];
        Self::new(tools)
    }

    /// Look up a tool by its action name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let id = ToolId::from_name(name)?;
        self.tools.iter().find(|t| t.id() == id).cloned()
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn safe_tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools
            .iter()
            .filter(|t| t.category() == ToolCategory::Safe)
            .cloned()
            .collect()
    }

    /// Schemas for the given tools
    pub fn schemas(tools: &[Arc<dyn Tool>]) -> Vec<ToolSchema> {
        tools.iter().map(|t| t.describe()).collect()
    }

    /// Prompt block listing the given tools with their parameters
    pub fn format_for_prompt(tools: &[Arc<dyn Tool>]) -> String {
        tools
            .iter()
            .map(|t| t.describe().to_prompt_line())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Relevance-ranked, safety-filtered subset of at most `max_tools` tools.
    ///
    /// Falls back to `search` when nothing scores, so a non-empty catalog
    /// always yields at least one tool (unless `max_tools` is zero).
    pub fn select_tools(&self, query: &str, max_tools: usize, options: SelectOptions) -> Vec<Arc<dyn Tool>> {
        if max_tools == 0 {
            return Vec::new();
        }

        let lowered = query.to_lowercase();
        let mut scored: Vec<(usize, &Arc<dyn Tool>)> = self
            .tools
            .iter()
            .filter(|t| options.include_dangerous || t.category() != ToolCategory::Dangerous)
            .map(|t| (relevance(t.id(), &lowered), t))
            .collect();

        // Stable sort keeps catalog order among equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let has_math = MATH_HINT.is_match(query);
        let selected: Vec<Arc<dyn Tool>> = scored
            .into_iter()
            .filter(|(score, tool)| *score > 0 || (tool.id() == ToolId::Calculator && has_math))
            .take(max_tools)
            .map(|(_, tool)| tool.clone())
            .collect();

        if !selected.is_empty() {
            debug!(
                "Selected tools for query: {:?}",
                selected.iter().map(|t| t.name()).collect::<Vec<_>>()
            );
            return selected;
        }

        let fallback = self.get(ToolId::Search.as_str()).or_else(|| {
            self.tools
                .iter()
                .find(|t| options.include_dangerous || t.category() != ToolCategory::Dangerous)
                .cloned()
        });
        fallback.into_iter().collect()
    }

    /// Run one tool directly. Never fails; every problem lands in the outcome.
    pub async fn execute_tool_by_name(&self, name: &str, params: &Params, context: &ToolContext) -> DispatchOutcome {
        let Some(tool) = self.get(name) else {
            return DispatchOutcome::failed(format!("Unknown tool: {}", name));
        };

        if tool.category() == ToolCategory::Dangerous && !tool.is_stub() {
            warn!("Blocked dangerous tool: {}", name);
            return DispatchOutcome {
                error: Some(format!("Tool {} requires explicit user confirmation", name)),
                blocked: true,
                ..DispatchOutcome::default()
            };
        }

        match tool.execute(params, context).await {
            Ok(result) => DispatchOutcome {
                result: Some(result),
                success: true,
                ..DispatchOutcome::default()
            },
            Err(e) => DispatchOutcome::failed(e.to_string()),
        }
    }
}

/// Sum of matched keyword lengths
fn relevance(id: ToolId, lowered_query: &str) -> usize {
    id.keywords()
        .iter()
        .filter(|k| lowered_query.contains(*k))
        .map(|k| k.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    fn catalog() -> ToolCatalog {
        ToolCatalog::standard(&Backends::default())
    }

    fn names(tools: &[Arc<dyn Tool>]) -> Vec<&'static str> {
        tools.iter().map(|t| t.name()).collect()
    }

    #[test]
    fn test_relevance_weighs_longer_keywords() {
        assert_eq!(relevance(ToolId::Search, "what is rust"), "what is".len());
        assert_eq!(relevance(ToolId::Calendar, "meeting today"), "meeting".len() + "today".len());
        assert_eq!(relevance(ToolId::Notes, "hello"), 0);
    }

    #[test]
    fn test_selection_ranks_and_bounds() {
        let catalog = catalog();
        let picked = catalog.select_tools("check my calendar and email inbox", 2, SelectOptions::default());
        // email: "email" + "mail" + "inbox" outweighs "calendar"
        assert_eq!(names(&picked), vec!["email", "calendar"]);

        let one = catalog.select_tools("check my calendar and email inbox", 1, SelectOptions::default());
        assert_eq!(one.len(), 1);
    }

    #[test]
    fn test_calculator_override_on_digits() {
        let picked = catalog().select_tools("what about 12 apples", 6, SelectOptions::default());
        assert!(names(&picked).contains(&"calculator"));
    }

    #[test]
    fn test_fallback_is_search() {
        let picked = catalog().select_tools("hello there", 6, SelectOptions::default());
        assert_eq!(names(&picked), vec!["search"]);
    }

    #[test]
    fn test_dangerous_needs_opt_in() {
        let catalog = catalog();
        let default = catalog.select_tools("open a terminal shell", 10, SelectOptions::default());
        assert!(default.iter().all(|t| t.category() != ToolCategory::Dangerous));

        let opted = catalog.select_tools("open a terminal shell", 10, SelectOptions { include_dangerous: true });
        assert!(names(&opted).contains(&"system"));
    }

    #[test]
    fn test_zero_max_tools_selects_nothing() {
        assert!(catalog().select_tools("calculate 2+2", 0, SelectOptions::default()).is_empty());
    }

    #[test]
    fn test_prompt_formatting() {
        let catalog = catalog();
        let calculator = catalog.get("calculator").unwrap();
        let text = ToolCatalog::format_for_prompt(&[calculator]);
        assert!(text.starts_with("- **calculator**: Perform mathematical calculations."));
        assert!(text.contains("\n  Parameters: {"));
        assert_eq!(catalog.safe_tools().len(), 5);
    }

    struct UnguardedTool;

    #[async_trait]
    impl Tool for UnguardedTool {
        fn id(&self) -> ToolId {
            ToolId::System
        }
        fn category(&self) -> ToolCategory {
            ToolCategory::Dangerous
        }
        fn describe(&self) -> ToolSchema {
            ToolSchema::new("system", "real shell", ToolCategory::Dangerous)
        }
        async fn execute(&self, _params: &Params, _context: &ToolContext) -> anyhow::Result<ToolResult> {
            panic!("must never run");
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn id(&self) -> ToolId {
            ToolId::Notes
        }
        fn category(&self) -> ToolCategory {
            ToolCategory::Safe
        }
        fn describe(&self) -> ToolSchema {
            ToolSchema::new("notes", "broken", ToolCategory::Safe)
        }
        async fn execute(&self, _params: &Params, _context: &ToolContext) -> anyhow::Result<ToolResult> {
            anyhow::bail!("disk on fire")
        }
    }

    #[tokio::test]
    async fn test_dispatch_blocks_dangerous_non_stub() {
        let catalog = ToolCatalog::new(vec![Arc::new(UnguardedTool)]);
        let outcome = catalog
            .execute_tool_by_name("system", &Params::new(), &ToolContext::default())
            .await;
        assert!(outcome.blocked);
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Tool system requires explicit user confirmation"));
    }

    #[tokio::test]
    async fn test_dispatch_wraps_errors() {
        let catalog = ToolCatalog::new(vec![Arc::new(FailingTool)]);
        let outcome = catalog
            .execute_tool_by_name("notes", &Params::new(), &ToolContext::default())
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("disk on fire"));
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({"error": "disk on fire", "success": false})
        );
    }

    #[tokio::test]
    async fn test_dispatch_runs_stub() {
        let outcome = catalog()
            .execute_tool_by_name("browser", &Params::new(), &ToolContext::default())
            .await;
        assert!(outcome.success);
        assert!(outcome.result.unwrap().is_error());
    }
}
