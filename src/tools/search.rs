//! Search Tool (web search)

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use super::{str_param, usize_param, Params, Tool, ToolCategory, ToolContext, ToolId, ToolResult, ToolSchema};
use crate::backends::WebSearch;

pub struct SearchTool {
    engine: Arc<dyn WebSearch>,
}

impl SearchTool {
    pub fn new(engine: Arc<dyn WebSearch>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn id(&self) -> ToolId {
        ToolId::Search
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Safe
    }

    fn describe(&self) -> ToolSchema {
        ToolSchema::new(
            "search",
            "Search the web for information. Returns summarized results.",
            ToolCategory::Safe,
        )
        .with_string_param("query", "Search query", true)
        .with_number_param("limit", "Maximum results to return", 5, false)
    }

    async fn execute(&self, params: &Params, _context: &ToolContext) -> anyhow::Result<ToolResult> {
        let Some(query) = str_param(params, "query") else {
            return Ok(ToolResult::error("Search query required"));
        };
        let limit = usize_param(params, "limit", 5);

        match self.engine.search(query, limit).await {
            Ok(found) => Ok(ToolResult::ok(json!({
                "results": found.results,
                "formatted": found.formatted,
                "query": query,
            }))),
            Err(e) => {
                warn!("Search failed for {:?}: {}", query, e);
                Ok(ToolResult::error(format!("Search failed: {}", e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{BackendError, SearchResults};

    struct FixedSearch(Result<&'static str, u16>);

    #[async_trait]
    impl WebSearch for FixedSearch {
        async fn search(&self, _query: &str, limit: usize) -> Result<SearchResults, BackendError> {
            match self.0 {
                Ok(text) => Ok(SearchResults {
                    results: vec![json!({"Text": text}); limit.min(2)],
                    formatted: text.to_string(),
                }),
                Err(status) => Err(BackendError::Status { service: "DuckDuckGo", status }),
            }
        }
    }

    #[tokio::test]
    async fn test_query_required() {
        let tool = SearchTool::new(Arc::new(FixedSearch(Ok("x"))));
        let result = tool.execute(&Params::new(), &ToolContext::default()).await.unwrap();
        assert_eq!(result.error.as_deref(), Some("Search query required"));
    }

    #[tokio::test]
    async fn test_returns_results_with_query() {
        let tool = SearchTool::new(Arc::new(FixedSearch(Ok("Rust is fast"))));
        let params = json!({"query": "rust"}).as_object().cloned().unwrap();
        let result = tool.execute(&params, &ToolContext::default()).await.unwrap();
        assert_eq!(result.get("query"), Some(&json!("rust")));
        assert_eq!(result.get("formatted"), Some(&json!("Rust is fast")));
    }

    #[tokio::test]
    async fn test_failure_is_wrapped() {
        let tool = SearchTool::new(Arc::new(FixedSearch(Err(503))));
        let params = json!({"query": "rust"}).as_object().cloned().unwrap();
        let result = tool.execute(&params, &ToolContext::default()).await.unwrap();
        assert_eq!(result.error.as_deref(), Some("Search failed: DuckDuckGo API error: 503"));
    }
}
