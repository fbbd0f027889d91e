//! DuckDuckGo Instant Answer search (free, no API key)

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{BackendError, SearchResults, WebSearch};

const DDG_API_URL: &str = "https://api.duckduckgo.com/";
const USER_AGENT: &str = "LocalMind/1.0";
const EMPTY_RESULTS: &str = "[No search results found. Try a different query.]";

#[derive(Clone)]
pub struct DuckDuckGoSearch {
    client: Client,
    base_url: String,
}

impl DuckDuckGoSearch {
    pub fn new() -> Self {
        Self::with_base_url(DDG_API_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.to_string(),
        }
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebSearch for DuckDuckGoSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<SearchResults, BackendError> {
        debug!("DuckDuckGo search: {}", query);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::Status {
                service: "DuckDuckGo",
                status: response.status().as_u16(),
            });
        }

        let body: Value = response.json().await?;
        Ok(to_results(&body, limit))
    }
}

/// Flatten an Instant Answer payload into results plus an LLM-ready text block
pub fn to_results(body: &Value, limit: usize) -> SearchResults {
    let topics: Vec<Value> = body
        .get("RelatedTopics")
        .and_then(Value::as_array)
        .map(|topics| {
            topics
                .iter()
                .filter(|t| t.get("Text").and_then(Value::as_str).is_some())
                .take(limit)
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    SearchResults {
        results: topics,
        formatted: format_search_results(body),
    }
}

/// Format search results for AI context
pub fn format_search_results(body: &Value) -> String {
    let mut formatted = String::from("[Web Search Results]\n\n");
    let header_len = formatted.len();

    if let Some(abstract_text) = body.get("Abstract").and_then(Value::as_str).filter(|s| !s.is_empty()) {
        formatted.push_str(&format!("Summary: {}\n", abstract_text));
        if let Some(url) = body.get("AbstractURL").and_then(Value::as_str).filter(|s| !s.is_empty()) {
            formatted.push_str(&format!("Source: {}\n\n", url));
        }
    }

    if let Some(topics) = body.get("RelatedTopics").and_then(Value::as_array).filter(|t| !t.is_empty()) {
        formatted.push_str("Related Information:\n");
        for text in topics.iter().take(5).filter_map(|t| t.get("Text").and_then(Value::as_str)) {
            formatted.push_str(&format!("- {}\n", text));
        }
    }

    if let Some(items) = body.pointer("/Infobox/content").and_then(Value::as_array) {
        formatted.push_str("\nQuick Facts:\n");
        for item in items.iter().take(5) {
            let label = item.get("label").and_then(Value::as_str);
            let value = item.get("value").and_then(Value::as_str);
            if let (Some(label), Some(value)) = (label, value) {
                formatted.push_str(&format!("- {}: {}\n", label, value));
            }
        }
    }

    if formatted.len() == header_len {
        return EMPTY_RESULTS.to_string();
    }

    formatted
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_full_payload() {
        let body = json!({
            "Abstract": "Rust is a systems language.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Rust",
            "RelatedTopics": [{"Text": "Cargo - package manager"}, {"Name": "group"}],
            "Infobox": {"content": [{"label": "Designed by", "value": "Graydon Hoare"}]}
        });

        let text = format_search_results(&body);
        assert!(text.starts_with("[Web Search Results]"));
        assert!(text.contains("Summary: Rust is a systems language."));
        assert!(text.contains("Source: https://en.wikipedia.org/wiki/Rust"));
        assert!(text.contains("- Cargo - package manager"));
        assert!(text.contains("- Designed by: Graydon Hoare"));

        let results = to_results(&body, 5);
        assert_eq!(results.results.len(), 1);
    }

    #[test]
    fn test_format_empty_payload() {
        assert_eq!(format_search_results(&json!({"Abstract": ""})), EMPTY_RESULTS);
    }

    #[test]
    fn test_results_respect_limit() {
        let body = json!({"RelatedTopics": [{"Text": "a"}, {"Text": "b"}, {"Text": "c"}]});
        assert_eq!(to_results(&body, 2).results.len(), 2);
    }
}
