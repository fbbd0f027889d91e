//! In-process knowledge base
//!
//! Keyword-overlap retrieval over stored documents. Stands in for the
//! external RAG service behind the same `KnowledgeBase` interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;

use super::{BackendError, KnowledgeBase};

const MAX_HITS: usize = 3;
const EXCERPT_CHARS: usize = 280;

#[derive(Debug, Clone)]
struct KnowledgeDocument {
    name: String,
    text: String,
    stored_at: DateTime<Utc>,
}

/// A retrieved document
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeHit {
    pub document_name: String,
    pub excerpt: String,
    pub score: usize,
    pub stored_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct InMemoryKnowledgeBase {
    documents: RwLock<HashMap<String, Vec<KnowledgeDocument>>>,
}

impl InMemoryKnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }
}

fn query_terms(query: &str) -> Vec<String> {
    query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 2)
        .map(str::to_lowercase)
        .collect()
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(EXCERPT_CHARS - 3).collect();
    format!("{}...", cut)
}

#[async_trait]
impl KnowledgeBase for InMemoryKnowledgeBase {
    async fn store(&self, user_id: &str, document_name: &str, text: &str) -> Result<(), BackendError> {
        if text.trim().is_empty() {
            return Err(BackendError::Invalid("Content required".to_string()));
        }

        self.documents
            .write()
            .entry(user_id.to_string())
            .or_default()
            .push(KnowledgeDocument {
                name: document_name.to_string(),
                text: text.to_string(),
                stored_at: Utc::now(),
            });
        Ok(())
    }

    async fn query(&self, user_id: &str, query: &str) -> Result<Vec<KnowledgeHit>, BackendError> {
        let terms = query_terms(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let documents = self.documents.read();
        let mut hits: Vec<KnowledgeHit> = documents
            .get(user_id)
            .map(|docs| {
                docs.iter()
                    .filter_map(|doc| {
                        let haystack = format!("{} {}", doc.name, doc.text).to_lowercase();
                        let score = terms.iter().filter(|t| haystack.contains(t.as_str())).count();
                        (score > 0).then(|| KnowledgeHit {
                            document_name: doc.name.clone(),
                            excerpt: excerpt(&doc.text),
                            score,
                            stored_at: doc.stored_at,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        // Stable: equal scores keep storage order
        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits.truncate(MAX_HITS);
        Ok(hits)
    }
}
