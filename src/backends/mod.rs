//! Tool Backends
//!
//! Narrow interfaces to the external systems tools talk to. The core treats
//! each as opaque and wraps every call in error handling.
//!
//! ```text
//! search      ──► WebSearch       (DuckDuckGo Instant Answer API)
//! calendar    ──► GoogleWorkspace (Calendar v3)
//! email       ──► GoogleWorkspace (Gmail v1)
//! notes/tasks ──► DocumentStore   (keyed by user id)
//! knowledge   ──► KnowledgeBase   (keyed by user id)
//! ```

pub mod documents;
pub mod google;
pub mod knowledge;
pub mod search;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

pub use documents::{InMemoryDocumentStore, Note, TaskItem};
pub use google::GoogleApiClient;
pub use knowledge::{InMemoryKnowledgeBase, KnowledgeHit};
pub use search::DuckDuckGoSearch;

/// Backend errors
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("{service} API error: {status}")]
    Status { service: &'static str, status: u16 },
    #[error("{0}")]
    Invalid(String),
}

/// Web search results
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub results: Vec<Value>,
    pub formatted: String,
}

/// Calendar or mailbox listing
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub items: Vec<Value>,
    pub formatted: String,
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<SearchResults, BackendError>;
}

/// OAuth-scoped, read-only access to the user's Google account
#[async_trait]
pub trait GoogleWorkspace: Send + Sync {
    /// Events for `today`, `tomorrow` or `week`
    async fn calendar_events(&self, access_token: &str, timeframe: &str) -> Result<Listing, BackendError>;

    /// Messages for `recent`, `unread` or `all`
    async fn recent_emails(&self, access_token: &str, filter: &str, limit: usize) -> Result<Listing, BackendError>;
}

/// Per-user notes and tasks
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn add_note(&self, user_id: &str, content: &str) -> Result<Note, BackendError>;

    /// Newest first
    async fn list_notes(&self, user_id: &str, limit: usize) -> Result<Vec<Note>, BackendError>;

    async fn add_task(&self, user_id: &str, content: &str) -> Result<TaskItem, BackendError>;

    /// Open tasks, newest first
    async fn list_open_tasks(&self, user_id: &str) -> Result<Vec<TaskItem>, BackendError>;

    /// Complete the first open task whose content contains `needle` (case-insensitive)
    async fn complete_task_matching(&self, user_id: &str, needle: &str) -> Result<Option<TaskItem>, BackendError>;
}

/// Per-user knowledge store
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    async fn store(&self, user_id: &str, document_name: &str, text: &str) -> Result<(), BackendError>;

    async fn query(&self, user_id: &str, query: &str) -> Result<Vec<KnowledgeHit>, BackendError>;
}

/// Bundle of backends the standard catalog is built from
#[derive(Clone)]
pub struct Backends {
    pub search: Arc<dyn WebSearch>,
    pub google: Arc<dyn GoogleWorkspace>,
    pub documents: Arc<dyn DocumentStore>,
    pub knowledge: Arc<dyn KnowledgeBase>,
}

impl Default for Backends {
    fn default() -> Self {
        Self {
            search: Arc::new(DuckDuckGoSearch::new()),
            google: Arc::new(GoogleApiClient::new()),
            documents: Arc::new(InMemoryDocumentStore::new()),
            knowledge: Arc::new(InMemoryKnowledgeBase::new()),
        }
    }
}
