//! In-process document store for notes and tasks
//!
//! Durable persistence is out of scope; the store lives as long as the process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;

use super::{BackendError, DocumentStore};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    pub id: String,
    pub content: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub struct InMemoryDocumentStore {
    notes: RwLock<HashMap<String, Vec<Note>>>,
    tasks: RwLock<HashMap<String, Vec<TaskItem>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn add_note(&self, user_id: &str, content: &str) -> Result<Note, BackendError> {
        let note = Note {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.notes
            .write()
            .entry(user_id.to_string())
            .or_default()
            .push(note.clone());
        Ok(note)
    }

    async fn list_notes(&self, user_id: &str, limit: usize) -> Result<Vec<Note>, BackendError> {
        Ok(self
            .notes
            .read()
            .get(user_id)
            .map(|notes| notes.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn add_task(&self, user_id: &str, content: &str) -> Result<TaskItem, BackendError> {
        let task = TaskItem {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.to_string(),
            completed: false,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.tasks
            .write()
            .entry(user_id.to_string())
            .or_default()
            .push(task.clone());
        Ok(task)
    }

    async fn list_open_tasks(&self, user_id: &str) -> Result<Vec<TaskItem>, BackendError> {
        Ok(self
            .tasks
            .read()
            .get(user_id)
            .map(|tasks| tasks.iter().rev().filter(|t| !t.completed).cloned().collect())
            .unwrap_or_default())
    }

    async fn complete_task_matching(&self, user_id: &str, needle: &str) -> Result<Option<TaskItem>, BackendError> {
        let needle = needle.to_lowercase();
        let mut tasks = self.tasks.write();
        let found = tasks.get_mut(user_id).and_then(|list| {
            list.iter_mut()
                .find(|t| !t.completed && t.content.to_lowercase().contains(&needle))
        });

        Ok(found.map(|task| {
            task.completed = true;
            task.updated_at = Some(Utc::now());
            task.clone()
        }))
    }
}
