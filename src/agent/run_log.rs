//! Run log store
//!
//! Structured, timestamped entries per run for later inspection. The store
//! is injected into the executor; the hosting service owns eviction.

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Kind of a run log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Plan,
    ToolCall,
    ToolResult,
    Decision,
    Error,
    Final,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::ToolCall => "tool_call",
            Self::ToolResult => "tool_result",
            Self::Decision => "decision",
            Self::Error => "error",
            Self::Final => "final",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structured log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub run_id: String,
    /// Unix epoch milliseconds
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: LogKind,
    pub data: Value,
}

impl LogEntry {
    /// Entry stamped with the current time
    pub fn now(run_id: &str, kind: LogKind, data: Value) -> Self {
        Self {
            run_id: run_id.to_string(),
            timestamp: Utc::now().timestamp_millis(),
            kind,
            data,
        }
    }
}

/// Append-only-per-run log storage
pub trait RunLogStore: Send + Sync {
    fn append(&self, entry: LogEntry);

    /// Entries for a run in append order; empty if unknown
    fn get(&self, run_id: &str) -> Vec<LogEntry>;

    /// Drop every run whose first entry is older than `max_age`. Returns how many.
    fn evict_older_than(&self, max_age: Duration) -> usize;

    /// Number of runs held
    fn run_count(&self) -> usize;
}

/// Process-local store guarded by a `RwLock`
#[derive(Default)]
pub struct InMemoryRunLogStore {
    runs: RwLock<HashMap<String, Vec<LogEntry>>>,
}

impl InMemoryRunLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn evict_before(&self, cutoff_ms: i64) -> usize {
        let mut runs = self.runs.write();
        let before = runs.len();
        runs.retain(|_, entries| entries.first().map(|e| e.timestamp >= cutoff_ms).unwrap_or(false));
        before - runs.len()
    }
}

impl RunLogStore for InMemoryRunLogStore {
    fn append(&self, mut entry: LogEntry) {
        let mut runs = self.runs.write();
        let entries = runs.entry(entry.run_id.clone()).or_default();
        // Wall clock can step backwards; keep per-run order monotonic
        if let Some(last) = entries.last() {
            entry.timestamp = entry.timestamp.max(last.timestamp);
        }
        entries.push(entry);
    }

    fn get(&self, run_id: &str) -> Vec<LogEntry> {
        self.runs.read().get(run_id).cloned().unwrap_or_default()
    }

    fn evict_older_than(&self, max_age: Duration) -> usize {
        let max_age_ms = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
        let cutoff = Utc::now().timestamp_millis().saturating_sub(max_age_ms);
        self.evict_before(cutoff)
    }

    fn run_count(&self) -> usize {
        self.runs.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(run_id: &str, timestamp: i64, kind: LogKind) -> LogEntry {
        LogEntry {
            run_id: run_id.to_string(),
            timestamp,
            kind,
            data: json!({}),
        }
    }

    #[test]
    fn test_append_and_get() {
        let store = InMemoryRunLogStore::new();
        store.append(LogEntry::now("run_a", LogKind::Plan, json!({"goal": "x"})));
        store.append(LogEntry::now("run_a", LogKind::Final, json!({"stepsCompleted": 0})));

        let logs = store.get("run_a");
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].kind, LogKind::Plan);
        assert_eq!(logs[1].kind, LogKind::Final);
        assert!(store.get("run_missing").is_empty());
    }

    #[test]
    fn test_timestamps_never_decrease() {
        let store = InMemoryRunLogStore::new();
        store.append(entry("r", 2_000, LogKind::Plan));
        store.append(entry("r", 1_000, LogKind::Final));

        let logs = store.get("r");
        assert_eq!(logs[1].timestamp, 2_000);
    }

    #[test]
    fn test_eviction_uses_first_entry_age() {
        let store = InMemoryRunLogStore::new();
        let now = Utc::now().timestamp_millis();
        store.append(entry("old", now - 7_200_000, LogKind::Plan));
        store.append(entry("old", now, LogKind::Final));
        store.append(entry("fresh", now, LogKind::Plan));

        let evicted = store.evict_older_than(Duration::from_secs(3600));
        assert_eq!(evicted, 1);
        assert!(store.get("old").is_empty());
        assert_eq!(store.get("fresh").len(), 1);
        assert_eq!(store.run_count(), 1);
    }

    #[test]
    fn test_entry_serializes_with_type_tag() {
        let value = serde_json::to_value(entry("r", 5, LogKind::ToolResult)).unwrap();
        assert_eq!(value, json!({"runId": "r", "timestamp": 5, "type": "tool_result", "data": {}}));
    }
}
