//! Tool Catalog
//!
//! The fixed set of capabilities the agent can invoke:
//! - Closed enumeration of tool identifiers (`ToolId`)
//! - Safety categories (safe / sensitive / dangerous stub)
//! - Uniform async execute contract returning a `ToolResult`
//! - Relevance-ranked, safety-filtered selection (`ToolCatalog::select_tools`)
//!
//! Tools never fail loudly for expected conditions: missing auth, bad params
//! and backend errors come back as a `ToolResult` with an `error` field.

pub mod calculator;
pub mod calendar;
pub mod catalog;
pub mod email;
pub mod knowledge;
pub mod notes;
pub mod schema;
pub mod search;
pub mod stubs;
pub mod tasks;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub use catalog::{DispatchOutcome, SelectOptions, ToolCatalog};
pub use schema::ToolSchema;

/// Tool parameters as passed verbatim from a plan step
pub type Params = Map<String, Value>;

/// Identifier of every tool the catalog knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolId {
    Calendar,
    Email,
    Notes,
    Tasks,
    Search,
    Calculator,
    Knowledge,
    Browser,
    Filesystem,
    System,
}

impl ToolId {
    /// Catalog order; also the selector's tie-break order
    pub const ALL: [ToolId; 10] = [
        ToolId::Calendar,
        ToolId::Email,
        ToolId::Notes,
        ToolId::Tasks,
        ToolId::Search,
        ToolId::Calculator,
        ToolId::Knowledge,
        ToolId::Browser,
        ToolId::Filesystem,
        ToolId::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calendar => "calendar",
            Self::Email => "email",
            Self::Notes => "notes",
            Self::Tasks => "tasks",
            Self::Search => "search",
            Self::Calculator => "calculator",
            Self::Knowledge => "knowledge",
            Self::Browser => "browser",
            Self::Filesystem => "filesystem",
            Self::System => "system",
        }
    }

    /// Resolve a plan action name. Anything unrecognized is `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "calendar" => Some(Self::Calendar),
            "email" => Some(Self::Email),
            "notes" => Some(Self::Notes),
            "tasks" => Some(Self::Tasks),
            "search" => Some(Self::Search),
            "calculator" => Some(Self::Calculator),
            "knowledge" => Some(Self::Knowledge),
            "browser" => Some(Self::Browser),
            "filesystem" => Some(Self::Filesystem),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    /// Relevance keywords used by the selector. Longer matches weigh more.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Calendar => &["calendar", "schedule", "meeting", "event", "appointment", "tomorrow", "today", "week"],
            Self::Email => &["email", "mail", "inbox", "gmail", "send", "message", "unread"],
            Self::Notes => &["note", "notes", "write", "jot", "remember", "memo"],
            Self::Tasks => &["task", "todo", "remind", "reminder", "deadline", "due"],
            Self::Search => &["search", "look up", "find", "google", "web", "wiki", "what is", "who is"],
            Self::Calculator => &["calculate", "math", "compute", "solve", "+", "-", "*", "/", "=", "percent", "sum"],
            Self::Knowledge => &["knowledge", "learn", "remember this", "recall", "what do you know"],
            Self::Browser => &["browse", "website", "url", "open page"],
            Self::Filesystem => &["file", "folder", "directory"],
            Self::System => &["command", "terminal", "shell"],
        }
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Safety category of a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    /// Executes unconditionally
    Safe,
    /// Reads privileged external data
    Sensitive,
    /// Permanently stubbed, fails closed
    Dangerous,
}

/// Caller identity and privileged tokens for one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolContext {
    pub user_id: Option<String>,
    pub access_token: Option<String>,
    pub chat_id: Option<String>,
}

impl ToolContext {
    pub fn for_user(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            ..Self::default()
        }
    }

    /// Non-empty user id, if authenticated
    pub fn user(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|u| !u.is_empty())
    }

    /// Non-empty access token, if connected
    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Outcome of one tool execution: a payload object, optionally with an `error`.
///
/// Serializes flat, e.g. `{"error": "...", "requiresConfirmation": true}` or
/// `{"expression": "2 + 2", "result": 4}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ToolResult {
    /// Success payload. Non-object values are stored under `result`.
    pub fn ok(payload: Value) -> Self {
        let fields = match payload {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("result".to_string(), other);
                map
            }
        };
        Self { error: None, fields }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            fields: Map::new(),
        }
    }

    /// Attach an extra field (e.g. `needsAuth`, `isStub`)
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// A cataloged capability
#[async_trait]
pub trait Tool: Send + Sync {
    fn id(&self) -> ToolId;

    fn category(&self) -> ToolCategory;

    /// Schema and description for prompts
    fn describe(&self) -> ToolSchema;

    /// Declared-but-inert extension point
    fn is_stub(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        self.id().as_str()
    }

    /// Run the tool. `Err` is reserved for unexpected failures; callers wrap it.
    async fn execute(&self, params: &Params, context: &ToolContext) -> anyhow::Result<ToolResult>;
}

/// Non-empty string parameter
pub(crate) fn str_param<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

/// Positive integer parameter, accepting numbers or numeric strings
pub(crate) fn usize_param(params: &Params, key: &str, default: usize) -> usize {
    match params.get(key) {
        Some(Value::Number(n)) => n.as_f64().filter(|v| *v >= 1.0).map(|v| v as usize).unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse().ok().filter(|v| *v > 0).unwrap_or(default),
        _ => default,
    }
}
