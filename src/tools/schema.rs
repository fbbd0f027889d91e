//! Tool parameter schemas
//!
//! Declarative, JSON-schema-shaped parameter descriptions. They feed prompt
//! construction and the `/api/tools` listing; tools still validate their own
//! inputs at execution time.

use serde::Serialize;
use serde_json::{json, Value};

use super::ToolCategory;

/// Describes a tool to prompts and API consumers
#[derive(Debug, Clone, Serialize)]
pub struct ToolSchema {
    /// Tool name (catalog key)
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Safety category
    pub category: ToolCategory,
    /// Declared-but-inert tool
    #[serde(rename = "isStub")]
    pub is_stub: bool,
    /// JSON Schema object for parameters
    pub parameters: Value,
}

impl ToolSchema {
    pub fn new(name: &str, description: &str, category: ToolCategory) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            category,
            is_stub: false,
            parameters: json!({
                "type": "object",
                "properties": {}
            }),
        }
    }

    /// Mark as a permanently inert stub
    pub fn stub(mut self) -> Self {
        self.is_stub = true;
        self
    }

    pub fn with_string_param(self, name: &str, description: &str, required: bool) -> Self {
        self.with_property(name, json!({ "type": "string", "description": description }), required)
    }

    pub fn with_number_param(self, name: &str, description: &str, default: i64, required: bool) -> Self {
        self.with_property(
            name,
            json!({ "type": "number", "default": default, "description": description }),
            required,
        )
    }

    pub fn with_enum_param(self, name: &str, description: &str, values: &[&str], required: bool) -> Self {
        self.with_property(
            name,
            json!({ "type": "string", "enum": values, "description": description }),
            required,
        )
    }

    pub fn with_string_array_param(self, name: &str, description: &str, required: bool) -> Self {
        self.with_property(
            name,
            json!({ "type": "array", "items": { "type": "string" }, "description": description }),
            required,
        )
    }

    fn with_property(mut self, name: &str, property: Value, required: bool) -> Self {
        if let Some(props) = self.parameters.get_mut("properties") {
            props[name] = property;
        }
        if required {
            match self.parameters.get_mut("required").and_then(Value::as_array_mut) {
                Some(list) => list.push(Value::String(name.to_string())),
                None => self.parameters["required"] = json!([name]),
            }
        }
        self
    }

    /// Names of required parameters
    pub fn required(&self) -> Vec<&str> {
        self.parameters
            .get("required")
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// One bullet for prompt injection
    pub fn to_prompt_line(&self) -> String {
        format!(
            "- **{}**: {}\n  Parameters: {}",
            self.name,
            self.description,
            serde_json::to_string(&self.parameters).unwrap_or_default()
        )
    }
}
