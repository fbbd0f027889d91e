//! Goal Planner
//!
//! Turns a free-text goal into a validated, bounded `Plan`:
//! - Fast path for greetings and thanks (no reasoning call at all)
//! - Single-step fallback when no reasoner is available
//! - LLM decomposition with resilient JSON extraction
//! - Normalization: truncation to `max_steps`, per-step defaults
//!
//! Planning never fails from the caller's point of view. Any error becomes a
//! single `respond` step carrying the message in `Plan::error`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::json_extract::{extract_json, ExtractError};
use super::prompts::{format_prompt, planner_prompt};
use crate::llm::Reasoner;
use crate::tools::{Params, Tool};

/// Sentinel action: no tool, just answer
pub const RESPOND_ACTION: &str = "respond";

const DEFAULT_STEP_DESCRIPTION: &str = "Execute step";
const MAX_RELEVANT_TOOLS: usize = 6;

static SIMPLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^(hi|hello|hey|greetings|good\s*(morning|afternoon|evening))\b",
        r"(?i)^(thanks|thank you|bye|goodbye)\b",
        r"(?i)^what('s| is) (your name|time|date)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid simple-goal regex"))
    .collect()
});

/// Advisory plan complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    #[default]
    Moderate,
    Complex,
}

impl Complexity {
    fn parse(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str).map(|s| s.trim().to_lowercase()).as_deref() {
            Some("simple") => Self::Simple,
            Some("complex") => Self::Complex,
            _ => Self::Moderate,
        }
    }
}

/// One planned action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// 1-based ordinal
    pub id: u64,
    /// Tool name or `respond`
    pub action: String,
    pub description: String,
    #[serde(default)]
    pub params: Params,
}

impl Step {
    pub fn respond(description: &str) -> Self {
        Self {
            id: 1,
            action: RESPOND_ACTION.to_string(),
            description: description.to_string(),
            params: Params::new(),
        }
    }

    pub fn is_respond(&self) -> bool {
        self.action == RESPOND_ACTION
    }
}

/// Validated plan for one goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub goal: String,
    pub complexity: Complexity,
    /// Never empty
    pub steps: Vec<Step>,
    /// Zero-reasoning-call fast path
    #[serde(default)]
    pub is_simple: bool,
    /// Why planning fell back, if it did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Plan {
    /// Single `respond` step, flagged for the fast path
    pub fn simple(goal: &str) -> Self {
        Self {
            goal: goal.to_string(),
            complexity: Complexity::Simple,
            steps: vec![Step::respond("Respond to user")],
            is_simple: true,
            error: None,
        }
    }

    /// Single `respond` step recording why planning failed
    pub fn fallback(goal: &str, error: impl Into<String>) -> Self {
        Self {
            is_simple: false,
            error: Some(error.into()),
            ..Self::simple(goal)
        }
    }

    /// Exactly one `respond` step
    pub fn is_direct_response(&self) -> bool {
        self.steps.len() == 1 && self.steps[0].is_respond()
    }
}

/// Planning errors (recovered inside `plan_goal`)
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Could not parse plan from LLM response: {0}")]
    Parse(#[from] ExtractError),
    #[error("Invalid plan structure: missing goal or steps")]
    InvalidStructure,
    #[error("Plan must have at least one step")]
    NoSteps,
    #[error("{0}")]
    Reasoner(String),
}

/// Planner configuration
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Longer plans are truncated to this many steps
    pub max_steps: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { max_steps: 5 }
    }
}

/// Inputs to `plan_goal`
#[derive(Clone, Default)]
pub struct PlanOptions {
    /// Reasoning engine; `None` means plan without one
    pub reasoner: Option<Arc<dyn Reasoner>>,
    /// Tools named to the reasoning engine
    pub available_tools: Vec<Arc<dyn Tool>>,
    pub config: PlannerConfig,
}

/// Short greeting/thanks/trivial question
pub fn is_simple_goal(goal: &str) -> bool {
    let trimmed = goal.trim();
    trimmed.split_whitespace().count() <= 3 && SIMPLE_PATTERNS.iter().any(|p| p.is_match(trimmed))
}

/// Produce a validated plan. Never fails.
pub async fn plan_goal(goal: &str, options: PlanOptions) -> Plan {
    info!("Planning goal: {}", goal);

    if is_simple_goal(goal) {
        debug!("Simple goal detected, skipping reasoner");
        return Plan::simple(goal);
    }

    let Some(reasoner) = options.reasoner.as_ref() else {
        warn!("No reasoner available, using simple plan");
        return Plan::simple(goal);
    };

    match request_plan(goal, reasoner.as_ref(), &options).await {
        Ok(plan) => {
            info!(
                "Plan created: {} step(s), complexity {:?}",
                plan.steps.len(),
                plan.complexity
            );
            plan
        }
        Err(e) => {
            warn!("Planning failed, falling back: {}", e);
            Plan::fallback(goal, e.to_string())
        }
    }
}

async fn request_plan(goal: &str, reasoner: &dyn Reasoner, options: &PlanOptions) -> Result<Plan, PlanError> {
    let tool_names = options
        .available_tools
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(", ");
    let system_prompt = format_prompt(&planner_prompt(), &[("AVAILABLE_TOOLS", json!(tool_names))]);
    let user_message = format!("User goal: \"{}\"", goal);

    let response = reasoner
        .complete(&system_prompt, &user_message)
        .await
        .map_err(|e| PlanError::Reasoner(e.to_string()))?;
    debug!("Raw planner response: {}", preview(&response, 200));

    let raw = extract_json(&response)?;
    validate_plan(&raw, goal, &options.config)
}

/// Normalize a raw plan object.
///
/// Requires a truthy `goal` and a non-empty `steps` array. Keeps the first
/// `max_steps` steps in order and defaults missing step fields. The returned
/// plan carries the caller's `goal`, not the echoed one.
pub fn validate_plan(raw: &Value, goal: &str, config: &PlannerConfig) -> Result<Plan, PlanError> {
    let steps = match (raw.get("goal"), raw.get("steps")) {
        (Some(g), Some(Value::Array(steps))) if is_truthy(g) => steps,
        _ => return Err(PlanError::InvalidStructure),
    };

    if steps.is_empty() {
        return Err(PlanError::NoSteps);
    }

    if steps.len() > config.max_steps {
        warn!(
            "Plan has {} steps, truncating to {}",
            steps.len(),
            config.max_steps
        );
    }

    let empty = Map::new();
    let steps = steps
        .iter()
        .take(config.max_steps)
        .enumerate()
        .map(|(idx, step)| {
            let fields = step.as_object().unwrap_or(&empty);
            let text = |key: &str| fields.get(key).and_then(Value::as_str).filter(|s| !s.is_empty());

            Step {
                id: fields
                    .get("id")
                    .and_then(Value::as_u64)
                    .filter(|id| *id > 0)
                    .unwrap_or(idx as u64 + 1),
                action: text("action").unwrap_or(RESPOND_ACTION).to_string(),
                description: text("description").unwrap_or(DEFAULT_STEP_DESCRIPTION).to_string(),
                params: fields
                    .get("params")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default(),
            }
        })
        .collect();

    Ok(Plan {
        goal: goal.to_string(),
        complexity: Complexity::parse(raw.get("complexity")),
        steps,
        is_simple: false,
        error: None,
    })
}

/// Keyword pre-filter over tool names worth mentioning to the reasoner.
///
/// Independent of the selector's weighted table. `knowledge` is always added
/// when present; the result is capped at six tools.
pub fn detect_relevant_tools(goal: &str, all_tools: &[Arc<dyn Tool>]) -> Vec<Arc<dyn Tool>> {
    const TOOL_KEYWORDS: [(&str, &[&str]); 7] = [
        ("calendar", &["calendar", "schedule", "meeting", "event", "appointment"]),
        ("email", &["email", "mail", "inbox", "send", "message"]),
        ("notes", &["note", "notes", "write down", "remember"]),
        ("tasks", &["task", "todo", "remind", "reminder"]),
        ("search", &["search", "look up", "find", "google", "wiki"]),
        ("calculator", &["calculate", "math", "compute", "+", "-", "*", "/", "="]),
        ("knowledge", &["knowledge", "learn", "remember this", "what do you know"]),
    ];
    const BASELINE: [&str; 2] = [RESPOND_ACTION, "knowledge"];

    let lowered = goal.to_lowercase();
    let find = |name: &str| all_tools.iter().find(|t| t.name() == name).cloned();

    let mut relevant: Vec<Arc<dyn Tool>> = TOOL_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .filter_map(|(name, _)| find(*name))
        .collect();

    for name in BASELINE {
        if !relevant.iter().any(|t| t.name() == name) {
            if let Some(tool) = find(name) {
                relevant.push(tool);
            }
        }
    }

    relevant.truncate(MAX_RELEVANT_TOOLS);
    relevant
}

/// JS-style truthiness for loosely typed LLM output
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// First `max` chars, for log lines
pub(crate) fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_goal_detection() {
        assert!(is_simple_goal("hi"));
        assert!(is_simple_goal("  Hello there  "));
        assert!(is_simple_goal("good morning"));
        assert!(is_simple_goal("Thanks!"));
        assert!(is_simple_goal("what's your name"));
        assert!(!is_simple_goal("hi can you check my calendar"));
        assert!(!is_simple_goal("history of rome"));
        assert!(!is_simple_goal("calculate 2 + 2"));
    }

    #[test]
    fn test_validate_defaults_missing_fields() {
        let raw = json!({
            "goal": "g",
            "complexity": "complex",
            "steps": [
                {"action": "search", "params": {"query": "rust"}},
                {"id": 7, "description": "answer"},
                "not an object"
            ]
        });
        let plan = validate_plan(&raw, "user goal", &PlannerConfig::default()).unwrap();

        assert_eq!(plan.goal, "user goal");
        assert_eq!(plan.complexity, Complexity::Complex);
        assert_eq!(plan.steps[0].id, 1);
        assert_eq!(plan.steps[0].description, "Execute step");
        assert_eq!(plan.steps[0].params.get("query"), Some(&json!("rust")));
        assert_eq!(plan.steps[1].id, 7);
        assert_eq!(plan.steps[1].action, "respond");
        assert_eq!(plan.steps[2].id, 3);
        assert!(plan.steps[2].params.is_empty());
    }

    #[test]
    fn test_validate_truncates_in_order() {
        let steps: Vec<Value> = (1..=8).map(|i| json!({"id": i, "action": "search"})).collect();
        let raw = json!({"goal": "g", "steps": steps});
        let plan = validate_plan(&raw, "g", &PlannerConfig::default()).unwrap();
        assert_eq!(plan.steps.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_validate_rejects_bad_structure() {
        let config = PlannerConfig::default();
        assert!(matches!(
            validate_plan(&json!({"steps": [{}]}), "g", &config),
            Err(PlanError::InvalidStructure)
        ));
        assert!(matches!(
            validate_plan(&json!({"goal": "", "steps": [{}]}), "g", &config),
            Err(PlanError::InvalidStructure)
        ));
        assert!(matches!(
            validate_plan(&json!({"goal": "g", "steps": {}}), "g", &config),
            Err(PlanError::InvalidStructure)
        ));
        assert!(matches!(
            validate_plan(&json!({"goal": "g", "steps": []}), "g", &config),
            Err(PlanError::NoSteps)
        ));
    }

    #[test]
    fn test_unknown_complexity_is_moderate() {
        let raw = json!({"goal": "g", "complexity": "galactic", "steps": [{}]});
        let plan = validate_plan(&raw, "g", &PlannerConfig::default()).unwrap();
        assert_eq!(plan.complexity, Complexity::Moderate);
    }

    #[test]
    fn test_plan_serializes_camel_case() {
        let value = serde_json::to_value(Plan::simple("hi")).unwrap();
        assert_eq!(value["isSimple"], json!(true));
        assert_eq!(value["complexity"], json!("simple"));
        assert!(value.get("error").is_none());
        assert_eq!(
            value["steps"][0],
            json!({"id": 1, "action": "respond", "description": "Respond to user", "params": {}})
        );
    }

    #[test]
    fn test_fallback_plan_is_not_simple() {
        let plan = Plan::fallback("goal", "boom");
        assert!(!plan.is_simple);
        assert!(plan.is_direct_response());
        assert_eq!(plan.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_preview_is_char_safe() {
        assert_eq!(preview("héllo", 2), "hé...");
        assert_eq!(preview("hi", 10), "hi");
    }
}
