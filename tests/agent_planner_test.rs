//! Planner Integration Tests
//!
//! Fast path, reasoner-backed planning, fallbacks, and plan validation.

mod common;

use common::ScriptedReasoner;
use localmind_agent::agent::planner::is_simple_goal;
use localmind_agent::agent::{
    detect_relevant_tools, plan_goal, validate_plan, Complexity, PlanError, PlanOptions, PlannerConfig,
    RESPOND_ACTION,
};
use localmind_agent::backends::Backends;
use localmind_agent::llm::Reasoner;
use localmind_agent::tools::{SelectOptions, Tool, ToolCatalog};
use serde_json::json;
use std::sync::Arc;

fn options(reasoner: &Arc<ScriptedReasoner>, tools: Vec<Arc<dyn Tool>>) -> PlanOptions {
    PlanOptions {
        reasoner: Some(reasoner.clone() as Arc<dyn Reasoner>),
        available_tools: tools,
        config: PlannerConfig::default(),
    }
}

fn names(tools: &[Arc<dyn Tool>]) -> Vec<&'static str> {
    tools.iter().map(|t| t.name()).collect()
}

#[tokio::test]
async fn test_greetings_skip_the_reasoner() {
    let reasoner = ScriptedReasoner::new(&[]);

    for goal in ["hello", "Hey there", "thanks!", "good morning", "what's your name"] {
        let plan = plan_goal(goal, options(&reasoner, Vec::new())).await;
        assert!(plan.is_simple, "{goal} should be simple");
        assert_eq!(plan.complexity, Complexity::Simple);
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].action, RESPOND_ACTION);
        assert_eq!(plan.goal, goal);
    }

    assert_eq!(reasoner.call_count(), 0);
}

#[test]
fn test_simple_goal_detection_boundaries() {
    assert!(is_simple_goal("  hi  "));
    assert!(is_simple_goal("Thank you so"));
    assert!(!is_simple_goal("history of rome"));
    assert!(!is_simple_goal("hello can you check my calendar"));
    assert!(!is_simple_goal("calculate 2+2"));
}

#[tokio::test]
async fn test_no_reasoner_yields_single_respond_step() {
    let plan = plan_goal("summarize my week", PlanOptions::default()).await;
    assert!(plan.is_simple);
    assert!(plan.is_direct_response());
    assert!(plan.error.is_none());
}

#[tokio::test]
async fn test_reasoner_plan_is_validated_and_truncated() {
    let steps: Vec<_> = (1..=7)
        .map(|i| json!({"id": i, "action": "search", "description": format!("Search {}", i), "params": {"query": "q"}}))
        .collect();
    let reply = format!(
        "Here is my plan:\n{}\nLet me know!",
        json!({"goal": "research", "complexity": "complex", "steps": steps})
    );
    let reasoner = ScriptedReasoner::new(&[reply.as_str()]);
    let catalog = ToolCatalog::standard(&Backends::default());
    let tools = catalog.select_tools("search the web for rust news", 6, SelectOptions::default());

    let plan = plan_goal("search the web for rust news", options(&reasoner, tools)).await;

    assert!(!plan.is_simple);
    assert_eq!(plan.complexity, Complexity::Complex);
    assert_eq!(plan.steps.len(), 5);
    assert_eq!(plan.steps[4].description, "Search 5");
    assert_eq!(plan.steps[0].params.get("query"), Some(&json!("q")));
    assert_eq!(plan.goal, "search the web for rust news");

    let calls = reasoner.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].0.contains("search"));
    assert_eq!(calls[0].1, "User goal: \"search the web for rust news\"");
}

#[tokio::test]
async fn test_fenced_plan_is_accepted() {
    let reply = "```json\n{\"goal\": \"g\", \"steps\": [{\"action\": \"calculator\", \"params\": {\"expression\": \"2*3\"}}]}\n```";
    let reasoner = ScriptedReasoner::new(&[reply]);

    let plan = plan_goal("calculate 2*3 for me", options(&reasoner, Vec::new())).await;

    assert_eq!(plan.complexity, Complexity::Moderate);
    assert_eq!(plan.steps.len(), 1);
    assert_eq!(plan.steps[0].id, 1);
    assert_eq!(plan.steps[0].action, "calculator");
    assert_eq!(plan.steps[0].description, "Execute step");
}

#[tokio::test]
async fn test_unparseable_reply_falls_back() {
    let reasoner = ScriptedReasoner::new(&["Sure, I can help with that."]);

    let plan = plan_goal("find flights to Lisbon", options(&reasoner, Vec::new())).await;

    assert!(!plan.is_simple);
    assert!(plan.is_direct_response());
    assert!(plan.error.as_deref().unwrap_or_default().contains("Could not parse plan"));
}

#[tokio::test]
async fn test_reasoner_failure_falls_back() {
    let reasoner = ScriptedReasoner::with_results(vec![Err("connection refused")]);

    let plan = plan_goal("find flights to Lisbon", options(&reasoner, Vec::new())).await;

    assert!(plan.is_direct_response());
    assert_eq!(plan.error.as_deref(), Some("connection refused"));
}

#[tokio::test]
async fn test_structurally_invalid_reply_falls_back() {
    let reasoner = ScriptedReasoner::new(&[r#"{"goal": "g", "steps": []}"#]);

    let plan = plan_goal("organize my inbox", options(&reasoner, Vec::new())).await;

    assert_eq!(plan.error.as_deref(), Some("Plan must have at least one step"));
}

#[test]
fn test_validate_plan_structure_errors() {
    let config = PlannerConfig::default();

    let missing_goal = validate_plan(&json!({"steps": [{"action": "search"}]}), "g", &config);
    assert!(matches!(missing_goal, Err(PlanError::InvalidStructure)));

    let empty_goal = validate_plan(&json!({"goal": "", "steps": [{"action": "search"}]}), "g", &config);
    assert!(matches!(empty_goal, Err(PlanError::InvalidStructure)));

    let steps_not_array = validate_plan(&json!({"goal": "g", "steps": "search"}), "g", &config);
    assert!(matches!(steps_not_array, Err(PlanError::InvalidStructure)));

    let no_steps = validate_plan(&json!({"goal": "g", "steps": []}), "g", &config);
    assert!(matches!(no_steps, Err(PlanError::NoSteps)));
}

#[test]
fn test_validate_plan_defaults_step_fields() {
    let raw = json!({
        "goal": "g",
        "complexity": "SIMPLE",
        "steps": [{}, {"id": 0, "action": "notes", "description": "Save"}, "garbage"]
    });
    let plan = validate_plan(&raw, "user goal", &PlannerConfig { max_steps: 5 }).unwrap();

    assert_eq!(plan.complexity, Complexity::Simple);
    assert!(!plan.is_simple);
    let ids: Vec<u64> = plan.steps.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(plan.steps[0].action, RESPOND_ACTION);
    assert_eq!(plan.steps[1].description, "Save");
    assert!(plan.steps[2].params.is_empty());
}

#[test]
fn test_detect_relevant_tools() {
    let catalog = ToolCatalog::standard(&Backends::default());

    let picked = detect_relevant_tools("schedule a meeting and email Sam", catalog.tools());
    assert_eq!(names(&picked), vec!["calendar", "email", "knowledge"]);

    // Knowledge is always offered, the respond baseline has no catalog entry
    let baseline = detect_relevant_tools("hmm", catalog.tools());
    assert_eq!(names(&baseline), vec!["knowledge"]);

    let busy = detect_relevant_tools(
        "search my email, calendar, notes and tasks then calculate 2+2",
        catalog.tools(),
    );
    assert_eq!(busy.len(), 6);
}
