//! HTTP API Integration Tests
//!
//! Drives the axum router in-process with `oneshot`.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::ScriptedReasoner;
use localmind_agent::agent::{AgentExecutor, InMemoryRunLogStore, RunLogStore};
use localmind_agent::backends::Backends;
use localmind_agent::llm::Reasoner;
use localmind_agent::server::{agent_api::OFFLINE_REPLY, build_router, AppState};
use localmind_agent::tools::ToolCatalog;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn state(reasoner: Option<Arc<dyn Reasoner>>) -> Arc<AppState> {
    let catalog = Arc::new(ToolCatalog::standard(&Backends::default()));
    let executor = AgentExecutor::new(catalog, Arc::new(InMemoryRunLogStore::new()));
    Arc::new(AppState::new(Arc::new(executor), reasoner))
}

fn post_agent(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/agent")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Parse every `data:` line of an SSE body
async fn sse_events(router: Router, request: Request<Body>) -> Vec<Value> {
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec())
        .unwrap()
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect()
}

fn types(events: &[Value]) -> Vec<&str> {
    events.iter().filter_map(|e| e["type"].as_str()).collect()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = body_json(build_router(state(None)), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["runs_retained"], 0);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_missing_goal_is_rejected() {
    for body in [json!({}), json!({"goal": ""}), json!({"goal": "   "})] {
        let (status, body) = body_json(build_router(state(None)), post_agent(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Goal is required"}));
    }
}

#[tokio::test]
async fn test_simple_goal_streams_reply_then_done() {
    let state = state(None);
    let events = sse_events(build_router(state.clone()), post_agent(json!({"goal": "hello"}))).await;

    assert_eq!(types(&events), vec!["planning", "final", "done"]);
    assert_eq!(events[0]["complexity"], "simple");
    assert_eq!(events[1]["content"], OFFLINE_REPLY);
    assert_eq!(state.executor.log_store().run_count(), 1);
}

#[tokio::test]
async fn test_simple_goal_reply_comes_from_reasoner() {
    let reasoner = ScriptedReasoner::new(&["Hello! How can I help?"]);
    let events = sse_events(
        build_router(state(Some(reasoner.clone() as Arc<dyn Reasoner>))),
        post_agent(json!({"goal": "hi", "chat_id": "c1"})),
    )
    .await;

    assert_eq!(types(&events), vec!["planning", "final", "done"]);
    assert_eq!(events[1]["content"], "Hello! How can I help?");
    // Only the reply; planning took the fast path
    assert_eq!(reasoner.call_count(), 1);
    assert_eq!(reasoner.calls()[0].1, "hi");
}

#[tokio::test]
async fn test_simple_reply_failure_is_an_error_event() {
    let reasoner = ScriptedReasoner::with_results(vec![Err("model not loaded")]);
    let events = sse_events(build_router(state(Some(reasoner as Arc<dyn Reasoner>))), post_agent(json!({"goal": "thanks"}))).await;

    assert_eq!(types(&events), vec!["planning", "error"]);
    assert_eq!(events[1]["error"], "model not loaded");
}

#[tokio::test]
async fn test_tool_goal_streams_every_stage() {
    let plan = json!({
        "goal": "calculate 2+2",
        "complexity": "moderate",
        "steps": [{"id": 1, "action": "calculator", "description": "Add", "params": {"expression": "2+2"}}]
    });
    let plan = plan.to_string();
    let reasoner = ScriptedReasoner::new(&[plan.as_str(), "2 + 2 = 4"]);

    let events = sse_events(
        build_router(state(Some(reasoner.clone() as Arc<dyn Reasoner>))),
        post_agent(json!({"goal": "calculate 2+2"})),
    )
    .await;

    assert_eq!(
        types(&events),
        vec!["planning", "step", "tool_call", "tool_result", "final", "done"]
    );
    assert_eq!(events[1]["index"], 1);
    assert_eq!(events[1]["total"], 1);
    assert_eq!(events[2]["tool"], "calculator");
    assert_eq!(events[3]["result"]["result"], 4);
    assert_eq!(events[3]["success"], true);
    assert_eq!(events[4]["content"], "2 + 2 = 4");

    // Planner prompt names the selected tools
    assert!(reasoner.calls()[0].0.contains("calculator"));
}

#[tokio::test]
async fn test_unknown_run_has_no_logs() {
    let (status, body) = body_json(build_router(state(None)), get("/api/agent/runs/run_missing")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_tools_listing() {
    let (status, body) = body_json(build_router(state(None)), get("/api/tools")).await;
    assert_eq!(status, StatusCode::OK);

    let tools = body.as_array().unwrap();
    assert_eq!(tools.len(), 10);
    assert_eq!(tools[0]["name"], "calendar");
    assert_eq!(tools[0]["category"], "sensitive");
    assert!(tools.iter().any(|t| t["name"] == "system" && t["isStub"] == true));
}
