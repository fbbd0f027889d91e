//! Agent API
//!
//! `POST /api/agent` streams progress events as Server-Sent Events. Each
//! `data:` line is one `ProgressEvent`, and a successful stream always ends
//! with `{"type":"done"}`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tracing::{error, info, warn};

use super::AppState;
use crate::agent::prompts::chat_prompt;
use crate::agent::{plan_goal, ExecuteOptions, LogEntry, PlanOptions, ProgressEvent, StepCallback};
use crate::llm::Reasoner;
use crate::tools::{SelectOptions, ToolCatalog, ToolContext, ToolSchema};

/// Reply for trivial turns when no reasoning engine is configured
pub const OFFLINE_REPLY: &str =
    "Sorry, the assistant is offline right now: no reasoning engine is available. Please try again later.";

/// Agent request body
#[derive(Debug, Default, Deserialize)]
pub struct AgentRequest {
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl AgentRequest {
    fn context(&self) -> ToolContext {
        ToolContext {
            user_id: self.user_id.clone(),
            access_token: self.access_token.clone(),
            chat_id: self.chat_id.clone(),
        }
    }
}

/// Plan and execute a goal, streaming progress
pub async fn run_agent(State(state): State<Arc<AppState>>, Json(request): Json<AgentRequest>) -> Response {
    let goal = request.goal.as_deref().map(str::trim).unwrap_or_default().to_string();
    if goal.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Goal is required" }))).into_response();
    }

    info!("Agent goal: {}", goal);
    let (tx, rx) = mpsc::unbounded_channel::<ProgressEvent>();
    let context = request.context();

    tokio::spawn(async move {
        let worker = tokio::spawn(drive_run(state, goal, context, tx.clone()));
        if let Err(e) = worker.await {
            error!("Agent run crashed: {}", e);
            let _ = tx.send(ProgressEvent::Error {
                error: format!("Agent run failed: {}", e),
            });
        }
    });

    let stream = UnboundedReceiverStream::new(rx).map(|event| Ok::<_, Infallible>(Event::default().data(event.to_json())));
    Sse::new(stream).keep_alive(KeepAlive::default()).into_response()
}

async fn drive_run(state: Arc<AppState>, goal: String, context: ToolContext, tx: UnboundedSender<ProgressEvent>) {
    let catalog = state.executor.catalog();
    let available_tools = catalog.select_tools(&goal, state.max_tools, SelectOptions::default());
    info!(
        "Active tools: {:?}",
        available_tools.iter().map(|t| t.name()).collect::<Vec<_>>()
    );

    let plan = plan_goal(
        &goal,
        PlanOptions {
            reasoner: state.reasoner.clone(),
            available_tools,
            config: state.planner.clone(),
        },
    )
    .await;

    let on_step: StepCallback = {
        let tx = tx.clone();
        Arc::new(move |event| {
            // Receiver gone means the client disconnected; the run finishes anyway
            let _ = tx.send(event);
        })
    };

    let run = state
        .executor
        .execute_plan(
            &plan,
            ExecuteOptions {
                reasoner: state.reasoner.clone(),
                context,
                on_step: Some(on_step),
            },
        )
        .await;

    if run.is_simple {
        match simple_reply(state.reasoner.as_deref(), &goal).await {
            Ok(content) => {
                let _ = tx.send(ProgressEvent::Final { content: Some(content) });
            }
            Err(e) => {
                warn!("[{}] Reply generation failed: {}", run.run_id, e);
                let _ = tx.send(ProgressEvent::Error { error: e.to_string() });
                return;
            }
        }
    }

    let _ = tx.send(ProgressEvent::Done);
}

/// Reply for the simple fast path, generated by the caller rather than the executor
async fn simple_reply(reasoner: Option<&dyn Reasoner>, goal: &str) -> anyhow::Result<String> {
    match reasoner {
        Some(reasoner) => reasoner.complete(&chat_prompt(), goal).await,
        None => Ok(OFFLINE_REPLY.to_string()),
    }
}

/// Logs of one run; empty array if unknown or evicted
pub async fn run_logs(State(state): State<Arc<AppState>>, Path(run_id): Path<String>) -> Json<Vec<LogEntry>> {
    Json(state.executor.run_logs(&run_id))
}

/// Every catalog tool with its category
pub async fn list_tools(State(state): State<Arc<AppState>>) -> Json<Vec<ToolSchema>> {
    Json(ToolCatalog::schemas(state.executor.catalog().tools()))
}

pub fn agent_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/agent", post(run_agent))
        .route("/agent/runs/{run_id}", get(run_logs))
        .route("/tools", get(list_tools))
        .with_state(state)
}
