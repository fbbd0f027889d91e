//! HTTP server
//!
//! Axum router exposing the agent over SSE, plus health and inspection
//! endpoints:
//! - `POST /api/agent` streams progress events
//! - `GET /api/agent/runs/{run_id}` returns a run's logs
//! - `GET /api/tools` lists the catalog
//! - `GET /health` and `GET /healthz`

pub mod agent_api;
pub mod health;

pub use agent_api::agent_router;
pub use health::health_router;

use axum::{
    http::{header, Method},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::agent::{AgentExecutor, PlannerConfig};
use crate::llm::Reasoner;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<AgentExecutor>,
    /// `None` runs the agent without planning or synthesis
    pub reasoner: Option<Arc<dyn Reasoner>>,
    /// Tools offered to the planner per request
    pub max_tools: usize,
    pub planner: PlannerConfig,
    pub start_time: Instant,
    pub version: &'static str,
}

impl AppState {
    pub fn new(executor: Arc<AgentExecutor>, reasoner: Option<Arc<dyn Reasoner>>) -> Self {
        Self {
            executor,
            reasoner,
            max_tools: 6,
            planner: PlannerConfig::default(),
            start_time: Instant::now(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    pub fn with_max_tools(mut self, max_tools: usize) -> Self {
        self.max_tools = max_tools;
        self
    }

    pub fn with_planner(mut self, planner: PlannerConfig) -> Self {
        self.planner = planner;
        self
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// Build the router with all routes and middleware
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .merge(health_router(state.clone()))
        .nest("/api", agent_router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Serve until Ctrl+C or SIGTERM
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Agent server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Agent server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::InMemoryRunLogStore;
    use crate::tools::ToolCatalog;

    fn state() -> AppState {
        let executor = AgentExecutor::new(Arc::new(ToolCatalog::new(Vec::new())), Arc::new(InMemoryRunLogStore::new()));
        AppState::new(Arc::new(executor), None)
    }

    #[test]
    fn test_app_state_defaults() {
        let state = state();
        assert_eq!(state.max_tools, 6);
        assert!(state.uptime_secs() < 10);
        assert!(!state.version.is_empty());
        assert_eq!(state.with_max_tools(3).max_tools, 3);
    }
}
