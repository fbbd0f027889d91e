//! LocalMind Agent
//!
//! Goal-driven tool-using agent for a local-first assistant.
//!
//! # Features
//!
//! - **Tool Catalog**: closed registry with a safety tier per tool
//! - **Tool Selector**: deterministic keyword relevance scoring
//! - **Planner**: zero-LLM fast path for trivial turns, resilient JSON parsing
//! - **Executor**: timed steps, observer decisions, final synthesis
//! - **Run Logs**: structured per-run logs with age-based eviction
//! - **Streaming**: progress events over Server-Sent Events
//!
//! # Architecture
//!
//! ```text
//! POST /api/agent ──► select_tools ──► plan_goal ──► execute_plan ──► SSE
//!                         │                │              │
//!                         │                └── Reasoner ──┤ (Ollama / Claude)
//!                         │                               │
//!                         └──────── ToolCatalog ◄─────────┤
//!                                      │                  └── RunLogStore
//!                                      └── Backends (search, Google, notes, knowledge)
//! ```

pub mod agent;
pub mod backends;
pub mod config;
pub mod llm;
pub mod server;
pub mod tools;

pub use agent::{
    plan_goal, AgentExecutor, ExecuteOptions, InMemoryRunLogStore, Plan, PlanOptions, ProgressEvent, Run,
    RunLogStore,
};
pub use config::Config;
pub use llm::Reasoner;
pub use tools::{Tool, ToolCatalog, ToolContext, ToolResult};
