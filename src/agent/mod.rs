//! Agent Orchestration
//!
//! Goal → plan → observe/decide/act loop → final answer:
//! - Planning with a zero-LLM fast path and safe fallbacks (`planner`)
//! - Sequential step execution with timeouts and run logs (`executor`)
//! - Resilient JSON extraction from free-form model output (`json_extract`)
//! - Prompt templates with a fixed safety block (`prompts`)
//! - Stable progress events for streaming UIs (`events`)
//!
//! ```text
//!  goal ──► plan_goal ──► Plan ──► AgentExecutor::execute_plan ──► Run
//!                                      │            │
//!                                      ▼            ▼
//!                                ProgressEvent   RunLogStore
//! ```

pub mod events;
pub mod executor;
pub mod json_extract;
pub mod planner;
pub mod prompts;
pub mod run_log;

pub use events::{ProgressEvent, StepCallback};
pub use executor::{AgentExecutor, Decision, DecisionKind, ExecuteOptions, ExecutorConfig, Run, StepResult};
pub use json_extract::{extract_json, ExtractError};
pub use planner::{
    detect_relevant_tools, plan_goal, validate_plan, Complexity, Plan, PlanError, PlanOptions, PlannerConfig, Step,
    RESPOND_ACTION,
};
pub use run_log::{InMemoryRunLogStore, LogEntry, LogKind, RunLogStore};
