//! Agent Executor
//!
//! Drives a validated plan one step at a time:
//! - Per-step timeout (the tool keeps running; we only stop waiting)
//! - Structured run logging into an injected `RunLogStore`
//! - Observe → decide between steps (CONTINUE / MODIFY / COMPLETE / ERROR)
//! - Final synthesis of all step results into one reply
//!
//! Steps run strictly in order. Failures are recorded in the step results
//! and never abort the run; `execute_plan` always returns a `Run`.

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::events::{ProgressEvent, StepCallback};
use super::json_extract::extract_json;
use super::planner::{preview, Plan};
use super::prompts::{
    final_answer_prompt, format_prompt, observer_prompt, FINAL_ANSWER_USER_MESSAGE, OBSERVER_USER_MESSAGE,
};
use super::run_log::{LogEntry, LogKind, RunLogStore};
use crate::llm::Reasoner;
use crate::tools::{Params, Tool, ToolCatalog, ToolContext, ToolResult};

/// Executor configuration
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// How long to wait for one tool call
    pub step_timeout: Duration,
    /// Upper bound on loop iterations per run
    pub max_iterations: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            step_timeout: Duration::from_millis(30_000),
            max_iterations: 5,
        }
    }
}

/// Inputs to `execute_plan`
#[derive(Clone, Default)]
pub struct ExecuteOptions {
    pub reasoner: Option<Arc<dyn Reasoner>>,
    pub context: ToolContext,
    pub on_step: Option<StepCallback>,
}

/// Outcome of one executed step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResult {
    pub action: String,
    pub result: ToolResult,
}

/// One execution of a plan
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub run_id: String,
    /// The executor ran to completion; says nothing about individual steps
    pub success: bool,
    /// Simple fast path: the caller generates the reply
    pub is_simple: bool,
    pub step_results: Vec<StepResult>,
    pub response: Option<String>,
    pub logs: Vec<LogEntry>,
}

/// Observer verdict after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionKind {
    Continue,
    /// Acknowledged and logged; remaining steps are not rewritten
    Modify,
    Complete,
    Error,
}

/// Parsed observer response
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub decision: String,
    /// Whatever the observer put there; usually a string
    pub reasoning: Option<Value>,
    pub modifications: Option<Value>,
}

impl Decision {
    fn default_continue() -> Self {
        Self {
            decision: "CONTINUE".to_string(),
            reasoning: Some(json!("Default continue")),
            modifications: None,
        }
    }

    /// Read a verdict off any JSON object. Only a string `decision` counts;
    /// the other fields are kept as-is whatever their type.
    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| value.get(key).filter(|v| !v.is_null()).cloned();
        Self {
            decision: value
                .get("decision")
                .and_then(Value::as_str)
                .unwrap_or("CONTINUE")
                .to_string(),
            reasoning: field("reasoning"),
            modifications: field("modifications"),
        }
    }

    /// Unrecognized verdicts behave like CONTINUE
    pub fn kind(&self) -> DecisionKind {
        match self.decision.trim().to_uppercase().as_str() {
            "COMPLETE" => DecisionKind::Complete,
            "ERROR" => DecisionKind::Error,
            "MODIFY" => DecisionKind::Modify,
            _ => DecisionKind::Continue,
        }
    }
}

/// Runs plans against a tool catalog
pub struct AgentExecutor {
    catalog: Arc<ToolCatalog>,
    logs: Arc<dyn RunLogStore>,
    config: ExecutorConfig,
}

impl AgentExecutor {
    pub fn new(catalog: Arc<ToolCatalog>, logs: Arc<dyn RunLogStore>) -> Self {
        Self::with_config(catalog, logs, ExecutorConfig::default())
    }

    pub fn with_config(catalog: Arc<ToolCatalog>, logs: Arc<dyn RunLogStore>, config: ExecutorConfig) -> Self {
        Self { catalog, logs, config }
    }

    pub fn catalog(&self) -> &Arc<ToolCatalog> {
        &self.catalog
    }

    pub fn log_store(&self) -> &Arc<dyn RunLogStore> {
        &self.logs
    }

    /// Logs for a run; empty if unknown or evicted
    pub fn run_logs(&self, run_id: &str) -> Vec<LogEntry> {
        self.logs.get(run_id)
    }

    fn record(&self, run_id: &str, kind: LogKind, data: Value) {
        debug!("[{}] {}: {}", run_id, kind, preview(&data.to_string(), 200));
        self.logs.append(LogEntry::now(run_id, kind, data));
    }

    /// Execute a plan to completion. Never fails.
    pub async fn execute_plan(&self, plan: &Plan, options: ExecuteOptions) -> Run {
        let run_id = format!("run_{}", uuid::Uuid::new_v4().simple());
        let emit = |event: ProgressEvent| {
            if let Some(on_step) = &options.on_step {
                on_step(event);
            }
        };

        info!("[{}] Executing plan: {} step(s)", run_id, plan.steps.len());
        self.record(
            &run_id,
            LogKind::Plan,
            json!({
                "goal": plan.goal,
                "steps": plan.steps.iter().map(|s| s.action.as_str()).collect::<Vec<_>>(),
            }),
        );
        emit(ProgressEvent::Planning {
            steps: plan.steps.clone(),
            complexity: plan.complexity,
        });

        if plan.is_simple || plan.is_direct_response() {
            self.record(&run_id, LogKind::Final, json!({ "simple": true }));
            return Run {
                logs: self.logs.get(&run_id),
                run_id,
                success: true,
                is_simple: true,
                step_results: Vec::new(),
                response: None,
            };
        }

        let total = plan.steps.len();
        let mut step_results: Vec<StepResult> = Vec::with_capacity(total);
        let mut iteration = 0;
        let mut step_index = 0;

        while step_index < total && iteration < self.config.max_iterations {
            iteration += 1;
            let step = &plan.steps[step_index];

            self.record(
                &run_id,
                LogKind::ToolCall,
                json!({
                    "stepIndex": step_index,
                    "action": step.action,
                    "description": step.description,
                    "params": step.params,
                }),
            );
            emit(ProgressEvent::Step {
                index: step_index + 1,
                total,
                description: step.description.clone(),
            });

            let result = match self.catalog.get(&step.action) {
                None => {
                    let message = format!("Unknown tool: {}", step.action);
                    warn!("[{}] {}", run_id, message);
                    self.record(&run_id, LogKind::Error, json!({ "step": step_index, "error": message }));
                    ToolResult::error(message).with("skipped", true)
                }
                Some(tool) => {
                    emit(ProgressEvent::ToolCall {
                        tool: step.action.clone(),
                        params: step.params.clone(),
                    });

                    match self.run_tool(tool, step.params.clone(), options.context.clone()).await {
                        Ok(result) => {
                            self.record(
                                &run_id,
                                LogKind::ToolResult,
                                json!({
                                    "step": step_index,
                                    "tool": step.action,
                                    "success": true,
                                    "result": result,
                                }),
                            );
                            emit(ProgressEvent::ToolResult {
                                tool: step.action.clone(),
                                result: result.clone(),
                                success: true,
                            });
                            result
                        }
                        Err(message) => {
                            self.record(
                                &run_id,
                                LogKind::Error,
                                json!({ "step": step_index, "tool": step.action, "error": message }),
                            );
                            let result = ToolResult::error(message);
                            emit(ProgressEvent::ToolResult {
                                tool: step.action.clone(),
                                result: result.clone(),
                                success: false,
                            });
                            result
                        }
                    }
                }
            };

            step_results.push(StepResult {
                action: step.action.clone(),
                result: result.clone(),
            });

            if let Some(reasoner) = options.reasoner.as_ref().filter(|_| step_index + 1 < total) {
                let decision = self.observe_and_decide(plan, step_index, &result, reasoner.as_ref()).await;

                let mut data = json!({ "decision": decision.decision, "reasoning": decision.reasoning });
                if let Some(modifications) = &decision.modifications {
                    data["modifications"] = modifications.clone();
                }
                self.record(&run_id, LogKind::Decision, data);

                match decision.kind() {
                    DecisionKind::Complete => {
                        info!("[{}] Goal satisfied after step {}", run_id, step_index + 1);
                        break;
                    }
                    DecisionKind::Error => {
                        self.record(
                            &run_id,
                            LogKind::Error,
                            json!({ "aborted": true, "reason": decision.reasoning }),
                        );
                        break;
                    }
                    DecisionKind::Continue | DecisionKind::Modify => {}
                }
            }

            step_index += 1;
        }

        let response = match options.reasoner.as_ref() {
            Some(reasoner) if !step_results.is_empty() => {
                Some(self.synthesize(plan, &step_results, reasoner.as_ref()).await)
            }
            _ => None,
        };

        self.record(&run_id, LogKind::Final, json!({ "stepsCompleted": step_results.len() }));
        emit(ProgressEvent::Final {
            content: response.clone(),
        });

        info!("[{}] Run finished: {} step(s) executed", run_id, step_results.len());
        Run {
            logs: self.logs.get(&run_id),
            run_id,
            success: true,
            is_simple: false,
            step_results,
            response,
        }
    }

    /// Invoke one tool directly, outside the plan loop, with the same timeout
    /// and error wrapping.
    pub async fn execute_single_tool(&self, name: &str, params: Params, context: &ToolContext) -> ToolResult {
        let Some(tool) = self.catalog.get(name) else {
            return ToolResult::error(format!("Unknown tool: {}", name));
        };

        self.run_tool(tool, params, context.clone())
            .await
            .unwrap_or_else(ToolResult::error)
    }

    /// Execute a tool under the step timeout.
    ///
    /// The call runs as its own task. On timeout the handle is dropped, which
    /// detaches the task rather than cancelling it.
    async fn run_tool(&self, tool: Arc<dyn Tool>, params: Params, context: ToolContext) -> Result<ToolResult, String> {
        let name = tool.name();
        let timeout = self.config.step_timeout;
        let handle = tokio::spawn(async move { tool.execute(&params, &context).await });

        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(Ok(result))) => Ok(result),
            Ok(Ok(Err(e))) => Err(e.to_string()),
            Ok(Err(join_error)) => Err(format!("Tool {} failed: {}", name, join_error)),
            Err(_) => {
                warn!("Tool {} timed out after {}ms", name, timeout.as_millis());
                Err(format!("Tool {} timed out after {}ms", name, timeout.as_millis()))
            }
        }
    }

    async fn observe_and_decide(
        &self,
        plan: &Plan,
        step_index: usize,
        result: &ToolResult,
        reasoner: &dyn Reasoner,
    ) -> Decision {
        let prompt = format_prompt(
            &observer_prompt(),
            &[
                ("GOAL", json!(plan.goal)),
                ("CURRENT_STEP", json!(step_index + 1)),
                ("TOTAL_STEPS", json!(plan.steps.len())),
                ("TOOL_NAME", json!(plan.steps[step_index].action)),
                ("TOOL_RESULT", json!(result.to_value().to_string())),
                ("REMAINING_STEPS", json!(json!(plan.steps[step_index + 1..]).to_string())),
            ],
        );

        let response = match reasoner.complete(&prompt, OBSERVER_USER_MESSAGE).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Observer call failed, continuing: {}", e);
                return Decision::default_continue();
            }
        };

        extract_json(&response)
            .map(|value| Decision::from_value(&value))
            .unwrap_or_else(|_| Decision::default_continue())
    }

    async fn synthesize(&self, plan: &Plan, step_results: &[StepResult], reasoner: &dyn Reasoner) -> String {
        let transcript = step_results
            .iter()
            .enumerate()
            .map(|(i, r)| format!("Step {} ({}): {}", i + 1, r.action, r.result.to_value()))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format_prompt(
            &final_answer_prompt(),
            &[("GOAL", json!(plan.goal)), ("STEP_RESULTS", json!(transcript))],
        );

        match reasoner.complete(&prompt, FINAL_ANSWER_USER_MESSAGE).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Final synthesis failed: {}", e);
                format!(
                    "I completed your request, but had trouble summarizing the results. Error: {}",
                    e
                )
            }
        }
    }
}
