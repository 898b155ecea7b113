//! Sequential node execution.
//!
//! Nodes run strictly one at a time in scheduler order; independent
//! subtrees are never fanned out. The first node failure aborts the run,
//! keeping the outputs already logged and recording the failing node's
//! error on the record.

use crate::resolver::{resolve_parameters, InputContext};
use chrono::Utc;
use loomcore::{
    EventBus, ExecutionEvent, ExecutionRecord, ExecutionStore, NodeError, NodeExecutionLog,
    NodeKind, NodeRunStatus, NodeSpec, TextGenerator, ToolInvoker, WorkflowDefinition,
};
use loomnodes::{run_action, run_conditional, run_fetch, run_filter, run_merge, run_transform};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Collaborators a run executes against.
pub struct ExecutorContext<'a> {
    pub tools: &'a dyn ToolInvoker,
    pub textgen: &'a dyn TextGenerator,
    pub events: &'a EventBus,
    pub cancellation: &'a CancellationToken,
    /// When present, the record is flushed after every ledger append so
    /// an observer can poll it mid-run.
    pub store: Option<&'a dyn ExecutionStore>,
}

/// Walk the scheduled order, mutating `record` through to a terminal
/// status. `record` must already be marked running.
pub async fn execute(
    definition: &WorkflowDefinition,
    order: &[String],
    record: &mut ExecutionRecord,
    ctx: &ExecutorContext<'_>,
) {
    let run_started = Instant::now();
    ctx.events.emit(ExecutionEvent::RunStarted {
        execution_id: record.id,
        workflow_id: record.workflow_id,
        timestamp: Utc::now(),
    });

    let mut outputs: HashMap<&str, Value> = HashMap::with_capacity(order.len());
    let mut last_output: Option<Value> = None;

    for node_id in order {
        // Cancellation is honored only at node boundaries; outbound
        // capability calls are not assumed cancelable mid-flight.
        if ctx.cancellation.is_cancelled() {
            record.fail(node_id.clone(), NodeError::Cancelled.to_string());
            break;
        }

        let Some(node) = definition.find_node(node_id) else {
            // Unreachable with a correct scheduler; fail rather than skip.
            record.fail(node_id.clone(), "scheduled node missing from definition");
            break;
        };

        ctx.events.emit(ExecutionEvent::NodeStarted {
            execution_id: record.id,
            node_id: node.id.clone(),
            node_kind: node.kind_name().to_string(),
            timestamp: Utc::now(),
        });

        let node_started = Instant::now();
        let started_at = Utc::now();
        let result = run_node(node, &outputs, ctx).await;
        let duration_ms = node_started.elapsed().as_millis() as u64;

        match result {
            Ok(output) => {
                tracing::info!(node_id = %node.id, kind = node.kind_name(), duration_ms, "node completed");
                record.push_log(NodeExecutionLog {
                    node_id: node.id.clone(),
                    status: NodeRunStatus::Completed,
                    started_at,
                    finished_at: Utc::now(),
                    output: Some(output.clone()),
                    error: None,
                });
                ctx.events.emit(ExecutionEvent::NodeCompleted {
                    execution_id: record.id,
                    node_id: node.id.clone(),
                    duration_ms,
                    timestamp: Utc::now(),
                });
                outputs.insert(node.id.as_str(), output.clone());
                last_output = Some(output);
                flush(record, ctx).await;
            }
            Err(error) => {
                let message = error.to_string();
                tracing::warn!(node_id = %node.id, %message, "node failed");
                record.push_log(NodeExecutionLog {
                    node_id: node.id.clone(),
                    status: NodeRunStatus::Failed,
                    started_at,
                    finished_at: Utc::now(),
                    output: None,
                    error: Some(message.clone()),
                });
                ctx.events.emit(ExecutionEvent::NodeFailed {
                    execution_id: record.id,
                    node_id: node.id.clone(),
                    error: message.clone(),
                    timestamp: Utc::now(),
                });
                record.fail(node.id.clone(), message);
                break;
            }
        }
    }

    if !record.status.is_terminal() {
        record.complete(last_output);
    }

    flush(record, ctx).await;
    ctx.events.emit(ExecutionEvent::RunCompleted {
        execution_id: record.id,
        success: record.error.is_none(),
        duration_ms: run_started.elapsed().as_millis() as u64,
        timestamp: Utc::now(),
    });
}

/// Resolve a node's inputs and dispatch to its handler. Inputs are the
/// recorded outputs of the nodes named by `inputs`, in declaration order.
async fn run_node(
    node: &NodeSpec,
    outputs: &HashMap<&str, Value>,
    ctx: &ExecutorContext<'_>,
) -> Result<Value, NodeError> {
    let mut inputs = Vec::with_capacity(node.inputs.len());
    for input_id in &node.inputs {
        let output = outputs
            .get(input_id.as_str())
            .ok_or_else(|| NodeError::MissingUpstreamOutput(input_id.clone()))?;
        inputs.push(output.clone());
    }

    match &node.kind {
        NodeKind::Fetch(cfg) => {
            let input_ctx = InputContext::new(&inputs);
            let parameters = resolve_parameters(&cfg.parameters, &input_ctx);
            run_fetch(cfg, parameters, ctx.tools).await
        }
        NodeKind::Transform(cfg) => run_transform(cfg, &inputs, ctx.textgen).await,
        NodeKind::Filter(cfg) => run_filter(cfg, &inputs),
        NodeKind::Merge(cfg) => run_merge(cfg, &inputs),
        NodeKind::Action(cfg) => run_action(cfg, &inputs),
        NodeKind::Conditional(cfg) => run_conditional(cfg, &inputs),
    }
}

async fn flush(record: &ExecutionRecord, ctx: &ExecutorContext<'_>) {
    if let Some(store) = ctx.store {
        if let Err(error) = store.update(record.clone()).await {
            tracing::warn!(execution_id = %record.id, %error, "failed to flush execution record");
        }
    }
}
