use crate::workflow::{OwnerScope, WorkflowId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub type ExecutionId = Uuid;

/// Run status. `Completed` and `Failed` are terminal; a failed run is
/// never resumed, only restarted as a new record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRunStatus {
    Completed,
    Failed,
}

/// One ledger entry: the recorded outcome of a single node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeExecutionLog {
    pub node_id: String,
    pub status: NodeRunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Annotation on a failed run naming the node that failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFailure {
    pub node_id: String,
    pub message: String,
}

/// Record of one invocation of a workflow definition. Created fresh per
/// run and owned exclusively by that run; the `logs` ledger is
/// append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: ExecutionId,
    pub workflow_id: WorkflowId,
    pub owner: OwnerScope,
    pub status: RunStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub logs: Vec<NodeExecutionLog>,
    /// Output of the last node that actually ran; `None` when the run
    /// failed before any node produced output.
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RunFailure>,
}

impl ExecutionRecord {
    pub fn new(workflow_id: WorkflowId, owner: OwnerScope) -> Self {
        Self {
            id: Uuid::new_v4(),
            workflow_id,
            owner,
            status: RunStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            logs: Vec::new(),
            result: None,
            error: None,
        }
    }

    pub fn mark_running(&mut self) {
        self.status = RunStatus::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn push_log(&mut self, entry: NodeExecutionLog) {
        self.logs.push(entry);
    }

    pub fn complete(&mut self, result: Option<Value>) {
        self.status = RunStatus::Completed;
        self.result = result;
        self.finished_at = Some(Utc::now());
    }

    pub fn fail(&mut self, node_id: impl Into<String>, message: impl Into<String>) {
        self.status = RunStatus::Failed;
        self.error = Some(RunFailure {
            node_id: node_id.into(),
            message: message.into(),
        });
        self.finished_at = Some(Utc::now());
    }

    /// Logged output of a node, if that node completed.
    pub fn node_output(&self, node_id: &str) -> Option<&Value> {
        self.logs
            .iter()
            .find(|log| log.node_id == node_id)
            .and_then(|log| log.output.as_ref())
    }
}
