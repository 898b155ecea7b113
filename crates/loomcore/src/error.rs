use thiserror::Error;

/// A single structural violation found while validating a workflow
/// definition. The validator accumulates every violation it finds so a
/// caller can present the complete list at once.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("workflow name is required")]
    MissingName,

    #[error("workflow owner scope is required")]
    MissingOwner,

    #[error("workflow must have at least one node")]
    NoNodes,

    #[error("duplicate node id '{0}'")]
    DuplicateNodeId(String),

    #[error("node '{node_id}' references unknown input '{input}'")]
    UnknownInput { node_id: String, input: String },

    #[error("node '{node_id}' has incomplete configuration: {detail}")]
    EmptyConfig { node_id: String, detail: String },

    #[error("dependency cycle: {}", chain.join(" -> "))]
    Cycle { chain: Vec<String> },
}

/// Failure raised by a single node handler. Recorded in the failing
/// node's ledger entry and escalated to fail the whole run, attributed to
/// the originating node id.
#[derive(Error, Debug, Clone)]
pub enum NodeError {
    #[error("tool call failed: {0}")]
    ToolCall(String),

    #[error("text generation failed: {0}")]
    Completion(String),

    #[error("no recorded output for declared input '{0}'")]
    MissingUpstreamOutput(String),

    #[error("expected {expected} input(s), got {actual}")]
    InputArity { expected: usize, actual: usize },

    #[error("invalid input type: expected {expected}, got {actual}")]
    InvalidInputType { expected: String, actual: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("action '{0}' is not supported")]
    UnsupportedAction(String),

    #[error("cancelled")]
    Cancelled,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("workflow definition is invalid ({} error(s))", errors.len())]
    Validation { errors: Vec<ValidationError> },

    /// Defensive re-check in the scheduler. The validator rejects cyclic
    /// definitions before persistence, so reaching this means a definition
    /// bypassed validation.
    #[error("workflow graph contains a cycle; refusing to execute")]
    CycleDetected,

    #[error("workflow not found: {0}")]
    WorkflowNotFound(uuid::Uuid),

    #[error("execution not found: {0}")]
    ExecutionNotFound(uuid::Uuid),

    #[error("access denied: principal does not own this {0}")]
    AccessDenied(&'static str),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
