//! Core abstractions for the loom workflow engine.
//!
//! This crate provides the data model, error types, capability traits and
//! storage boundary that all other components depend on. It performs no
//! execution itself.

pub mod capability;
pub mod condition;
mod error;
mod events;
mod execution;
mod store;
mod workflow;

pub use capability::{
    ChatMessage, Completion, CompletionError, CompletionOptions, TextGenerator, TokenUsage,
    ToolCallError, ToolInvoker,
};
pub use condition::{lookup_path, ConditionExpr};
pub use error::{EngineError, NodeError, ValidationError};
pub use events::{EventBus, ExecutionEvent};
pub use execution::{
    ExecutionId, ExecutionRecord, NodeExecutionLog, NodeRunStatus, RunFailure, RunStatus,
};
pub use store::{ExecutionStore, WorkflowStore};
pub use workflow::{
    ActionConfig, ActionKind, ConditionalConfig, FetchConfig, FilterConfig, FilterCondition,
    FilterOperator, MergeConfig, MergeStrategy, NodeKind, NodeSpec, OwnerScope, TransformConfig,
    WorkflowDefinition, WorkflowId,
};

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
