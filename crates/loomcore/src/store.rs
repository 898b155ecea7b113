//! Persistence collaborator boundary.
//!
//! The engine shapes what must be persisted but never manages storage
//! directly. In-memory implementations live in `loomruntime`; a durable
//! backend implements the same traits.

use crate::error::EngineError;
use crate::execution::{ExecutionId, ExecutionRecord};
use crate::workflow::{OwnerScope, WorkflowDefinition, WorkflowId};
use async_trait::async_trait;

#[async_trait]
pub trait WorkflowStore: Send + Sync {
    async fn create(&self, definition: WorkflowDefinition) -> Result<(), EngineError>;

    async fn get(&self, id: WorkflowId) -> Result<WorkflowDefinition, EngineError>;

    async fn list(&self, category: Option<&str>) -> Result<Vec<WorkflowDefinition>, EngineError>;

    /// Full replace; the caller revalidates before invoking this.
    async fn update(&self, definition: WorkflowDefinition) -> Result<(), EngineError>;

    async fn delete(&self, id: WorkflowId) -> Result<(), EngineError>;
}

#[async_trait]
pub trait ExecutionStore: Send + Sync {
    async fn create(&self, record: ExecutionRecord) -> Result<(), EngineError>;

    async fn get(&self, id: ExecutionId) -> Result<ExecutionRecord, EngineError>;

    /// Flush the current state of a record. Called after every ledger
    /// append and, mandatorily, at terminal status.
    async fn update(&self, record: ExecutionRecord) -> Result<(), EngineError>;

    async fn list_for_workflow(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<Vec<ExecutionRecord>, EngineError>;

    async fn list_for_owner(&self, owner: OwnerScope) -> Result<Vec<ExecutionRecord>, EngineError>;
}
