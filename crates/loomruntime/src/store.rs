//! In-memory store implementations.
//!
//! Suitable for tests, the CLI and single-process deployments; a durable
//! backend implements the same traits from `loomcore`.

use async_trait::async_trait;
use loomcore::{
    EngineError, ExecutionId, ExecutionRecord, ExecutionStore, OwnerScope, WorkflowDefinition,
    WorkflowId, WorkflowStore,
};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryWorkflowStore {
    inner: RwLock<HashMap<WorkflowId, WorkflowDefinition>>,
}

impl MemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowStore for MemoryWorkflowStore {
    async fn create(&self, definition: WorkflowDefinition) -> Result<(), EngineError> {
        let mut inner = self.inner.write().await;
        if inner.contains_key(&definition.id) {
            return Err(EngineError::Storage(format!(
                "workflow {} already exists",
                definition.id
            )));
        }
        inner.insert(definition.id, definition);
        Ok(())
    }

    async fn get(&self, id: WorkflowId) -> Result<WorkflowDefinition, EngineError> {
        self.inner
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(EngineError::WorkflowNotFound(id))
    }

    async fn list(&self, category: Option<&str>) -> Result<Vec<WorkflowDefinition>, EngineError> {
        let inner = self.inner.read().await;
        let mut definitions: Vec<_> = inner
            .values()
            .filter(|d| category.map_or(true, |c| d.category.as_deref() == Some(c)))
            .cloned()
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(definitions)
    }

    async fn update(&self, definition: WorkflowDefinition) -> Result<(), EngineError> {
        let mut inner = self.inner.write().await;
        if !inner.contains_key(&definition.id) {
            return Err(EngineError::WorkflowNotFound(definition.id));
        }
        inner.insert(definition.id, definition);
        Ok(())
    }

    async fn delete(&self, id: WorkflowId) -> Result<(), EngineError> {
        self.inner
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(EngineError::WorkflowNotFound(id))
    }
}

#[derive(Default)]
pub struct MemoryExecutionStore {
    inner: RwLock<HashMap<ExecutionId, ExecutionRecord>>,
}

impl MemoryExecutionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExecutionStore for MemoryExecutionStore {
    async fn create(&self, record: ExecutionRecord) -> Result<(), EngineError> {
        let mut inner = self.inner.write().await;
        if inner.contains_key(&record.id) {
            return Err(EngineError::Storage(format!(
                "execution {} already exists",
                record.id
            )));
        }
        inner.insert(record.id, record);
        Ok(())
    }

    async fn get(&self, id: ExecutionId) -> Result<ExecutionRecord, EngineError> {
        self.inner
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(EngineError::ExecutionNotFound(id))
    }

    async fn update(&self, record: ExecutionRecord) -> Result<(), EngineError> {
        let mut inner = self.inner.write().await;
        if !inner.contains_key(&record.id) {
            return Err(EngineError::ExecutionNotFound(record.id));
        }
        inner.insert(record.id, record);
        Ok(())
    }

    async fn list_for_workflow(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<Vec<ExecutionRecord>, EngineError> {
        let inner = self.inner.read().await;
        let mut records: Vec<_> = inner
            .values()
            .filter(|r| r.workflow_id == workflow_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }

    async fn list_for_owner(&self, owner: OwnerScope) -> Result<Vec<ExecutionRecord>, EngineError> {
        let inner = self.inner.read().await;
        let mut records: Vec<_> = inner
            .values()
            .filter(|r| r.owner == owner)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }
}
