//! Engine facade: validated definition CRUD and run orchestration.

use crate::executor::{execute, ExecutorContext};
use crate::scheduler::execution_order;
use crate::validator::validate;
use loomcore::{
    EngineError, EventBus, ExecutionId, ExecutionRecord, ExecutionStore, OwnerScope,
    TextGenerator, ToolInvoker, WorkflowDefinition, WorkflowId, WorkflowStore,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Requesting principal, checked against the owning scope of whatever it
/// touches. Authentication itself happens upstream.
#[derive(Debug, Clone, Default)]
pub struct Principal {
    pub user_id: Option<Uuid>,
    pub organization_ids: Vec<Uuid>,
}

impl Principal {
    pub fn user(id: Uuid) -> Self {
        Self {
            user_id: Some(id),
            organization_ids: Vec::new(),
        }
    }

    pub fn organization(id: Uuid) -> Self {
        Self {
            user_id: None,
            organization_ids: vec![id],
        }
    }

    pub fn owns(&self, scope: &OwnerScope) -> bool {
        match scope {
            OwnerScope::User(id) => self.user_id == Some(*id),
            OwnerScope::Organization(id) => self.organization_ids.contains(id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_capacity: 1024,
        }
    }
}

/// Main entry point for callers. Holds its collaborators by explicit
/// injection; there is no ambient registry or global state.
pub struct WorkflowEngine {
    tools: Arc<dyn ToolInvoker>,
    textgen: Arc<dyn TextGenerator>,
    workflows: Arc<dyn WorkflowStore>,
    executions: Arc<dyn ExecutionStore>,
    events: Arc<EventBus>,
}

impl WorkflowEngine {
    pub fn new(
        tools: Arc<dyn ToolInvoker>,
        textgen: Arc<dyn TextGenerator>,
        workflows: Arc<dyn WorkflowStore>,
        executions: Arc<dyn ExecutionStore>,
    ) -> Self {
        Self::with_config(tools, textgen, workflows, executions, EngineConfig::default())
    }

    pub fn with_config(
        tools: Arc<dyn ToolInvoker>,
        textgen: Arc<dyn TextGenerator>,
        workflows: Arc<dyn WorkflowStore>,
        executions: Arc<dyn ExecutionStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            tools,
            textgen,
            workflows,
            executions,
            events: Arc::new(EventBus::new(config.event_capacity)),
        }
    }

    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<loomcore::ExecutionEvent> {
        self.events.subscribe()
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Validate and persist a new definition. Validation failure blocks
    /// persistence entirely; the complete error list is returned.
    pub async fn create_workflow(
        &self,
        definition: WorkflowDefinition,
    ) -> Result<WorkflowDefinition, EngineError> {
        let report = validate(&definition);
        if !report.is_valid() {
            return Err(EngineError::Validation {
                errors: report.errors,
            });
        }

        tracing::info!(workflow_id = %definition.id, name = %definition.name, "creating workflow");
        self.workflows.create(definition.clone()).await?;
        Ok(definition)
    }

    /// Full replace of an existing definition, revalidated first.
    pub async fn update_workflow(
        &self,
        definition: WorkflowDefinition,
        principal: &Principal,
    ) -> Result<WorkflowDefinition, EngineError> {
        let existing = self.workflows.get(definition.id).await?;
        self.check_owner(existing.owner.as_ref(), principal, "workflow")?;

        let report = validate(&definition);
        if !report.is_valid() {
            return Err(EngineError::Validation {
                errors: report.errors,
            });
        }

        self.workflows.update(definition.clone()).await?;
        Ok(definition)
    }

    pub async fn get_workflow(
        &self,
        id: WorkflowId,
        principal: &Principal,
    ) -> Result<WorkflowDefinition, EngineError> {
        let definition = self.workflows.get(id).await?;
        self.check_owner(definition.owner.as_ref(), principal, "workflow")?;
        Ok(definition)
    }

    pub async fn list_workflows(
        &self,
        category: Option<&str>,
        principal: &Principal,
    ) -> Result<Vec<WorkflowDefinition>, EngineError> {
        let definitions = self.workflows.list(category).await?;
        Ok(definitions
            .into_iter()
            .filter(|d| d.owner.as_ref().is_some_and(|o| principal.owns(o)))
            .collect())
    }

    pub async fn delete_workflow(
        &self,
        id: WorkflowId,
        principal: &Principal,
    ) -> Result<(), EngineError> {
        let definition = self.workflows.get(id).await?;
        self.check_owner(definition.owner.as_ref(), principal, "workflow")?;
        self.workflows.delete(id).await
    }

    /// Execute a persisted definition. Each run loads its own fresh copy
    /// of the node graph, so concurrent edits only affect later runs.
    pub async fn execute_workflow(
        &self,
        id: WorkflowId,
        principal: &Principal,
    ) -> Result<ExecutionRecord, EngineError> {
        self.execute_workflow_with(id, principal, CancellationToken::new())
            .await
    }

    pub async fn execute_workflow_with(
        &self,
        id: WorkflowId,
        principal: &Principal,
        cancellation: CancellationToken,
    ) -> Result<ExecutionRecord, EngineError> {
        let definition = self.workflows.get(id).await?;
        self.check_owner(definition.owner.as_ref(), principal, "workflow")?;

        let owner = definition
            .owner
            .ok_or_else(|| EngineError::Storage("persisted workflow has no owner".to_string()))?;

        // Fatal pre-execution check: no record is created for a graph
        // that cannot be ordered.
        let order = execution_order(&definition)?;

        let mut record = ExecutionRecord::new(definition.id, owner);
        self.executions.create(record.clone()).await?;

        record.mark_running();
        self.executions.update(record.clone()).await?;

        let ctx = ExecutorContext {
            tools: self.tools.as_ref(),
            textgen: self.textgen.as_ref(),
            events: self.events.as_ref(),
            cancellation: &cancellation,
            store: Some(self.executions.as_ref()),
        };
        execute(&definition, &order, &mut record, &ctx).await;

        Ok(record)
    }

    /// Execute a definition directly, without touching the stores. The
    /// definition is still validated and ordered first. Used by the CLI.
    pub async fn execute_definition(
        &self,
        definition: &WorkflowDefinition,
    ) -> Result<ExecutionRecord, EngineError> {
        let report = validate(definition);
        if !report.is_valid() {
            return Err(EngineError::Validation {
                errors: report.errors,
            });
        }

        let owner = definition
            .owner
            .ok_or_else(|| EngineError::Storage("definition has no owner".to_string()))?;
        let order = execution_order(definition)?;

        let mut record = ExecutionRecord::new(definition.id, owner);
        record.mark_running();

        let cancellation = CancellationToken::new();
        let ctx = ExecutorContext {
            tools: self.tools.as_ref(),
            textgen: self.textgen.as_ref(),
            events: self.events.as_ref(),
            cancellation: &cancellation,
            store: None,
        };
        execute(definition, &order, &mut record, &ctx).await;

        Ok(record)
    }

    pub async fn get_execution(
        &self,
        id: ExecutionId,
        principal: &Principal,
    ) -> Result<ExecutionRecord, EngineError> {
        let record = self.executions.get(id).await?;
        if !principal.owns(&record.owner) {
            return Err(EngineError::AccessDenied("execution"));
        }
        Ok(record)
    }

    pub async fn list_executions(
        &self,
        workflow_id: WorkflowId,
        principal: &Principal,
    ) -> Result<Vec<ExecutionRecord>, EngineError> {
        let definition = self.workflows.get(workflow_id).await?;
        self.check_owner(definition.owner.as_ref(), principal, "workflow")?;
        self.executions.list_for_workflow(workflow_id).await
    }

    pub async fn list_executions_for_owner(
        &self,
        owner: OwnerScope,
        principal: &Principal,
    ) -> Result<Vec<ExecutionRecord>, EngineError> {
        if !principal.owns(&owner) {
            return Err(EngineError::AccessDenied("scope"));
        }
        self.executions.list_for_owner(owner).await
    }

    fn check_owner(
        &self,
        owner: Option<&OwnerScope>,
        principal: &Principal,
        what: &'static str,
    ) -> Result<(), EngineError> {
        match owner {
            Some(scope) if principal.owns(scope) => Ok(()),
            _ => Err(EngineError::AccessDenied(what)),
        }
    }
}
