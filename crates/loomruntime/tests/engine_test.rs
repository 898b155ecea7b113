mod common;

use common::{action_save, definition, fetch, owner, StubTextGen, StubTools};
use loomcore::{EngineError, OwnerScope, RunStatus, WorkflowDefinition};
use loomruntime::{MemoryExecutionStore, MemoryWorkflowStore, Principal, WorkflowEngine};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

fn build_engine() -> WorkflowEngine {
    WorkflowEngine::new(
        Arc::new(StubTools::new().with_output("t", json!([1, 2]))),
        Arc::new(StubTextGen::new("{}")),
        Arc::new(MemoryWorkflowStore::new()),
        Arc::new(MemoryExecutionStore::new()),
    )
}

fn principal() -> Principal {
    Principal::user(Uuid::from_u128(7))
}

#[tokio::test]
async fn invalid_definitions_are_never_persisted() {
    let engine = build_engine();

    let invalid = definition(vec![fetch("a", "t").with_inputs(["ghost"])]);
    let id = invalid.id;

    let err = engine.create_workflow(invalid).await.unwrap_err();
    match err {
        EngineError::Validation { errors } => assert!(!errors.is_empty()),
        other => panic!("expected validation failure, got {other}"),
    }

    // Nothing was partially accepted.
    assert!(matches!(
        engine.get_workflow(id, &principal()).await,
        Err(EngineError::WorkflowNotFound(_))
    ));
}

#[tokio::test]
async fn update_revalidates_and_keeps_the_old_definition_on_failure() {
    let engine = build_engine();
    let created = engine
        .create_workflow(definition(vec![fetch("a", "t")]))
        .await
        .unwrap();

    let mut broken = created.clone();
    broken.nodes[0].inputs = vec!["missing".to_string()];

    assert!(matches!(
        engine.update_workflow(broken, &principal()).await,
        Err(EngineError::Validation { .. })
    ));

    let stored = engine.get_workflow(created.id, &principal()).await.unwrap();
    assert!(stored.nodes[0].inputs.is_empty());
}

#[tokio::test]
async fn foreign_principals_are_denied() {
    let engine = build_engine();
    let created = engine
        .create_workflow(definition(vec![fetch("a", "t")]))
        .await
        .unwrap();

    let stranger = Principal::user(Uuid::from_u128(99));
    assert!(matches!(
        engine.get_workflow(created.id, &stranger).await,
        Err(EngineError::AccessDenied(_))
    ));
    assert!(matches!(
        engine.execute_workflow(created.id, &stranger).await,
        Err(EngineError::AccessDenied(_))
    ));

    let org_member = Principal::organization(Uuid::from_u128(42));
    let mut org_def = definition(vec![fetch("a", "t")]);
    org_def.owner = Some(OwnerScope::Organization(Uuid::from_u128(42)));
    let org_created = engine.create_workflow(org_def).await.unwrap();
    assert!(engine.get_workflow(org_created.id, &org_member).await.is_ok());
}

#[tokio::test]
async fn executions_are_recorded_and_listable() {
    let engine = build_engine();
    let created = engine
        .create_workflow(definition(vec![
            fetch("a", "t"),
            action_save("save", &["a"]),
        ]))
        .await
        .unwrap();

    let first = engine.execute_workflow(created.id, &principal()).await.unwrap();
    let second = engine.execute_workflow(created.id, &principal()).await.unwrap();

    assert_ne!(first.id, second.id, "each run gets a fresh record");
    assert_eq!(first.status, RunStatus::Completed);
    assert_eq!(first.result, Some(json!([1, 2])));

    let listed = engine.list_executions(created.id, &principal()).await.unwrap();
    assert_eq!(listed.len(), 2);

    let by_owner = engine
        .list_executions_for_owner(owner(), &principal())
        .await
        .unwrap();
    assert_eq!(by_owner.len(), 2);
}

#[tokio::test]
async fn list_workflows_filters_by_category_and_owner() {
    let engine = build_engine();

    let mut tagged = definition(vec![fetch("a", "t")]);
    tagged.category = Some("reports".to_string());
    engine.create_workflow(tagged).await.unwrap();

    engine
        .create_workflow(definition(vec![fetch("a", "t")]))
        .await
        .unwrap();

    let mut foreign = definition(vec![fetch("a", "t")]);
    foreign.owner = Some(OwnerScope::User(Uuid::from_u128(99)));
    foreign.category = Some("reports".to_string());
    engine.create_workflow(foreign).await.unwrap();

    let all = engine.list_workflows(None, &principal()).await.unwrap();
    assert_eq!(all.len(), 2);

    let reports = engine
        .list_workflows(Some("reports"), &principal())
        .await
        .unwrap();
    assert_eq!(reports.len(), 1);
}

#[tokio::test]
async fn missing_ids_surface_not_found() {
    let engine = build_engine();

    assert!(matches!(
        engine.get_workflow(Uuid::new_v4(), &principal()).await,
        Err(EngineError::WorkflowNotFound(_))
    ));
    assert!(matches!(
        engine.get_execution(Uuid::new_v4(), &principal()).await,
        Err(EngineError::ExecutionNotFound(_))
    ));
}

#[tokio::test]
async fn deleted_workflows_stop_executing() {
    let engine = build_engine();
    let created = engine
        .create_workflow(definition(vec![fetch("a", "t")]))
        .await
        .unwrap();

    engine.delete_workflow(created.id, &principal()).await.unwrap();

    assert!(matches!(
        engine.execute_workflow(created.id, &principal()).await,
        Err(EngineError::WorkflowNotFound(_))
    ));
}

#[tokio::test]
async fn dedupe_merge_property_via_full_run() {
    use loomcore::{MergeConfig, MergeStrategy, NodeKind, NodeSpec};

    let engine = WorkflowEngine::new(
        Arc::new(
            StubTools::new()
                .with_output("left", json!([{"id": 1}, {"id": 2}]))
                .with_output("right", json!([{"id": 2}, {"id": 3}])),
        ),
        Arc::new(StubTextGen::new("{}")),
        Arc::new(MemoryWorkflowStore::new()),
        Arc::new(MemoryExecutionStore::new()),
    );

    let mut def = definition(vec![fetch("l", "left"), fetch("r", "right")]);
    def.add_node(
        NodeSpec::new(
            "dedupe",
            NodeKind::Merge(MergeConfig {
                strategy: MergeStrategy::Deduplicate,
                key: Some("id".to_string()),
            }),
        )
        .with_inputs(["l", "r"]),
    );

    let record = engine.execute_definition(&def).await.unwrap();
    assert_eq!(
        record.result,
        Some(json!([{"id": 1}, {"id": 2}, {"id": 3}]))
    );
}

#[tokio::test]
async fn drafts_without_owner_fail_validation_at_create() {
    let engine = build_engine();
    let mut draft = WorkflowDefinition::new("draft");
    draft.add_node(fetch("a", "t"));

    let err = engine.create_workflow(draft).await.unwrap_err();
    match err {
        EngineError::Validation { errors } => {
            assert!(errors.contains(&loomcore::ValidationError::MissingOwner));
        }
        other => panic!("expected validation failure, got {other}"),
    }
}
