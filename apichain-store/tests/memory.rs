use apichain_core::{ApiRequest, RestRequest, Step, Workflow};
use apichain_store::{
    EventStore, HistoryEntry, HistorySink, InMemoryStore, NewEvent, NewWorkflow, WorkflowStore,
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

fn workflow() -> Workflow {
    Workflow {
        id: None,
        name: "ping".to_string(),
        description: None,
        steps: vec![Step {
            order: 1,
            name: "ping".to_string(),
            description: None,
            api_request: ApiRequest::Rest(RestRequest {
                method: "GET".to_string(),
                endpoint: "https://api.test/ping".to_string(),
                ..Default::default()
            }),
            variable_mappings: vec![],
            assertions: vec![],
            continue_on_failure: false,
            auth_config_id: None,
        }],
    }
}

#[tokio::test]
async fn saved_workflow_can_be_loaded_by_id() {
    let store = InMemoryStore::new();
    let saved = store
        .save_workflow(NewWorkflow {
            owner: Some("user-1".to_string()),
            workflow: workflow(),
        })
        .await
        .unwrap();

    let loaded = store.load_workflow_by_id(saved.id).await.unwrap().unwrap();
    assert_eq!(loaded.workflow.id, Some(saved.id.to_string()));
    assert_eq!(loaded.workflow.steps.len(), 1);
    assert_eq!(loaded.owner.as_deref(), Some("user-1"));
}

#[tokio::test]
async fn unknown_id_is_none() {
    let store = InMemoryStore::new();
    assert!(store
        .load_workflow_by_id(Uuid::new_v4())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn history_is_filtered_by_run() {
    let store = InMemoryStore::new();
    let run_a = Uuid::new_v4();
    let run_b = Uuid::new_v4();
    for (run_id, order) in [(run_a, 1), (run_a, 2), (run_b, 1)] {
        store
            .record_history_entry(HistoryEntry {
                run_id,
                workflow_id: None,
                step_order: order,
                step_name: format!("s{order}"),
                request: json!({}),
                response: json!({}),
                duration_ms: 3,
                success: true,
                recorded_at: Utc::now(),
            })
            .await
            .unwrap();
    }
    assert_eq!(store.history_for_run(run_a).await.len(), 2);
    assert_eq!(store.history_len().await, 3);
}

#[tokio::test]
async fn events_are_paged_by_id() {
    let store = InMemoryStore::new();
    let run_id = Uuid::new_v4();
    for t in ["run.started", "step.started", "step.succeeded", "run.finished"] {
        store
            .append_event(NewEvent {
                run_id,
                r#type: t.to_string(),
                payload: json!({}),
            })
            .await
            .unwrap();
    }
    let page = store.get_events_after(run_id, 1, 2).await.unwrap();
    let types: Vec<&str> = page.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(types, vec!["step.started", "step.succeeded"]);
}
