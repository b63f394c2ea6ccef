use apichain_core::Workflow;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewWorkflow {
    pub owner: Option<String>,
    pub workflow: Workflow,
}

#[derive(Debug, Clone)]
pub struct StoredWorkflow {
    pub id: Uuid,
    pub owner: Option<String>,
    /// `workflow.id` is set to the stored id.
    pub workflow: Workflow,
    pub created_at: DateTime<Utc>,
}

/// One executed step, as handed to the history collaborator.
#[derive(Debug, Clone, PartialEq, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub run_id: Uuid,
    pub workflow_id: Option<String>,
    pub step_order: i64,
    pub step_name: String,
    pub request: JsonValue,
    pub response: JsonValue,
    pub duration_ms: i64,
    pub success: bool,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub run_id: Uuid,
    pub r#type: String,
    pub payload: JsonValue,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RunEvent {
    pub id: i64,
    pub run_id: Uuid,
    pub ts: DateTime<Utc>,
    pub event_type: String,
    pub payload: JsonValue,
}
