use async_trait::async_trait;
use uuid::Uuid;

use crate::store::types::*;

#[async_trait]
pub trait WorkflowStore: Send + Sync {
    async fn save_workflow(&self, workflow: NewWorkflow) -> Result<StoredWorkflow, StoreError>;

    /// `Ok(None)` when no workflow has that id.
    async fn load_workflow_by_id(&self, id: Uuid) -> Result<Option<StoredWorkflow>, StoreError>;
}

/// Receives one record per executed step. Callers treat failures as best-effort.
#[async_trait]
pub trait HistorySink: Send + Sync {
    async fn record_history_entry(&self, entry: HistoryEntry) -> Result<(), StoreError>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn append_event(&self, event: NewEvent) -> Result<(), StoreError>;

    async fn get_events_after(
        &self,
        run_id: Uuid,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<RunEvent>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("stored workflow {id} could not be decoded: {message}")]
    Decode { id: Uuid, message: String },
    #[error("store error: {0}")]
    Other(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Other(e.to_string())
    }
}
