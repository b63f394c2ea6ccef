use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::{
    EventStore, HistoryEntry, HistorySink, NewEvent, NewWorkflow, RunEvent, StoreError,
    StoredWorkflow, WorkflowStore,
};

use super::events;
use super::history;
use super::workflows;

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn history_for_run(&self, run_id: Uuid) -> Result<Vec<HistoryEntry>, StoreError> {
        history::get_history_for_run(&self.pool, run_id).await
    }
}

#[async_trait]
impl WorkflowStore for PostgresStore {
    async fn save_workflow(&self, workflow: NewWorkflow) -> Result<StoredWorkflow, StoreError> {
        workflows::insert_workflow(&self.pool, workflow).await
    }

    async fn load_workflow_by_id(&self, id: Uuid) -> Result<Option<StoredWorkflow>, StoreError> {
        workflows::get_workflow(&self.pool, id).await
    }
}

#[async_trait]
impl HistorySink for PostgresStore {
    async fn record_history_entry(&self, entry: HistoryEntry) -> Result<(), StoreError> {
        history::insert_history_entry(&self.pool, entry).await
    }
}

#[async_trait]
impl EventStore for PostgresStore {
    async fn append_event(&self, event: NewEvent) -> Result<(), StoreError> {
        events::append_event(&self.pool, event).await
    }

    async fn get_events_after(&self, run_id: Uuid, after_id: i64, limit: i64) -> Result<Vec<RunEvent>, StoreError> {
        events::get_events_after(&self.pool, run_id, after_id, limit).await
    }
}
