use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{
    EventStore, HistoryEntry, HistorySink, NewEvent, NewWorkflow, RunEvent, StoreError,
    StoredWorkflow, WorkflowStore,
};

/// Process-local store for tests, demos and one-shot CLI runs.
#[derive(Default)]
pub struct InMemoryStore {
    workflows: RwLock<HashMap<Uuid, StoredWorkflow>>,
    history: RwLock<Vec<HistoryEntry>>,
    events: RwLock<Vec<RunEvent>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn history_for_run(&self, run_id: Uuid) -> Vec<HistoryEntry> {
        self.history
            .read()
            .await
            .iter()
            .filter(|h| h.run_id == run_id)
            .cloned()
            .collect()
    }

    pub async fn history_len(&self) -> usize {
        self.history.read().await.len()
    }
}

#[async_trait]
impl WorkflowStore for InMemoryStore {
    async fn save_workflow(&self, new: NewWorkflow) -> Result<StoredWorkflow, StoreError> {
        let id = Uuid::new_v4();
        let mut workflow = new.workflow;
        workflow.id = Some(id.to_string());
        let stored = StoredWorkflow {
            id,
            owner: new.owner,
            workflow,
            created_at: Utc::now(),
        };
        self.workflows.write().await.insert(id, stored.clone());
        Ok(stored)
    }

    async fn load_workflow_by_id(&self, id: Uuid) -> Result<Option<StoredWorkflow>, StoreError> {
        Ok(self.workflows.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl HistorySink for InMemoryStore {
    async fn record_history_entry(&self, entry: HistoryEntry) -> Result<(), StoreError> {
        self.history.write().await.push(entry);
        Ok(())
    }
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn append_event(&self, event: NewEvent) -> Result<(), StoreError> {
        let mut events = self.events.write().await;
        let id = events.len() as i64 + 1;
        events.push(RunEvent {
            id,
            run_id: event.run_id,
            ts: Utc::now(),
            event_type: event.r#type,
            payload: event.payload,
        });
        Ok(())
    }

    async fn get_events_after(
        &self,
        run_id: Uuid,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<RunEvent>, StoreError> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .filter(|e| e.run_id == run_id && e.id > after_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}
