mod trait_store;
mod types;

pub use trait_store::{EventStore, HistorySink, StoreError, WorkflowStore};
pub use types::{HistoryEntry, NewEvent, NewWorkflow, RunEvent, StoredWorkflow};
