#![forbid(unsafe_code)]

//! Collaborator traits the engine loads workflows from and writes history to,
//! with in-memory and Postgres implementations.

pub mod memory;
pub mod postgres;
pub mod store;

pub use crate::memory::InMemoryStore;
pub use crate::postgres::run_migrations;
pub use crate::postgres::PostgresStore;
pub use crate::store::{
    EventStore, HistoryEntry, HistorySink, NewEvent, NewWorkflow, RunEvent, StoreError,
    StoredWorkflow, WorkflowStore,
};
