use std::sync::Arc;

use apichain_store::{EventStore, NewEvent};
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use crate::engine::RunStatus;

/// Run lifecycle notifications.
#[derive(Debug, Clone)]
pub enum Event {
    RunStarted {
        run_id: Uuid,
        workflow_name: String,
        workflow_id: Option<String>,
    },
    RunFinished {
        run_id: Uuid,
        status: RunStatus,
        success: bool,
    },
    StepStarted {
        run_id: Uuid,
        step_order: i64,
        step_name: String,
    },
    StepSucceeded {
        run_id: Uuid,
        step_order: i64,
        status_code: u16,
        duration_ms: u64,
    },
    StepFailed {
        run_id: Uuid,
        step_order: i64,
        error: String,
    },
}

impl Event {
    pub fn run_id(&self) -> Uuid {
        match self {
            Event::RunStarted { run_id, .. }
            | Event::RunFinished { run_id, .. }
            | Event::StepStarted { run_id, .. }
            | Event::StepSucceeded { run_id, .. }
            | Event::StepFailed { run_id, .. } => *run_id,
        }
    }

    /// Dotted event type and JSON payload, without the run id.
    pub fn to_parts(&self) -> (&'static str, JsonValue) {
        match self {
            Event::RunStarted { workflow_name, workflow_id, .. } => (
                "run.started",
                json!({ "workflow_name": workflow_name, "workflow_id": workflow_id }),
            ),
            Event::RunFinished { status, success, .. } => (
                "run.finished",
                json!({ "status": status.as_str(), "success": success }),
            ),
            Event::StepStarted { step_order, step_name, .. } => (
                "step.started",
                json!({ "step_order": step_order, "step_name": step_name }),
            ),
            Event::StepSucceeded { step_order, status_code, duration_ms, .. } => (
                "step.succeeded",
                json!({ "step_order": step_order, "status_code": status_code, "duration_ms": duration_ms }),
            ),
            Event::StepFailed { step_order, error, .. } => (
                "step.failed",
                json!({ "step_order": step_order, "error": error }),
            ),
        }
    }
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: Event);
}

pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: Event) {}
}

/// One JSON object per line on stdout.
pub struct StdoutEventSink;

#[async_trait]
impl EventSink for StdoutEventSink {
    async fn emit(&self, event: Event) {
        let (event_type, mut payload) = event.to_parts();
        if let Some(obj) = payload.as_object_mut() {
            obj.insert("type".to_string(), json!(event_type));
            obj.insert("run_id".to_string(), json!(event.run_id().to_string()));
        }
        println!("{}", serde_json::to_string(&payload).unwrap_or_default());
    }
}

#[derive(Default)]
pub struct CompositeEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }
}

#[async_trait]
impl EventSink for CompositeEventSink {
    async fn emit(&self, event: Event) {
        for sink in &self.sinks {
            sink.emit(event.clone()).await;
        }
    }
}

/// Appends events to an [`EventStore`]; write failures are logged and dropped.
pub struct StoreEventSink {
    store: Arc<dyn EventStore>,
}

impl StoreEventSink {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EventSink for StoreEventSink {
    async fn emit(&self, event: Event) {
        let (event_type, payload) = event.to_parts();
        let run_id = event.run_id();
        if let Err(e) = self
            .store
            .append_event(NewEvent {
                run_id,
                r#type: event_type.to_string(),
                payload,
            })
            .await
        {
            tracing::warn!(%run_id, error = %e, "failed to persist event");
        }
    }
}
