//! Hands one record per executed step to the history collaborator without waiting.

use std::sync::Arc;

use apichain_store::{HistoryEntry, HistorySink};
use chrono::Utc;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::step::StepResult;

pub fn entry_for(run_id: Uuid, workflow_id: Option<&str>, step: &StepResult) -> HistoryEntry {
    HistoryEntry {
        run_id,
        workflow_id: workflow_id.map(str::to_string),
        step_order: step.step_order,
        step_name: step.step_name.clone(),
        request: serde_json::to_value(&step.request).unwrap_or(JsonValue::Null),
        response: step
            .response
            .as_ref()
            .and_then(|r| serde_json::to_value(r).ok())
            .unwrap_or(JsonValue::Null),
        duration_ms: i64::try_from(step.duration).unwrap_or(i64::MAX),
        success: step.success,
        recorded_at: Utc::now(),
    }
}

/// Spawns one write per step. Must be called inside a Tokio runtime; failures are
/// logged and never reach the caller.
pub fn emit(sink: &Arc<dyn HistorySink>, run_id: Uuid, workflow_id: Option<&str>, steps: &[StepResult]) {
    for step in steps {
        let entry = entry_for(run_id, workflow_id, step);
        let sink = Arc::clone(sink);
        tokio::spawn(async move {
            let order = entry.step_order;
            if let Err(e) = sink.record_history_entry(entry).await {
                tracing::warn!(%run_id, step_order = order, error = %e, "failed to record history entry");
            }
        });
    }
}
