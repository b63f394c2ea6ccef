use std::sync::Arc;
use std::time::Instant;

use apichain_core::{validate_workflow, ErrorKind, ValidationError, Workflow};
use apichain_store::{HistorySink, StoreError, WorkflowStore};
use tracing::Instrument;
use uuid::Uuid;

use crate::auth::{AuthInjector, NoAuth};
use crate::events::{Event, EventSink, NoOpEventSink};
use crate::history;
use crate::protocol::HandlerRegistry;
use crate::response::millis;
use crate::step::{RunScope, StepExecutor, StepResult};

/// Terminal state of a run. Pending and running are phases inside `run_workflow`
/// and never reach a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Halted,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Completed => "completed",
            RunStatus::Halted => "halted",
        }
    }
}

/// Caller-supplied identity of one run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: Uuid,
    pub user_id: Option<String>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            user_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct WorkflowResult {
    pub success: bool,

    #[serde(rename = "workflowName")]
    pub workflow_name: String,

    #[serde(rename = "workflowId", skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,

    #[serde(rename = "runId")]
    pub run_id: Uuid,

    pub status: RunStatus,

    /// Milliseconds from the first step's start to the last step's end.
    #[serde(rename = "totalDuration")]
    pub total_duration: u64,

    pub steps: Vec<StepResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Problems that stop a run before any step executes.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("workflow has no steps")]
    EmptyWorkflow,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("workflow {0} not found")]
    NotFound(Uuid),
    #[error("no workflow store configured")]
    NoStore,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            EngineError::EmptyWorkflow => Some(ErrorKind::EmptyWorkflow),
            EngineError::Invalid(_) => Some(ErrorKind::InvalidRequest),
            EngineError::NotFound(_) => Some(ErrorKind::WorkflowNotFound),
            EngineError::NoStore | EngineError::Store(_) => None,
        }
    }
}

pub struct Engine {
    handlers: Arc<HandlerRegistry>,
    auth: Arc<dyn AuthInjector>,
    store: Option<Arc<dyn WorkflowStore>>,
    history: Option<Arc<dyn HistorySink>>,
    events: Arc<dyn EventSink>,
}

impl Engine {
    pub fn new(handlers: HandlerRegistry) -> Self {
        Self {
            handlers: Arc::new(handlers),
            auth: Arc::new(NoAuth),
            store: None,
            history: None,
            events: Arc::new(NoOpEventSink),
        }
    }

    pub fn with_auth(mut self, auth: Arc<dyn AuthInjector>) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn WorkflowStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_history(mut self, history: Arc<dyn HistorySink>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub async fn run_workflow_by_id(&self, id: Uuid, ctx: RunContext) -> Result<WorkflowResult, EngineError> {
        let store = self.store.as_ref().ok_or(EngineError::NoStore)?;
        let stored = store
            .load_workflow_by_id(id)
            .await?
            .ok_or(EngineError::NotFound(id))?;
        self.run_workflow(&stored.workflow, ctx).await
    }

    /// Structural problems are returned as `Err`; anything that goes wrong once steps
    /// start running is reported inside the [`WorkflowResult`].
    pub async fn run_workflow(&self, workflow: &Workflow, ctx: RunContext) -> Result<WorkflowResult, EngineError> {
        if workflow.steps.is_empty() {
            return Err(EngineError::EmptyWorkflow);
        }
        validate_workflow(workflow)?;

        let span = tracing::info_span!("run", run_id = %ctx.run_id, workflow = %workflow.name);
        Ok(self.drive(workflow, ctx).instrument(span).await)
    }

    async fn drive(&self, workflow: &Workflow, ctx: RunContext) -> WorkflowResult {
        let run_id = ctx.run_id;
        let executor = StepExecutor::new(Arc::clone(&self.handlers), Arc::clone(&self.auth));
        let mut scope = RunScope::new();
        let mut results = Vec::with_capacity(workflow.steps.len());
        let mut halt_error = None;

        self.events
            .emit(Event::RunStarted {
                run_id,
                workflow_name: workflow.name.clone(),
                workflow_id: workflow.id.clone(),
            })
            .await;
        tracing::info!(steps = workflow.steps.len(), user = ?ctx.user_id, "run started");

        let started = Instant::now();
        for (position, step) in workflow.ordered_steps().into_iter().enumerate() {
            self.events
                .emit(Event::StepStarted {
                    run_id,
                    step_order: step.order,
                    step_name: step.name.clone(),
                })
                .await;

            let result = executor.run(step, position, &mut scope).await;

            if result.success {
                tracing::info!(step = %step.name, duration_ms = result.duration, "step succeeded");
                self.events
                    .emit(Event::StepSucceeded {
                        run_id,
                        step_order: step.order,
                        status_code: result.response.as_ref().map(|r| r.status_code).unwrap_or(0),
                        duration_ms: result.duration,
                    })
                    .await;
            } else {
                let error = result.error.clone().unwrap_or_default();
                tracing::warn!(step = %step.name, kind = ?result.error_kind, "step failed: {error}");
                self.events
                    .emit(Event::StepFailed {
                        run_id,
                        step_order: step.order,
                        error: error.clone(),
                    })
                    .await;
                if !step.continue_on_failure {
                    halt_error = Some(format!(
                        "step `{}` (order {}) failed: {error}",
                        step.name, step.order
                    ));
                    results.push(result);
                    break;
                }
            }
            results.push(result);
        }
        let total_duration = millis(started.elapsed());

        let status = if halt_error.is_some() {
            RunStatus::Halted
        } else {
            RunStatus::Completed
        };
        let success = halt_error.is_none() && results.iter().all(|r| r.success);

        if let Some(sink) = &self.history {
            history::emit(sink, run_id, workflow.id.as_deref(), &results);
        }

        self.events
            .emit(Event::RunFinished { run_id, status, success })
            .await;
        tracing::info!(status = status.as_str(), success, total_duration_ms = total_duration, "run finished");

        WorkflowResult {
            success,
            workflow_name: workflow.name.clone(),
            workflow_id: workflow.id.clone(),
            run_id,
            status,
            total_duration,
            steps: results,
            error: halt_error,
        }
    }
}
