use std::path::Path;
use std::sync::Arc;

use apichain_exec::auth::StaticAuthInjector;
use apichain_exec::secrets::EnvSecretsProvider;
use apichain_exec::{
    Engine, EngineError, EventSink, HandlerRegistry, NoOpEventSink, RunContext, StdoutEventSink,
    StoreEventSink, WorkflowResult,
};
use apichain_store::{HistoryEntry, HistorySink, PostgresStore, StoreError};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::common::{connect_store, load_workflow};
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{AuthArgs, EventsMode, ExecArgs, OutputArgs, StoreArgs};

/// Queues history entries for a background writer so the process can drain
/// them before exiting.
struct QueuedHistory {
    tx: mpsc::UnboundedSender<HistoryEntry>,
}

impl QueuedHistory {
    fn spawn(store: Arc<PostgresStore>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<HistoryEntry>();
        let handle = tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                let order = entry.step_order;
                if let Err(e) = store.record_history_entry(entry).await {
                    tracing::warn!(step_order = order, error = %e, "failed to write history entry");
                }
            }
        });
        (Self { tx }, handle)
    }
}

#[async_trait]
impl HistorySink for QueuedHistory {
    async fn record_history_entry(&self, entry: HistoryEntry) -> Result<(), StoreError> {
        self.tx
            .send(entry)
            .map_err(|_| StoreError::Other("history writer has stopped".to_string()))
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn run_cmd(
    path: Option<&Path>,
    id: Option<&str>,
    events: EventsMode,
    exec: ExecArgs,
    auth: AuthArgs,
    store: StoreArgs,
    output: OutputArgs,
) -> i32 {
    let config = exec.to_config();
    let handlers = match HandlerRegistry::with_defaults(&config) {
        Ok(h) => h,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::RUNTIME_ERROR;
        }
    };
    let mut engine = Engine::new(handlers);

    if let Some(auth_path) = &auth.auth {
        match StaticAuthInjector::from_path(auth_path, Arc::new(EnvSecretsProvider::default())) {
            Ok(injector) => engine = engine.with_auth(Arc::new(injector)),
            Err(e) => {
                print_error(output.format, output.quiet, &e.to_string());
                return exit_codes::RUNTIME_ERROR;
            }
        }
    }

    // The environment fallback only applies when a store is actually required.
    let needs_store = id.is_some() || events == EventsMode::Store || store.store.is_some();
    let mut writer = None;
    let mut pg = None;
    if needs_store {
        let connected = match connect_store(&store, &output).await {
            Ok(s) => Arc::new(s),
            Err(code) => return code,
        };
        let (queue, handle) = QueuedHistory::spawn(connected.clone());
        engine = engine.with_store(connected.clone()).with_history(Arc::new(queue));
        writer = Some(handle);
        pg = Some(connected);
    }

    let sink: Arc<dyn EventSink> = match (events, &pg) {
        (EventsMode::Stdout, _) => Arc::new(StdoutEventSink),
        (EventsMode::Store, Some(pg)) => Arc::new(StoreEventSink::new(pg.clone())),
        _ => Arc::new(NoOpEventSink),
    };
    engine = engine.with_events(sink);

    let outcome = match (path, id) {
        (Some(path), _) => {
            let parsed = match load_workflow(path, &output) {
                Ok(p) => p,
                Err(code) => return code,
            };
            engine.run_workflow(&parsed.workflow, RunContext::default()).await
        }
        (None, Some(id)) => match Uuid::parse_str(id) {
            Ok(id) => engine.run_workflow_by_id(id, RunContext::default()).await,
            Err(e) => {
                print_error(output.format, output.quiet, &format!("invalid workflow id: {e}"));
                return exit_codes::RUNTIME_ERROR;
            }
        },
        (None, None) => {
            print_error(output.format, output.quiet, "pass a workflow file or --id");
            return exit_codes::RUNTIME_ERROR;
        }
    };

    drop(engine);
    if let Some(handle) = writer {
        let _ = handle.await;
    }

    match outcome {
        Ok(result) => {
            if output.format == OutputFormat::Text && !output.quiet {
                print_summary(&result);
            } else {
                print_result(output.format, output.quiet, &result);
            }
            if result.success {
                exit_codes::SUCCESS
            } else {
                exit_codes::RUN_FAILED
            }
        }
        Err(EngineError::Invalid(err)) => {
            print_error(output.format, output.quiet, "workflow validation failed");
            for v in &err.violations {
                print_error(output.format, output.quiet, &v.to_string());
            }
            exit_codes::VALIDATION_FAILED
        }
        Err(e @ EngineError::EmptyWorkflow) => {
            print_error(output.format, output.quiet, &e.to_string());
            exit_codes::VALIDATION_FAILED
        }
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            exit_codes::RUNTIME_ERROR
        }
    }
}

fn print_summary(result: &WorkflowResult) {
    println!(
        "workflow `{}` {} ({}) in {}ms, run {}",
        result.workflow_name,
        result.status.as_str(),
        if result.success { "success" } else { "failed" },
        result.total_duration,
        result.run_id
    );
    for step in &result.steps {
        let status = step.response.as_ref().map(|r| r.status_code).unwrap_or(0);
        println!(
            "  [{}] {:>3} {:<24} status {:>3} {:>6}ms",
            if step.success { "ok" } else { "FAIL" },
            step.step_order,
            step.step_name,
            status,
            step.duration
        );
        if let (Some(kind), Some(error)) = (&step.error_kind, &step.error) {
            println!("        {kind}: {error}");
        }
        for w in &step.warnings {
            println!("        warning: {w}");
        }
    }
    if let Some(error) = &result.error {
        println!("halted: {error}");
    }
}
