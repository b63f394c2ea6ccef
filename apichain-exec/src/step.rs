use std::sync::Arc;
use std::time::Instant;

use apichain_core::{extract, substitute, ApiRequest, Assertion, ErrorKind, Step, VariableBag, VariableMapping};
use serde_json::Value as JsonValue;

use crate::assertions::{self, AssertionOutcome};
use crate::auth::AuthInjector;
use crate::protocol::HandlerRegistry;
use crate::response::{millis, NormalizedResponse};
use crate::secrets::redact_request;

/// Outcome of one executed step.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StepResult {
    #[serde(rename = "stepName")]
    pub step_name: String,

    #[serde(rename = "stepOrder")]
    pub step_order: i64,

    /// The request as sent (after substitution and auth), with credentials masked.
    pub request: ApiRequest,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<NormalizedResponse>,

    /// Milliseconds spent on the whole step.
    pub duration: u64,

    pub success: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assertions: Vec<AssertionOutcome>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(rename = "errorKind", skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

/// Per-run state: the variable bag plus the body of every step executed so far,
/// indexed by execution position (`None` for failed steps).
#[derive(Debug, Default)]
pub struct RunScope {
    pub bag: VariableBag,
    bodies: Vec<Option<JsonValue>>,
}

impl RunScope {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, position: usize, body: Option<JsonValue>) {
        if self.bodies.len() <= position {
            self.bodies.resize(position + 1, None);
        }
        self.bodies[position] = body;
    }

    /// Binds `mapping` from a recorded body. Errors are messages for the step's warnings.
    fn bind(&mut self, mapping: &VariableMapping) -> Result<(), String> {
        let body = match self.bodies.get(mapping.source_step) {
            None => {
                return Err(format!(
                    "`{}`: step {} has not run yet",
                    mapping.target_variable, mapping.source_step
                ))
            }
            Some(None) => {
                return Err(format!(
                    "`{}`: step {} failed, nothing to extract",
                    mapping.target_variable, mapping.source_step
                ))
            }
            Some(Some(body)) => body,
        };
        let value = extract(body, &mapping.source_path)
            .map_err(|e| format!("`{}`: {e}", mapping.target_variable))?;
        self.bag.insert(mapping.target_variable.clone(), value);
        Ok(())
    }
}

/// Runs a single step: substitute, inject auth, dispatch, assert, bind.
#[derive(Clone)]
pub struct StepExecutor {
    handlers: Arc<HandlerRegistry>,
    auth: Arc<dyn AuthInjector>,
}

struct Failure {
    kind: ErrorKind,
    message: String,
}

impl StepExecutor {
    pub fn new(handlers: Arc<HandlerRegistry>, auth: Arc<dyn AuthInjector>) -> Self {
        Self { handlers, auth }
    }

    /// Never fails; every problem is reported inside the returned [`StepResult`].
    pub async fn run(&self, step: &Step, position: usize, scope: &mut RunScope) -> StepResult {
        let started = Instant::now();
        let mut warnings = Vec::new();

        for mapping in step.variable_mappings.iter().filter(|m| m.source_step != position) {
            if mapping.source_step > position {
                warnings.push(format!(
                    "`{}`: sourceStep {} refers to a later step",
                    mapping.target_variable, mapping.source_step
                ));
                continue;
            }
            if let Err(w) = scope.bind(mapping) {
                warnings.push(w);
            }
        }

        let mut result = StepResult {
            step_name: step.name.clone(),
            step_order: step.order,
            request: step.api_request.clone(),
            response: None,
            duration: 0,
            success: false,
            assertions: Vec::new(),
            warnings: Vec::new(),
            error: None,
            error_kind: None,
        };

        if let Err(f) = self.dispatch(step, scope, &mut result, &mut warnings).await {
            result.error = Some(f.message);
            result.error_kind = Some(f.kind);
        }

        if result.success {
            let body = result.response.as_ref().map(|r| r.body.clone());
            scope.record(position, body);
            for mapping in step.variable_mappings.iter().filter(|m| m.source_step == position) {
                if let Err(w) = scope.bind(mapping) {
                    warnings.push(w);
                }
            }
        } else {
            scope.record(position, None);
        }

        for w in &warnings {
            tracing::warn!(step = %step.name, "{w}");
        }
        result.warnings = warnings;
        result.duration = millis(started.elapsed());
        result
    }

    async fn dispatch(
        &self,
        step: &Step,
        scope: &RunScope,
        result: &mut StepResult,
        warnings: &mut Vec<String>,
    ) -> Result<(), Failure> {
        let substitution = substitute(&step.api_request, &scope.bag).map_err(|e| Failure {
            kind: ErrorKind::UnresolvedVariable,
            message: e.to_string(),
        })?;
        warnings.extend(substitution.unresolved.iter().map(ToString::to_string));
        let mut request = substitution.request;
        result.request = request.clone();

        let handler = self.handlers.get(request.protocol()).map_err(|e| Failure {
            kind: e.kind(),
            message: e.to_string(),
        })?;

        let mut sensitive = Vec::new();
        if let Some(auth_ref) = step.auth_config_id.as_deref() {
            request = self.auth.inject(auth_ref, request).await.map_err(|e| Failure {
                kind: ErrorKind::AuthFailed,
                message: e.to_string(),
            })?;
            sensitive = self.auth.sensitive_fields(auth_ref);
        }
        result.request = redact_request(&request, &sensitive);

        handler.validate(&request).map_err(|e| Failure {
            kind: e.kind(),
            message: e.to_string(),
        })?;

        let response = handler.execute(&request).await;
        tracing::debug!(
            step = %step.name,
            status = response.status_code,
            duration_ms = response.duration,
            "response received"
        );
        result.assertions = assertions::evaluate_all(&step.assertions, &response);
        let verdict = judge(&step.assertions, &result.assertions, &response);
        result.response = Some(response);
        verdict?;
        result.success = true;
        Ok(())
    }
}

/// A transport failure always fails. An explicit status assertion replaces the 2xx rule.
fn judge(
    declared: &[Assertion],
    outcomes: &[AssertionOutcome],
    response: &NormalizedResponse,
) -> Result<(), Failure> {
    if response.is_transport_failure() {
        return Err(Failure {
            kind: ErrorKind::RequestFailed,
            message: response
                .failure_message()
                .unwrap_or("request failed")
                .to_string(),
        });
    }
    if let Some(failed) = outcomes.iter().find(|o| !o.passed) {
        return Err(Failure {
            kind: ErrorKind::AssertionFailed,
            message: format!(
                "{} assertion failed: {}",
                failed.kind,
                failed.message.as_deref().unwrap_or("no detail")
            ),
        });
    }
    let checks_status = declared
        .iter()
        .any(|a| matches!(a, Assertion::StatusCode { .. }));
    if !checks_status && !response.is_success_status() {
        return Err(Failure {
            kind: ErrorKind::RequestFailed,
            message: format!("unexpected status {}", response.status_code),
        });
    }
    Ok(())
}
