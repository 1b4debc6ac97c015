//! The `run_workflow` entry point.

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};
use triageflow_config::{ExecutionPayload, WorkflowDef};
use triageflow_runtime::{Effects, Runtime};
use triageflow_workflow::{ValidationCache, Workflow};

use crate::assessment::assess;
use crate::backend::{Backend, InlineBackend};
use crate::error::EngineError;
use crate::orchestrator::Orchestrator;
use crate::result::{ExecutionResult, OrchestrationReport};

/// Validates and runs workflow definitions.
///
/// Holds no per-run state. Validated definitions are cached by
/// organization, name and revision and shared read-only across runs.
pub struct WorkflowEngine {
  cache: ValidationCache,
  orchestrator: Orchestrator,
}

impl WorkflowEngine {
  /// Engine with only the inline backend, running against `effects`.
  pub fn new(effects: Effects) -> Self {
    Self::with_runtime(Runtime::new(effects))
  }

  pub fn with_runtime(runtime: Runtime) -> Self {
    Self {
      cache: ValidationCache::new(),
      orchestrator: Orchestrator::new(InlineBackend::new(runtime)),
    }
  }

  /// Make an additional orchestration backend available.
  pub fn register_backend(&mut self, backend: Arc<dyn Backend>) {
    self.orchestrator.register(backend);
  }

  pub fn cache(&self) -> &ValidationCache {
    &self.cache
  }

  /// Validate a definition without running it.
  pub fn validate(&self, definition: &WorkflowDef) -> Result<Arc<Workflow>, EngineError> {
    Ok(self.cache.get_or_validate(definition)?)
  }

  /// Run a workflow to completion.
  pub async fn run_workflow(
    &self,
    payload: ExecutionPayload,
  ) -> Result<ExecutionResult, EngineError> {
    self
      .run_workflow_with_cancel(payload, CancellationToken::new())
      .await
  }

  /// Run a workflow, stopping between node dispatches once `cancel` fires.
  ///
  /// Returns an error only when the request is rejected before any node
  /// executes. Everything that happens after that is reported in the
  /// result.
  #[instrument(
    name = "run_workflow",
    skip_all,
    fields(
      organization_id = %payload.organization_id,
      workflow = %payload.definition.metadata.name,
      orchestration = %payload.options.orchestration,
    )
  )]
  pub async fn run_workflow_with_cancel(
    &self,
    payload: ExecutionPayload,
    cancel: CancellationToken,
  ) -> Result<ExecutionResult, EngineError> {
    let ExecutionPayload {
      organization_id,
      definition,
      input,
      options,
    } = payload;

    let workflow = self.validate(&definition)?;

    let owner = &workflow.metadata().organization_id;
    if &organization_id != owner {
      return Err(EngineError::OrganizationMismatch {
        requested: organization_id,
        workflow: workflow.metadata().name.clone(),
        owner: owner.clone(),
      });
    }

    if !input.is_object() {
      return Err(EngineError::InvalidInput {
        found: json_type(&input),
      });
    }

    let backend = self.orchestrator.select(options.orchestration);
    let report = OrchestrationReport {
      selected_backend: backend.kind(),
      preferred_backend: options.orchestration,
      analysis: assess(&workflow),
    };

    info!(backend = %report.selected_backend, "dispatching run");
    let run = backend
      .run(Arc::clone(&workflow), input, &options, cancel)
      .await?;

    Ok(ExecutionResult {
      orchestration: report,
      run,
    })
  }
}

fn json_type(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}
