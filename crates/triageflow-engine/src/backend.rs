//! Orchestration backends.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use triageflow_config::{ExecutionOptions, OrchestrationBackend};
use triageflow_runtime::{InvokeResult, Runtime};
use triageflow_workflow::Workflow;

use crate::error::EngineError;

/// A strategy for driving the runtime over a validated workflow.
///
/// Validation, rule evaluation and node execution are shared; a backend only
/// decides where and when [`Runtime::invoke`] happens.
#[async_trait]
pub trait Backend: Send + Sync {
  fn kind(&self) -> OrchestrationBackend;

  async fn run(
    &self,
    workflow: Arc<Workflow>,
    input: serde_json::Value,
    options: &ExecutionOptions,
    cancel: CancellationToken,
  ) -> Result<InvokeResult, EngineError>;
}

/// Runs the workflow on the caller's task and returns when it completes.
#[derive(Clone)]
pub struct InlineBackend {
  runtime: Runtime,
}

impl InlineBackend {
  pub fn new(runtime: Runtime) -> Self {
    Self { runtime }
  }
}

#[async_trait]
impl Backend for InlineBackend {
  fn kind(&self) -> OrchestrationBackend {
    OrchestrationBackend::Inline
  }

  async fn run(
    &self,
    workflow: Arc<Workflow>,
    input: serde_json::Value,
    options: &ExecutionOptions,
    cancel: CancellationToken,
  ) -> Result<InvokeResult, EngineError> {
    Ok(
      self
        .runtime
        .invoke(&workflow, input, options.max_execution_ms, cancel)
        .await,
    )
  }
}
