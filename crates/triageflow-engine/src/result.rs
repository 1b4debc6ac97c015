//! Engine-level result types.

use serde::{Deserialize, Serialize};
use triageflow_config::OrchestrationBackend;
use triageflow_runtime::{InvokeResult, NodeStatus, RunStatus};

use crate::assessment::BackendAnalysis;

/// How a run was orchestrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationReport {
  /// The backend that actually ran the workflow.
  pub selected_backend: OrchestrationBackend,
  /// The backend the caller asked for.
  pub preferred_backend: OrchestrationBackend,
  pub analysis: Vec<BackendAnalysis>,
}

/// The outcome of [`crate::WorkflowEngine::run_workflow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
  pub orchestration: OrchestrationReport,
  #[serde(flatten)]
  pub run: InvokeResult,
}

impl ExecutionResult {
  pub fn status(&self) -> RunStatus {
    self.run.status
  }

  pub fn succeeded(&self) -> bool {
    self.run.succeeded()
  }

  pub fn node_status(&self, node_id: &str) -> Option<NodeStatus> {
    self.run.node_status(node_id)
  }

  pub fn executed_nodes(&self) -> &[String] {
    self.run.executed_nodes()
  }
}
