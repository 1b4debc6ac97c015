use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::workflow::WorkflowDef;

/// Default soft execution deadline, in milliseconds.
pub const DEFAULT_MAX_EXECUTION_MS: u64 = 15_000;

/// Execution strategy requested for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrchestrationBackend {
  /// Synchronous, single-task execution within the caller's invocation.
  #[default]
  Inline,
  Temporal,
  DurableObjects,
}

impl OrchestrationBackend {
  pub const ALL: [OrchestrationBackend; 3] = [
    OrchestrationBackend::Inline,
    OrchestrationBackend::Temporal,
    OrchestrationBackend::DurableObjects,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      OrchestrationBackend::Inline => "inline",
      OrchestrationBackend::Temporal => "temporal",
      OrchestrationBackend::DurableObjects => "durable-objects",
    }
  }
}

impl fmt::Display for OrchestrationBackend {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrchestrationBackend {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    OrchestrationBackend::ALL
      .into_iter()
      .find(|backend| backend.as_str() == s)
      .ok_or_else(|| format!("unknown orchestration backend '{}'", s))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOptions {
  #[serde(default)]
  pub orchestration: OrchestrationBackend,
  /// Soft deadline, checked between node dispatches.
  #[serde(default = "default_max_execution_ms")]
  pub max_execution_ms: u64,
}

impl Default for ExecutionOptions {
  fn default() -> Self {
    Self {
      orchestration: OrchestrationBackend::Inline,
      max_execution_ms: DEFAULT_MAX_EXECUTION_MS,
    }
  }
}

fn default_max_execution_ms() -> u64 {
  DEFAULT_MAX_EXECUTION_MS
}

/// A request to run one workflow definition against one input record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPayload {
  pub organization_id: String,
  pub definition: WorkflowDef,
  #[serde(default = "empty_object")]
  pub input: serde_json::Value,
  #[serde(default)]
  pub options: ExecutionOptions,
}

fn empty_object() -> serde_json::Value {
  serde_json::Value::Object(serde_json::Map::new())
}
