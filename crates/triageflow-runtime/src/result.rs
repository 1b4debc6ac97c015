//! Execution result types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use triageflow_config::GuardStatus;

/// Resolved status of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
  Success,
  Failure,
  Skipped,
}

impl NodeStatus {
  /// The status an edge guard can match against. Skipped nodes never
  /// satisfy a guard.
  pub fn as_guard(self) -> Option<GuardStatus> {
    match self {
      NodeStatus::Success => Some(GuardStatus::Success),
      NodeStatus::Failure => Some(GuardStatus::Failure),
      NodeStatus::Skipped => None,
    }
  }
}

impl From<GuardStatus> for NodeStatus {
  fn from(status: GuardStatus) -> Self {
    match status {
      GuardStatus::Success => NodeStatus::Success,
      GuardStatus::Failure => NodeStatus::Failure,
    }
  }
}

/// Result of a single node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResult {
  pub node_id: String,
  pub status: NodeStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub output: Option<serde_json::Value>,
  /// Captured collaborator or rendering error.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  #[serde(default)]
  pub notes: String,
  pub started_at: DateTime<Utc>,
  pub finished_at: DateTime<Utc>,
  pub duration_ms: u64,
}

impl NodeResult {
  pub(crate) fn skipped(node_id: &str, reason: &str, at: DateTime<Utc>) -> Self {
    Self {
      node_id: node_id.to_string(),
      status: NodeStatus::Skipped,
      output: None,
      error: None,
      notes: reason.to_string(),
      started_at: at,
      finished_at: at,
      duration_ms: 0,
    }
  }
}

/// What an executor produced for a node that ran to completion.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NodeOutcome {
  pub status: GuardStatus,
  pub output: serde_json::Value,
  pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
  Succeeded,
  Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
  Info,
  Warn,
  Error,
}

/// One entry of the per-run audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
  pub timestamp: DateTime<Utc>,
  pub level: LogLevel,
  pub message: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub node_id: Option<String>,
}

/// Why a run stopped before its queue drained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Termination {
  DeadlineExceeded { elapsed_ms: u64, max_execution_ms: u64 },
  Fatal { node_id: String, error: String },
  Cancelled,
}

impl Termination {
  /// Note attached to nodes left unresolved by this termination.
  pub fn skip_reason(&self) -> &'static str {
    match self {
      Termination::DeadlineExceeded { .. } => "execution deadline exceeded",
      Termination::Fatal { .. } => "run aborted after fatal error",
      Termination::Cancelled => "run cancelled",
    }
  }
}

impl std::fmt::Display for Termination {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Termination::DeadlineExceeded {
        elapsed_ms,
        max_execution_ms,
      } => write!(
        f,
        "execution deadline exceeded ({}ms elapsed, limit {}ms)",
        elapsed_ms, max_execution_ms
      ),
      Termination::Fatal { node_id, error } => {
        write!(f, "fatal error in node '{}': {}", node_id, error)
      }
      Termination::Cancelled => write!(f, "execution cancelled"),
    }
  }
}

/// Output summary of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutput {
  /// Output of every executed node that produced one, keyed by node id.
  pub context: serde_json::Map<String, serde_json::Value>,
  /// Run state written by actions (e.g. `assignment`).
  pub state: serde_json::Map<String, serde_json::Value>,
  /// Executed node ids in execution order. Skipped nodes are excluded.
  pub executed_nodes: Vec<String>,
}

/// Result of a complete workflow invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeResult {
  pub run_id: String,
  pub status: RunStatus,
  pub started_at: DateTime<Utc>,
  pub finished_at: DateTime<Utc>,
  pub duration_ms: u64,
  /// Results of all nodes, keyed by node id.
  pub node_results: BTreeMap<String, NodeResult>,
  pub logs: Vec<LogEntry>,
  pub output: RunOutput,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub termination: Option<Termination>,
}

impl InvokeResult {
  pub fn node(&self, node_id: &str) -> Option<&NodeResult> {
    self.node_results.get(node_id)
  }

  pub fn node_status(&self, node_id: &str) -> Option<NodeStatus> {
    self.node(node_id).map(|result| result.status)
  }

  pub fn executed_nodes(&self) -> &[String] {
    &self.output.executed_nodes
  }

  pub fn succeeded(&self) -> bool {
    self.status == RunStatus::Succeeded
  }
}

/// Whole milliseconds between two instants, clamped at zero.
pub(crate) fn elapsed_ms(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
  u64::try_from((to - from).num_milliseconds()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_skipped_never_matches_a_guard() {
    assert_eq!(NodeStatus::Success.as_guard(), Some(GuardStatus::Success));
    assert_eq!(NodeStatus::Failure.as_guard(), Some(GuardStatus::Failure));
    assert_eq!(NodeStatus::Skipped.as_guard(), None);
  }

  #[test]
  fn test_termination_wire_format() {
    let value = serde_json::to_value(Termination::DeadlineExceeded {
      elapsed_ms: 120,
      max_execution_ms: 100,
    })
    .unwrap();
    assert_eq!(
      value,
      json!({ "reason": "deadline_exceeded", "elapsedMs": 120, "maxExecutionMs": 100 })
    );

    let value = serde_json::to_value(Termination::Cancelled).unwrap();
    assert_eq!(value, json!({ "reason": "cancelled" }));
  }

  #[test]
  fn test_elapsed_clamps_backwards_clock() {
    let later = Utc::now();
    let earlier = later - chrono::Duration::milliseconds(50);
    assert_eq!(elapsed_ms(earlier, later), 50);
    assert_eq!(elapsed_ms(later, earlier), 0);
  }
}
