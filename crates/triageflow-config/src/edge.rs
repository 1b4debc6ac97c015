use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
  pub id: String,
  pub source_id: String,
  pub target_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
  pub guard: Guard,
}

impl Edge {
  /// Create an edge that is traversed once the source resolves.
  pub fn always(
    id: impl Into<String>,
    source_id: impl Into<String>,
    target_id: impl Into<String>,
  ) -> Self {
    Self {
      id: id.into(),
      source_id: source_id.into(),
      target_id: target_id.into(),
      label: None,
      guard: Guard::Always,
    }
  }

  /// Create an edge that is traversed only when the source resolves to `status`.
  pub fn on_status(
    id: impl Into<String>,
    source_id: impl Into<String>,
    target_id: impl Into<String>,
    status: GuardStatus,
  ) -> Self {
    Self {
      id: id.into(),
      source_id: source_id.into(),
      target_id: target_id.into(),
      label: None,
      guard: Guard::Status { status },
    }
  }
}

/// Predicate deciding whether an edge's target becomes eligible to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Guard {
  /// Traverse unconditionally once the source node has resolved.
  Always,
  /// Traverse only if the source node resolved to `status`.
  Status { status: GuardStatus },
}

/// A resolved node status an edge guard (or a condition default) can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardStatus {
  Success,
  Failure,
}

impl fmt::Display for GuardStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GuardStatus::Success => f.write_str("success"),
      GuardStatus::Failure => f.write_str("failure"),
    }
  }
}
