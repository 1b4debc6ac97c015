use thiserror::Error;

/// Structural defects that prevent a workflow from executing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("workflow has no nodes")]
  NoNodes,

  #[error("duplicate node id: {node_id}")]
  DuplicateNodeId { node_id: String },

  #[error("duplicate edge id: {edge_id}")]
  DuplicateEdgeId { edge_id: String },

  #[error("edge '{edge_id}' references unknown node '{node_id}'")]
  InvalidEdge { edge_id: String, node_id: String },

  /// The node ids along the detected cycle, starting and ending at the same node.
  #[error("workflow contains a cycle: {}", path.join(" -> "))]
  Cycle { path: Vec<String> },

  #[error("node '{node_id}' has variant '{variant}' which requires a '{expected}' action, got '{actual}'")]
  ActionMismatch {
    node_id: String,
    variant: String,
    expected: String,
    actual: String,
  },

  #[error("rule in node '{node_id}' references unknown node '{referenced}'")]
  UnknownRuleNode { node_id: String, referenced: String },

  #[error("invalid node '{node_id}': {message}")]
  InvalidNode { node_id: String, message: String },
}

impl ValidationError {
  pub fn is_cycle(&self) -> bool {
    matches!(self, ValidationError::Cycle { .. })
  }
}
