//! Runtime error types.

/// Errors returned by effect collaborators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EffectError {
  /// The collaborator rejected or failed to deliver the request.
  #[error("delivery failed: {0}")]
  Delivery(String),

  /// The collaborator could not be reached.
  #[error("collaborator unavailable: {0}")]
  Unavailable(String),

  /// Unrecoverable failure. Aborts the whole run instead of failing one node.
  #[error("fatal: {0}")]
  Fatal(String),
}

/// Errors that can occur while executing a single node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
  /// A collaborator call failed.
  #[error(transparent)]
  Effect(#[from] EffectError),

  /// Failed to render an action template.
  #[error("template rendering failed for node '{node_id}': {message}")]
  Template { node_id: String, message: String },
}

impl NodeError {
  /// Whether this error aborts the run rather than failing the node.
  pub fn is_fatal(&self) -> bool {
    matches!(self, NodeError::Effect(EffectError::Fatal(_)))
  }
}
