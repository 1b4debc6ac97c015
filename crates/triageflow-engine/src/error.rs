use triageflow_config::OrchestrationBackend;
use triageflow_workflow::ValidationError;

/// Reasons a run is rejected before any node executes.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
  /// The definition is structurally invalid.
  #[error(transparent)]
  Validation(#[from] ValidationError),

  /// The payload's organization does not own the definition.
  #[error("organization '{requested}' does not own workflow '{workflow}' (owner: '{owner}')")]
  OrganizationMismatch {
    requested: String,
    workflow: String,
    owner: String,
  },

  /// The input record is not a JSON object.
  #[error("workflow input must be a JSON object, got {found}")]
  InvalidInput { found: &'static str },

  /// A backend could not accept the run.
  #[error("orchestration backend '{backend}' failed: {message}")]
  Backend {
    backend: OrchestrationBackend,
    message: String,
  },
}

impl EngineError {
  /// Whether the error is a definition defect rather than a bad request.
  pub fn is_validation(&self) -> bool {
    matches!(self, EngineError::Validation(_))
  }
}
