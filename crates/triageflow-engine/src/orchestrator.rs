//! Backend selection.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};
use triageflow_config::OrchestrationBackend;

use crate::backend::{Backend, InlineBackend};

/// Registry of available backends.
///
/// Inline is always available. Requests for a backend that is not
/// registered fall back to it.
pub struct Orchestrator {
  inline: Arc<dyn Backend>,
  backends: HashMap<OrchestrationBackend, Arc<dyn Backend>>,
}

impl Orchestrator {
  pub fn new(inline: InlineBackend) -> Self {
    Self {
      inline: Arc::new(inline),
      backends: HashMap::new(),
    }
  }

  /// Register a backend, replacing any previous one of the same kind.
  pub fn register(&mut self, backend: Arc<dyn Backend>) {
    let kind = backend.kind();
    debug!(backend = %kind, "backend registered");
    if kind == OrchestrationBackend::Inline {
      self.inline = backend;
    } else {
      self.backends.insert(kind, backend);
    }
  }

  pub fn is_registered(&self, kind: OrchestrationBackend) -> bool {
    kind == OrchestrationBackend::Inline || self.backends.contains_key(&kind)
  }

  /// The backend for `requested`, or inline if it is not available.
  pub fn select(&self, requested: OrchestrationBackend) -> Arc<dyn Backend> {
    if requested == OrchestrationBackend::Inline {
      return Arc::clone(&self.inline);
    }

    match self.backends.get(&requested) {
      Some(backend) => Arc::clone(backend),
      None => {
        warn!(
          requested = %requested,
          "orchestration backend not available, falling back to inline"
        );
        Arc::clone(&self.inline)
      }
    }
  }
}
