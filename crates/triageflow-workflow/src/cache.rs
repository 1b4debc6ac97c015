//! Validation caching across runs.
//!
//! A definition is validated once per (organization, name, revision) and the
//! resulting [`Workflow`] is shared read-only by every run that uses it.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;
use triageflow_config::WorkflowDef;

use crate::error::ValidationError;
use crate::validate::validate;
use crate::workflow::Workflow;

/// Cache key identifying a definition revision.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct CacheKey {
  organization_id: String,
  name: String,
  revision: u32,
}

impl CacheKey {
  fn of(def: &WorkflowDef) -> Self {
    Self {
      organization_id: def.metadata.organization_id.clone(),
      name: def.metadata.name.clone(),
      revision: def.metadata.revision,
    }
  }
}

/// Caches validated workflows to avoid revalidating the same revision.
///
/// A cached entry is only reused when its definition is identical to the one
/// being looked up, so a definition edited without a revision bump is
/// revalidated rather than served stale.
#[derive(Clone, Default)]
pub struct ValidationCache {
  cache: Arc<RwLock<HashMap<CacheKey, Arc<Workflow>>>>,
}

impl ValidationCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// Get a validated workflow from cache, or validate and cache it.
  ///
  /// Failed validations are not cached.
  pub fn get_or_validate(&self, def: &WorkflowDef) -> Result<Arc<Workflow>, ValidationError> {
    let key = CacheKey::of(def);

    {
      let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
      if let Some(workflow) = cache.get(&key) {
        if workflow.definition() == def {
          debug!(workflow = %key.name, revision = key.revision, "validation cache hit");
          return Ok(Arc::clone(workflow));
        }
      }
    }

    let workflow = Arc::new(validate(def)?);

    {
      let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
      cache.insert(key, Arc::clone(&workflow));
    }

    Ok(workflow)
  }

  pub fn len(&self) -> usize {
    self
      .cache
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Clear the cache.
  pub fn clear(&self) {
    let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
    cache.clear();
  }
}
