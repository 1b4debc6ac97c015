//! Triageflow Workflow
//!
//! This crate provides the validated workflow representation for triageflow.
//! A [`Workflow`] is only obtainable through [`validate`], so holding one
//! means the definition is structurally sound and ready for execution.
//!
//! Key differences from `triageflow-config`:
//! - Node ids are unique and every edge endpoint resolves to a node
//! - The edge graph is acyclic
//! - Node configurations match their variants (e.g. `send_email` carries a
//!   notify action)
//! - Nodes are indexed so the runtime can work with `usize` handles instead
//!   of string lookups
//!
//! Validation results can be reused across runs with [`ValidationCache`].

mod cache;
mod error;
mod graph;
mod validate;
mod workflow;

pub use cache::ValidationCache;
pub use error::ValidationError;
pub use graph::Graph;
pub use validate::validate;
pub use workflow::Workflow;
