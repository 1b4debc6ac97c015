//! Triageflow Workflow Engine
//!
//! This crate is the entry point for running workflows. It validates the
//! definition (through a shared [`ValidationCache`](triageflow_workflow::ValidationCache)),
//! selects an orchestration backend and returns a structured
//! [`ExecutionResult`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      WorkflowEngine                         │
//! │  - run_workflow(payload) → ExecutionResult                  │
//! │  - request checks, validation cache                         │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Orchestrator                          │
//! │  - select(kind) → Backend, falls back to inline             │
//! │  - backend suitability analysis                             │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Runtime                             │
//! │  - graph traversal, edge guards, deadline                   │
//! │  - trigger / condition / action executors                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use triageflow_engine::WorkflowEngine;
//! use triageflow_runtime::Effects;
//!
//! let engine = WorkflowEngine::new(Effects::simulated());
//! let result = engine.run_workflow(payload).await?;
//! println!("{:?}", result.executed_nodes());
//! ```

mod assessment;
mod backend;
mod engine;
mod error;
mod orchestrator;
mod result;

pub use assessment::{BackendAnalysis, GraphProfile, Suitability, assess};
pub use backend::{Backend, InlineBackend};
pub use engine::WorkflowEngine;
pub use error::EngineError;
pub use orchestrator::Orchestrator;
pub use result::{ExecutionResult, OrchestrationReport};
