//! Triageflow Config
//!
//! This crate contains the serializable workflow definition types for
//! triageflow. These types describe a workflow before it is validated by
//! `triageflow-workflow` and executed by `triageflow-runtime`.
//!
//! Definitions arrive as JSON, either from the API layer or from a file via
//! the CLI. Field names on the wire are camelCase:
//!
//! ```json
//! {
//!   "metadata": { "name": "Escalation", "status": "draft", "organizationId": "org-1" },
//!   "nodes": [
//!     {
//!       "id": "trigger-1", "key": "trigger-1", "name": "Ticket Created",
//!       "type": "trigger", "variant": "ticket_created",
//!       "config": { "resource": "tickets", "event": "created", "filters": [] }
//!     }
//!   ],
//!   "edges": []
//! }
//! ```

mod action;
mod edge;
mod metadata;
mod node;
mod options;
mod rule;
mod workflow;

pub use action::{
  ActionConfig, AssignAction, HttpMethod, NotifyAction, NotifyChannel, WebhookAction, WebhookHeader,
};
pub use edge::{Edge, Guard, GuardStatus};
pub use metadata::{WorkflowMetadata, WorkflowStatus};
pub use node::{
  ActionVariant, ConditionConfig, ConditionVariant, Logic, NodeDef, NodeKind, Position,
  TriggerConfig, TriggerVariant,
};
pub use options::{ExecutionOptions, ExecutionPayload, OrchestrationBackend};
pub use rule::{FieldRef, Operator, Rule, RuleSource};
pub use workflow::WorkflowDef;
