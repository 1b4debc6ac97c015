//! Triageflow Runtime
//!
//! This crate executes validated workflows. It provides the rule evaluator
//! shared by trigger filters and condition nodes, the per-type node
//! executors, and the [`Runtime`] that walks the graph, applies edge guards
//! and assembles an [`InvokeResult`].
//!
//! Side effects (notifications, ticket assignment, webhooks) and time are
//! injected through [`Effects`], so the runtime has no network or storage
//! dependency of its own.

mod action;
mod condition;
mod context;
mod effects;
mod error;
mod events;
mod result;
mod rules;
mod runtime;
mod trigger;

pub use context::RunContext;
pub use effects::{
  Assignment, Clock, DeliveryReceipt, Effects, LoggingDispatcher, LoggingTicketMutator,
  Notification, NotificationDispatcher, SimulatedWebhookCaller, SystemClock, TicketMutator,
  WebhookCaller, WebhookRequest, WebhookResponse,
};
pub use error::{EffectError, NodeError};
pub use events::{ChannelNotifier, ExecutionEvent, ExecutionNotifier, NoopNotifier};
pub use result::{
  InvokeResult, LogEntry, LogLevel, NodeResult, NodeStatus, RunOutput, RunStatus, Termination,
};
pub use rules::{evaluate_rule, evaluate_rules};
pub use runtime::Runtime;
