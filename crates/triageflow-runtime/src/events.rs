//! Execution events and notifiers for observability.
//!
//! Events are emitted while a run executes so consumers can stream progress
//! or persist run history. The per-run audit log in the result is separate
//! and always produced.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::result::NodeStatus;

/// Events emitted during workflow execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionEvent {
  /// A run has started.
  WorkflowStarted {
    run_id: String,
    workflow: String,
    revision: u32,
  },

  /// A node has been dequeued and its executor is about to run.
  NodeStarted { run_id: String, node_id: String },

  /// A node's executor returned an outcome (success or failure).
  NodeCompleted {
    run_id: String,
    node_id: String,
    status: NodeStatus,
  },

  /// A node's executor raised an error.
  NodeFailed {
    run_id: String,
    node_id: String,
    error: String,
    fatal: bool,
  },

  /// A node was finalized without executing.
  NodeSkipped {
    run_id: String,
    node_id: String,
    reason: String,
  },

  /// The run finished with status succeeded.
  WorkflowCompleted { run_id: String },

  /// The run finished with status failed.
  WorkflowFailed { run_id: String, error: String },
}

/// Trait for receiving execution events.
///
/// The runtime calls `notify` for each event; implementations decide what to
/// do with them.
pub trait ExecutionNotifier: Send + Sync {
  fn notify(&self, event: ExecutionEvent);
}

/// A notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {}
}

/// A notifier that sends events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  // NOTE: unbounded so a slow consumer never stalls a run. Volume is a
  // handful of events per node.
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
    Self { sender }
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // Receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
