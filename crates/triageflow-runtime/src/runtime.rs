//! Workflow runtime.
//!
//! The [`Runtime`] walks a validated [`Workflow`] one node at a time:
//!
//! 1. Seed a FIFO queue with the entry nodes (no incoming edges).
//! 2. Dequeue a node, check cancellation and the deadline, run its executor
//!    and record the result.
//! 3. Enqueue the target of every outgoing edge whose guard is satisfied,
//!    unless the target is already resolved or queued.
//! 4. When the queue drains (or the run terminates early), every node that
//!    never ran is finalized as skipped.
//!
//! A node therefore executes at most once no matter how many incoming edges
//! are satisfied.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};
use triageflow_config::{Guard, NodeDef, NodeKind};
use triageflow_workflow::Workflow;

use crate::action::ActionExecutor;
use crate::context::RunContext;
use crate::effects::Effects;
use crate::error::NodeError;
use crate::events::{ExecutionEvent, ExecutionNotifier, NoopNotifier};
use crate::result::{
  InvokeResult, LogLevel, NodeOutcome, NodeResult, NodeStatus, RunOutput, RunStatus, Termination,
  elapsed_ms,
};
use crate::{condition, trigger};

/// The workflow runtime.
///
/// Holds the effect collaborators and an event notifier. Stateless between
/// runs, so one runtime can serve any number of concurrent invocations.
#[derive(Clone)]
pub struct Runtime {
  effects: Effects,
  notifier: Arc<dyn ExecutionNotifier>,
}

impl Runtime {
  pub fn new(effects: Effects) -> Self {
    Self {
      effects,
      notifier: Arc::new(NoopNotifier),
    }
  }

  /// Emit execution events to `notifier`.
  pub fn with_notifier(mut self, notifier: Arc<dyn ExecutionNotifier>) -> Self {
    self.notifier = notifier;
    self
  }

  /// Execute the workflow against one input record.
  ///
  /// Never fails: node errors, fatal errors, deadline exhaustion and
  /// cancellation are all encoded in the returned result. The run is
  /// `failed` only when it terminated early.
  #[instrument(
    name = "runtime_invoke",
    skip_all,
    fields(
      workflow = %workflow.metadata().name,
      revision = workflow.metadata().revision,
    )
  )]
  pub async fn invoke(
    &self,
    workflow: &Workflow,
    input: Value,
    max_execution_ms: u64,
    cancel: CancellationToken,
  ) -> InvokeResult {
    let run_id = uuid::Uuid::new_v4().to_string();
    let clock = Arc::clone(&self.effects.clock);
    let started_at = clock.now();

    info!(run_id = %run_id, max_execution_ms, "workflow_started");
    self.notifier.notify(ExecutionEvent::WorkflowStarted {
      run_id: run_id.clone(),
      workflow: workflow.metadata().name.clone(),
      revision: workflow.metadata().revision,
    });

    let mut run = RunState::new(workflow, RunContext::new(input, Arc::clone(&clock)));

    while let Some(idx) = run.queue.pop_front() {
      if cancel.is_cancelled() {
        warn!(run_id = %run_id, "workflow cancelled");
        run.terminate(Termination::Cancelled);
        break;
      }

      let elapsed = elapsed_ms(started_at, clock.now());
      if elapsed >= max_execution_ms {
        warn!(run_id = %run_id, elapsed_ms = elapsed, "execution deadline exceeded");
        run.terminate(Termination::DeadlineExceeded {
          elapsed_ms: elapsed,
          max_execution_ms,
        });
        break;
      }

      let Some(node) = workflow.node(idx) else {
        continue;
      };

      self.notifier.notify(ExecutionEvent::NodeStarted {
        run_id: run_id.clone(),
        node_id: node.id.clone(),
      });

      let node_started = clock.now();
      let outcome = self.execute_node(node, &mut run.ctx).await;
      let node_finished = clock.now();

      let status = match outcome {
        Ok(outcome) => {
          self.record_outcome(&run_id, node, outcome, &mut run, node_started, node_finished)
        }
        Err(e) => {
          let fatal = e.is_fatal();
          self.record_error(&run_id, node, &e, &mut run, node_started, node_finished);
          if fatal {
            error!(run_id = %run_id, node_id = %node.id, error = %e, "fatal node error");
            run.terminate(Termination::Fatal {
              node_id: node.id.clone(),
              error: e.to_string(),
            });
            break;
          }
          NodeStatus::Failure
        }
      };

      run.enqueue_satisfied(idx, status);
    }

    run.finalize_skipped(&run_id, &*self.notifier, clock.now());

    let finished_at = clock.now();
    self.finish(run_id, run, started_at, finished_at)
  }

  async fn execute_node(
    &self,
    node: &NodeDef,
    ctx: &mut RunContext,
  ) -> Result<NodeOutcome, NodeError> {
    match &node.kind {
      NodeKind::Trigger { config, .. } => Ok(trigger::execute(&node.id, config, ctx)),
      NodeKind::Condition { config, .. } => Ok(condition::execute(&node.id, config, ctx)),
      NodeKind::Action { config, .. } => {
        ActionExecutor::new(&self.effects)
          .execute(&node.id, config, ctx)
          .await
      }
    }
  }

  fn record_outcome(
    &self,
    run_id: &str,
    node: &NodeDef,
    outcome: NodeOutcome,
    run: &mut RunState<'_>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
  ) -> NodeStatus {
    let status = NodeStatus::from(outcome.status);
    info!(run_id = %run_id, node_id = %node.id, status = ?status, "node_completed");

    run.ctx.record_output(&node.id, outcome.output.clone());
    run.resolve(
      node,
      NodeResult {
        node_id: node.id.clone(),
        status,
        output: Some(outcome.output),
        error: None,
        notes: outcome.notes,
        started_at,
        finished_at,
        duration_ms: elapsed_ms(started_at, finished_at),
      },
    );

    self.notifier.notify(ExecutionEvent::NodeCompleted {
      run_id: run_id.to_string(),
      node_id: node.id.clone(),
      status,
    });

    status
  }

  fn record_error(
    &self,
    run_id: &str,
    node: &NodeDef,
    e: &NodeError,
    run: &mut RunState<'_>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
  ) {
    let fatal = e.is_fatal();
    warn!(run_id = %run_id, node_id = %node.id, error = %e, fatal, "node_failed");

    run.ctx.log(
      LogLevel::Error,
      format!("Node {} failed: {}", node.id, e),
      Some(node.id.as_str()),
    );
    run.resolve(
      node,
      NodeResult {
        node_id: node.id.clone(),
        status: NodeStatus::Failure,
        output: None,
        error: Some(e.to_string()),
        notes: if fatal {
          "Fatal error, run aborted".to_string()
        } else {
          "Action failed, error captured".to_string()
        },
        started_at,
        finished_at,
        duration_ms: elapsed_ms(started_at, finished_at),
      },
    );

    self.notifier.notify(ExecutionEvent::NodeFailed {
      run_id: run_id.to_string(),
      node_id: node.id.clone(),
      error: e.to_string(),
      fatal,
    });
  }

  fn finish(
    &self,
    run_id: String,
    run: RunState<'_>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
  ) -> InvokeResult {
    let RunState {
      mut ctx,
      results,
      executed,
      termination,
      ..
    } = run;

    let status = match &termination {
      Some(reason) => {
        ctx.log(LogLevel::Error, format!("Run failed: {}", reason), None);
        error!(run_id = %run_id, reason = %reason, "workflow_failed");
        self.notifier.notify(ExecutionEvent::WorkflowFailed {
          run_id: run_id.clone(),
          error: reason.to_string(),
        });
        RunStatus::Failed
      }
      None => {
        ctx.log(
          LogLevel::Info,
          format!("Run completed after {} node(s)", executed.len()),
          None,
        );
        info!(run_id = %run_id, executed = executed.len(), "workflow_completed");
        self.notifier.notify(ExecutionEvent::WorkflowCompleted {
          run_id: run_id.clone(),
        });
        RunStatus::Succeeded
      }
    };

    let (context, state, logs) = ctx.into_parts();

    InvokeResult {
      run_id,
      status,
      started_at,
      finished_at,
      duration_ms: elapsed_ms(started_at, finished_at),
      node_results: results,
      logs,
      output: RunOutput {
        context,
        state,
        executed_nodes: executed,
      },
      termination,
    }
  }
}

/// Mutable bookkeeping for one run.
struct RunState<'w> {
  workflow: &'w Workflow,
  ctx: RunContext,
  queue: VecDeque<usize>,
  /// Nodes that have ever been queued. Never cleared, so nothing is queued
  /// twice.
  queued: Vec<bool>,
  resolved: Vec<bool>,
  results: BTreeMap<String, NodeResult>,
  executed: Vec<String>,
  termination: Option<Termination>,
}

impl<'w> RunState<'w> {
  fn new(workflow: &'w Workflow, ctx: RunContext) -> Self {
    let node_count = workflow.graph().node_count();
    let mut queued = vec![false; node_count];
    let mut queue = VecDeque::new();
    for &idx in workflow.graph().entry_points() {
      queued[idx] = true;
      queue.push_back(idx);
    }

    Self {
      workflow,
      ctx,
      queue,
      queued,
      resolved: vec![false; node_count],
      results: BTreeMap::new(),
      executed: Vec::new(),
      termination: None,
    }
  }

  fn resolve(&mut self, node: &NodeDef, result: NodeResult) {
    if let Some(idx) = self.workflow.index_of(&node.id) {
      self.resolved[idx] = true;
    }
    self.executed.push(node.id.clone());
    self.results.insert(node.id.clone(), result);
  }

  fn terminate(&mut self, reason: Termination) {
    self.termination = Some(reason);
  }

  /// Queue the targets of `source`'s outgoing edges whose guard accepts
  /// `status`.
  fn enqueue_satisfied(&mut self, source: usize, status: NodeStatus) {
    let graph = self.workflow.graph();
    for &edge_idx in graph.outgoing(source) {
      let (Some(edge), Some((_, target))) =
        (self.workflow.edge(edge_idx), graph.endpoints(edge_idx))
      else {
        continue;
      };

      let satisfied = match &edge.guard {
        Guard::Always => status != NodeStatus::Skipped,
        Guard::Status { status: expected } => status.as_guard() == Some(*expected),
      };

      if satisfied && !self.resolved[target] && !self.queued[target] {
        self.queued[target] = true;
        self.queue.push_back(target);
      }
    }
  }

  /// Mark every node that never ran as skipped.
  fn finalize_skipped(
    &mut self,
    run_id: &str,
    notifier: &dyn ExecutionNotifier,
    at: DateTime<Utc>,
  ) {
    let reason = self
      .termination
      .as_ref()
      .map(Termination::skip_reason)
      .unwrap_or("no satisfied incoming edge");

    for (idx, node) in self.workflow.nodes().iter().enumerate() {
      if self.resolved[idx] {
        continue;
      }
      self
        .results
        .insert(node.id.clone(), NodeResult::skipped(&node.id, reason, at));
      notifier.notify(ExecutionEvent::NodeSkipped {
        run_id: run_id.to_string(),
        node_id: node.id.clone(),
        reason: reason.to_string(),
      });
    }
  }
}
