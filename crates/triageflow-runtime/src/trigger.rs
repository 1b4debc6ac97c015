//! Trigger node execution.

use serde_json::json;
use triageflow_config::{GuardStatus, Logic, TriggerConfig};

use crate::context::RunContext;
use crate::result::{LogLevel, NodeOutcome};
use crate::rules::evaluate_rules;

/// Gate the run on the trigger's filters. Every filter must match the input
/// record; a trigger without filters always passes.
///
/// A failing trigger does not abort the run. Its outgoing edge guards decide
/// what happens next.
pub(crate) fn execute(node_id: &str, config: &TriggerConfig, ctx: &mut RunContext) -> NodeOutcome {
  let passed = evaluate_rules(&config.filters, Logic::And, true, ctx);
  let status = if passed {
    GuardStatus::Success
  } else {
    GuardStatus::Failure
  };

  ctx.log(
    LogLevel::Info,
    format!(
      "Trigger {}.{} evaluated to {}",
      config.resource, config.event, status
    ),
    Some(node_id),
  );

  NodeOutcome {
    status,
    output: json!({
      "event": {
        "resource": config.resource,
        "event": config.event,
        "input": ctx.input(),
      }
    }),
    notes: if passed {
      "Event filters satisfied".to_string()
    } else {
      "Event filters blocked execution".to_string()
    },
  }
}
