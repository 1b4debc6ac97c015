//! Condition node execution.

use serde_json::{Value, json};
use triageflow_config::{ConditionConfig, GuardStatus, Logic};

use crate::context::RunContext;
use crate::result::{LogLevel, NodeOutcome};
use crate::rules::{evaluate_rule, evaluate_rules};

/// Evaluate the condition's rules with its configured logic. No side effects
/// beyond the audit log.
pub(crate) fn execute(node_id: &str, config: &ConditionConfig, ctx: &mut RunContext) -> NodeOutcome {
  let default_outcome = config.default_outcome == GuardStatus::Success;
  let result = evaluate_rules(&config.rules, config.logic, default_outcome, ctx);
  let evaluated: Vec<Value> = config
    .rules
    .iter()
    .map(|rule| Value::Bool(evaluate_rule(rule, ctx)))
    .collect();

  let status = if result {
    GuardStatus::Success
  } else {
    GuardStatus::Failure
  };

  ctx.log(
    LogLevel::Info,
    format!("Condition evaluated as {}", status),
    Some(node_id),
  );

  let logic = match config.logic {
    Logic::And => "AND",
    Logic::Or => "OR",
  };

  NodeOutcome {
    status,
    output: json!({
      "result": result,
      "evaluatedRules": evaluated,
    }),
    notes: format!("Logic {} with {} rule(s)", logic, config.rules.len()),
  }
}
