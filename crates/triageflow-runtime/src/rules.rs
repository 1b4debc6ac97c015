//! Rule evaluation for trigger filters and condition nodes.
//!
//! Comparison semantics:
//! - `greater_than` / `less_than` coerce both sides to numbers (JSON numbers,
//!   numeric strings, booleans as 1/0). Anything non-numeric compares false.
//! - `equals` / `not_equals` compare numerically when both sides are JSON
//!   numbers and as normalized strings otherwise (`null` becomes `""`).
//! - `contains` is substring match on strings, or element match on arrays.
//! - `exists` is true when the path is present, even if its value is `null`.
//!
//! A missing field fails every operator except `not_equals`.

use serde_json::Value;
use triageflow_config::{Logic, Operator, Rule};

use crate::context::RunContext;

/// Combine rule outcomes with `logic`. An empty rule list yields
/// `default_outcome` instead of a vacuous AND/OR.
pub fn evaluate_rules(rules: &[Rule], logic: Logic, default_outcome: bool, ctx: &RunContext) -> bool {
  if rules.is_empty() {
    return default_outcome;
  }

  match logic {
    Logic::And => rules.iter().all(|rule| evaluate_rule(rule, ctx)),
    Logic::Or => rules.iter().any(|rule| evaluate_rule(rule, ctx)),
  }
}

/// Evaluate a single rule against the run context.
pub fn evaluate_rule(rule: &Rule, ctx: &RunContext) -> bool {
  let actual = rule.field_ref().and_then(|field| ctx.lookup(&field));

  let Some(actual) = actual else {
    return rule.operator == Operator::NotEquals;
  };

  match rule.operator {
    Operator::Exists => true,
    Operator::Equals => values_equal(actual, &rule.value),
    Operator::NotEquals => !values_equal(actual, &rule.value),
    Operator::Contains => contains(actual, &rule.value),
    Operator::GreaterThan => compare_numbers(actual, &rule.value, |a, b| a > b),
    Operator::LessThan => compare_numbers(actual, &rule.value, |a, b| a < b),
  }
}

fn compare_numbers(actual: &Value, expected: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
  match (to_number(actual), to_number(expected)) {
    (Some(a), Some(b)) => cmp(a, b),
    _ => false,
  }
}

fn to_number(value: &Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => {
      let trimmed = s.trim();
      if trimmed.is_empty() {
        return None;
      }
      trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
    }
    Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
    _ => None,
  }
}

fn values_equal(actual: &Value, expected: &Value) -> bool {
  match (actual, expected) {
    (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
    _ => normalize(actual) == normalize(expected),
  }
}

fn contains(actual: &Value, expected: &Value) -> bool {
  match actual {
    Value::String(s) => s.contains(normalize(expected).as_str()),
    Value::Array(items) => items.iter().any(|item| values_equal(item, expected)),
    _ => false,
  }
}

fn normalize(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}
