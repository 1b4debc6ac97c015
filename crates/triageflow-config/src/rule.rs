//! Field/operator/value rules used by trigger filters and condition nodes.

use serde::{Deserialize, Serialize};

/// Where a rule reads its field from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSource {
  /// The input record the run was started with.
  #[default]
  Input,
  /// The output of a node that already executed in this run. The first
  /// segment of the field path names the node.
  Context,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
  Equals,
  NotEquals,
  GreaterThan,
  LessThan,
  Contains,
  Exists,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
  #[serde(default)]
  pub source: RuleSource,
  pub field: String,
  pub operator: Operator,
  /// Comparison value. Ignored by `exists`.
  #[serde(default)]
  pub value: serde_json::Value,
}

/// A rule's field resolved to an explicit lookup location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRef<'a> {
  Input { path: Vec<&'a str> },
  NodeOutput { node_id: &'a str, path: Vec<&'a str> },
}

impl Rule {
  pub fn new(field: impl Into<String>, operator: Operator, value: serde_json::Value) -> Self {
    Self {
      source: RuleSource::Input,
      field: field.into(),
      operator,
      value,
    }
  }

  /// Read the field from a prior node's output instead of the input record.
  pub fn from_context(mut self) -> Self {
    self.source = RuleSource::Context;
    self
  }

  /// Split the dotted field path according to the rule's source.
  ///
  /// Returns `None` for a context rule with an empty path, since there is
  /// no node to look up.
  pub fn field_ref(&self) -> Option<FieldRef<'_>> {
    let mut segments = self.field.split('.').filter(|s| !s.is_empty());
    match self.source {
      RuleSource::Input => Some(FieldRef::Input {
        path: segments.collect(),
      }),
      RuleSource::Context => {
        let node_id = segments.next()?;
        Some(FieldRef::NodeOutput {
          node_id,
          path: segments.collect(),
        })
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_input_field_ref() {
    let rule = Rule::new("customer.tier", Operator::Equals, json!("gold"));
    assert_eq!(
      rule.field_ref(),
      Some(FieldRef::Input {
        path: vec!["customer", "tier"]
      })
    );
  }

  #[test]
  fn test_context_field_ref_splits_node_id() {
    let rule = Rule::new("condition-1.result", Operator::Equals, json!(true)).from_context();
    assert_eq!(
      rule.field_ref(),
      Some(FieldRef::NodeOutput {
        node_id: "condition-1",
        path: vec!["result"]
      })
    );
  }

  #[test]
  fn test_context_field_ref_without_path() {
    let rule = Rule::new("", Operator::Exists, serde_json::Value::Null).from_context();
    assert_eq!(rule.field_ref(), None);
  }

  #[test]
  fn test_rule_defaults_to_input_source() {
    let rule: Rule = serde_json::from_value(json!({
      "field": "priority",
      "operator": "greater_than",
      "value": "3"
    }))
    .unwrap();

    assert_eq!(rule.source, RuleSource::Input);
    assert_eq!(rule.operator, Operator::GreaterThan);
    assert_eq!(rule.value, json!("3"));
  }

  #[test]
  fn test_exists_rule_without_value() {
    let rule: Rule = serde_json::from_value(json!({
      "source": "context",
      "field": "trigger-1.event",
      "operator": "exists"
    }))
    .unwrap();

    assert_eq!(rule.source, RuleSource::Context);
    assert!(rule.value.is_null());
  }
}
