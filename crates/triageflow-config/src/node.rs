use serde::{Deserialize, Serialize};

use crate::action::ActionConfig;
use crate::edge::GuardStatus;
use crate::rule::Rule;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
  pub id: String,
  /// Human-stable identifier. May repeat `id`.
  pub key: String,
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(flatten)]
  pub kind: NodeKind,
  /// Editor canvas position. Carried through, never interpreted.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub position: Option<Position>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
  pub x: f64,
  pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
  /// Entry gate: passes when every filter matches the input record.
  Trigger {
    variant: TriggerVariant,
    config: TriggerConfig,
  },
  Condition {
    variant: ConditionVariant,
    config: ConditionConfig,
  },
  Action {
    variant: ActionVariant,
    config: ActionConfig,
  },
}

impl NodeKind {
  pub fn type_name(&self) -> &'static str {
    match self {
      NodeKind::Trigger { .. } => "trigger",
      NodeKind::Condition { .. } => "condition",
      NodeKind::Action { .. } => "action",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerVariant {
  TicketCreated,
  SlaBreach,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionVariant {
  PriorityCheck,
  SentimentCheck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionVariant {
  SendEmail,
  NotifySlack,
  AssignOwner,
  CallWebhook,
}

impl ActionVariant {
  pub fn as_str(&self) -> &'static str {
    match self {
      ActionVariant::SendEmail => "send_email",
      ActionVariant::NotifySlack => "notify_slack",
      ActionVariant::AssignOwner => "assign_owner",
      ActionVariant::CallWebhook => "call_webhook",
    }
  }

  /// The `actionType` this variant must be configured with.
  pub fn expected_action_kind(&self) -> &'static str {
    match self {
      ActionVariant::SendEmail | ActionVariant::NotifySlack => "notify",
      ActionVariant::AssignOwner => "assign",
      ActionVariant::CallWebhook => "webhook",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
  pub resource: String,
  pub event: String,
  #[serde(default)]
  pub filters: Vec<Rule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Logic {
  And,
  Or,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionConfig {
  pub logic: Logic,
  /// Outcome used when `rules` is empty.
  pub default_outcome: GuardStatus,
  #[serde(default)]
  pub rules: Vec<Rule>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::rule::{Operator, RuleSource};
  use serde_json::json;

  #[test]
  fn test_parse_trigger_node() {
    let node: NodeDef = serde_json::from_value(json!({
      "id": "trigger-1",
      "key": "trigger-1",
      "type": "trigger",
      "variant": "ticket_created",
      "name": "Ticket Created",
      "config": {
        "resource": "tickets",
        "event": "created",
        "filters": [{ "field": "priority", "operator": "greater_than", "value": "0" }]
      }
    }))
    .unwrap();

    assert_eq!(node.description, "");
    assert_eq!(node.kind.type_name(), "trigger");
    let NodeKind::Trigger { variant, config } = node.kind else {
      panic!("expected trigger");
    };
    assert_eq!(variant, TriggerVariant::TicketCreated);
    assert_eq!(config.filters.len(), 1);
    assert_eq!(config.filters[0].operator, Operator::GreaterThan);
  }

  #[test]
  fn test_parse_condition_node() {
    let node: NodeDef = serde_json::from_value(json!({
      "id": "condition-1",
      "key": "condition-1",
      "type": "condition",
      "variant": "priority_check",
      "name": "Priority Check",
      "description": "",
      "config": {
        "logic": "OR",
        "defaultOutcome": "failure",
        "rules": [
          { "source": "input", "field": "priority", "operator": "greater_than", "value": 3 }
        ]
      },
      "position": { "x": 120.0, "y": 40.0 }
    }))
    .unwrap();

    let NodeKind::Condition { config, .. } = &node.kind else {
      panic!("expected condition");
    };
    assert_eq!(config.logic, Logic::Or);
    assert_eq!(config.default_outcome, GuardStatus::Failure);
    assert_eq!(config.rules[0].source, RuleSource::Input);
    assert_eq!(node.position, Some(Position { x: 120.0, y: 40.0 }));
  }

  #[test]
  fn test_unknown_variant_rejected() {
    let result: Result<NodeDef, _> = serde_json::from_value(json!({
      "id": "a",
      "key": "a",
      "type": "action",
      "variant": "send_fax",
      "name": "Fax",
      "config": { "actionType": "assign", "queue": "q" }
    }));
    assert!(result.is_err());
  }

  #[test]
  fn test_expected_action_kind() {
    assert_eq!(ActionVariant::SendEmail.expected_action_kind(), "notify");
    assert_eq!(ActionVariant::NotifySlack.expected_action_kind(), "notify");
    assert_eq!(ActionVariant::AssignOwner.expected_action_kind(), "assign");
    assert_eq!(ActionVariant::CallWebhook.expected_action_kind(), "webhook");
  }
}
