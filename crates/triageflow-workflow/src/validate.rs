use std::collections::{HashMap, HashSet};

use tracing::debug;
use triageflow_config::{ActionConfig, NodeDef, NodeKind, Rule, RuleSource, WorkflowDef};

use crate::error::ValidationError;
use crate::graph::Graph;
use crate::workflow::Workflow;

/// Validate a workflow definition and build its executable form.
///
/// Checks, in order:
/// 1. The definition has at least one node
/// 2. Node ids (and edge ids) are unique
/// 3. Every edge endpoint references a known node
/// 4. The edge graph has no cycle
/// 5. Each node's configuration is consistent with its variant
///
/// No executor is involved; validation has no side effects.
pub fn validate(def: &WorkflowDef) -> Result<Workflow, ValidationError> {
  if def.nodes.is_empty() {
    return Err(ValidationError::NoNodes);
  }

  let index = index_nodes(&def.nodes)?;
  let endpoints = resolve_edges(def, &index)?;
  let graph = Graph::new(def.nodes.len(), endpoints);

  if let Some(cycle) = graph.find_cycle() {
    let path = cycle
      .into_iter()
      .map(|idx| def.nodes[idx].id.clone())
      .collect();
    return Err(ValidationError::Cycle { path });
  }

  for node in &def.nodes {
    validate_node(node, &index)?;
  }

  debug!(
    workflow = %def.metadata.name,
    revision = def.metadata.revision,
    nodes = def.nodes.len(),
    edges = def.edges.len(),
    entry_points = graph.entry_points().len(),
    "workflow validated"
  );

  Ok(Workflow::new(def.clone(), index, graph))
}

/// Map node ids to their definition positions, rejecting duplicates.
fn index_nodes(nodes: &[NodeDef]) -> Result<HashMap<String, usize>, ValidationError> {
  let mut index = HashMap::with_capacity(nodes.len());
  for (idx, node) in nodes.iter().enumerate() {
    if node.id.trim().is_empty() {
      return Err(ValidationError::InvalidNode {
        node_id: node.id.clone(),
        message: "node id must not be empty".to_string(),
      });
    }
    if index.insert(node.id.clone(), idx).is_some() {
      return Err(ValidationError::DuplicateNodeId {
        node_id: node.id.clone(),
      });
    }
  }
  Ok(index)
}

/// Resolve every edge to (source, target) node indices.
fn resolve_edges(
  def: &WorkflowDef,
  index: &HashMap<String, usize>,
) -> Result<Vec<(usize, usize)>, ValidationError> {
  let mut edge_ids = HashSet::with_capacity(def.edges.len());
  for edge in &def.edges {
    if !edge_ids.insert(edge.id.as_str()) {
      return Err(ValidationError::DuplicateEdgeId {
        edge_id: edge.id.clone(),
      });
    }
  }

  def
    .edges
    .iter()
    .map(|edge| {
      let lookup = |node_id: &String| {
        index
          .get(node_id)
          .copied()
          .ok_or_else(|| ValidationError::InvalidEdge {
            edge_id: edge.id.clone(),
            node_id: node_id.clone(),
          })
      };
      Ok((lookup(&edge.source_id)?, lookup(&edge.target_id)?))
    })
    .collect()
}

fn validate_node(node: &NodeDef, index: &HashMap<String, usize>) -> Result<(), ValidationError> {
  let invalid = |message: &str| ValidationError::InvalidNode {
    node_id: node.id.clone(),
    message: message.to_string(),
  };

  if node.key.trim().is_empty() {
    return Err(invalid("key must not be empty"));
  }
  if node.name.trim().is_empty() {
    return Err(invalid("name must not be empty"));
  }

  match &node.kind {
    NodeKind::Trigger { config, .. } => {
      if config.resource.trim().is_empty() || config.event.trim().is_empty() {
        return Err(invalid("trigger resource and event must not be empty"));
      }
      validate_rules(node, &config.filters, index)
    }
    NodeKind::Condition { config, .. } => validate_rules(node, &config.rules, index),
    NodeKind::Action { variant, config } => {
      let expected = variant.expected_action_kind();
      if config.kind() != expected {
        return Err(ValidationError::ActionMismatch {
          node_id: node.id.clone(),
          variant: variant.as_str().to_string(),
          expected: expected.to_string(),
          actual: config.kind().to_string(),
        });
      }

      match config {
        ActionConfig::Notify(notify) => {
          if notify.template.trim().is_empty() {
            return Err(invalid("notify template must not be empty"));
          }
          if notify.recipients.is_empty() {
            return Err(invalid("notify action needs at least one recipient"));
          }
          if notify.recipients.iter().any(|r| r.trim().is_empty()) {
            return Err(invalid("notify recipients must not be empty"));
          }
        }
        ActionConfig::Assign(assign) => {
          if assign.queue.trim().is_empty() {
            return Err(invalid("assign queue must not be empty"));
          }
        }
        ActionConfig::Webhook(webhook) => {
          if !(webhook.url.starts_with("http://") || webhook.url.starts_with("https://")) {
            return Err(invalid("webhook url must be an http(s) url"));
          }
          if webhook.body_template.trim().is_empty() {
            return Err(invalid("webhook body template must not be empty"));
          }
          if webhook.headers.iter().any(|h| h.key.trim().is_empty()) {
            return Err(invalid("webhook header keys must not be empty"));
          }
        }
      }
      Ok(())
    }
  }
}

fn validate_rules(
  node: &NodeDef,
  rules: &[Rule],
  index: &HashMap<String, usize>,
) -> Result<(), ValidationError> {
  for rule in rules {
    if rule.field.trim().is_empty() {
      return Err(ValidationError::InvalidNode {
        node_id: node.id.clone(),
        message: "rule field must not be empty".to_string(),
      });
    }
    if rule.source == RuleSource::Context {
      let referenced = rule.field.split('.').find(|s| !s.is_empty()).unwrap_or("");
      if !index.contains_key(referenced) {
        return Err(ValidationError::UnknownRuleNode {
          node_id: node.id.clone(),
          referenced: referenced.to_string(),
        });
      }
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use triageflow_config::{Edge, GuardStatus};

  fn definition(nodes: serde_json::Value, edges: serde_json::Value) -> WorkflowDef {
    serde_json::from_value(json!({
      "metadata": { "name": "Test", "status": "draft", "organizationId": "org-1" },
      "nodes": nodes,
      "edges": edges,
    }))
    .unwrap()
  }

  fn trigger(id: &str) -> serde_json::Value {
    json!({
      "id": id, "key": id, "type": "trigger", "variant": "ticket_created", "name": id,
      "config": { "resource": "tickets", "event": "created", "filters": [] }
    })
  }

  fn email(id: &str) -> serde_json::Value {
    json!({
      "id": id, "key": id, "type": "action", "variant": "send_email", "name": id,
      "config": {
        "actionType": "notify", "channel": "email",
        "template": "hello", "recipients": ["ops@example.com"]
      }
    })
  }

  fn edge(id: &str, from: &str, to: &str) -> serde_json::Value {
    serde_json::to_value(Edge::always(id, from, to)).unwrap()
  }

  #[test]
  fn test_validate_simple_workflow() {
    let def = definition(
      json!([trigger("t"), email("a"), email("b")]),
      json!([edge("e1", "t", "a"), edge("e2", "t", "b")]),
    );

    let workflow = validate(&def).unwrap();

    assert_eq!(workflow.nodes().len(), 3);
    assert_eq!(workflow.index_of("b"), Some(2));
    assert_eq!(
      workflow.entry_nodes().map(|n| n.id.as_str()).collect::<Vec<_>>(),
      vec!["t"]
    );
    assert_eq!(workflow.graph().outgoing(0), &[0, 1]);
  }

  #[test]
  fn test_multiple_entry_points_in_definition_order() {
    let def = definition(json!([email("z"), trigger("t")]), json!([]));
    let workflow = validate(&def).unwrap();
    assert_eq!(workflow.graph().entry_points(), &[0, 1]);
  }

  #[test]
  fn test_validate_long_chain() {
    let ids: Vec<String> = (0..100_000).map(|i| format!("n{}", i)).collect();
    let nodes: Vec<serde_json::Value> = ids
      .iter()
      .map(|id| {
        json!({
          "id": id, "key": id, "type": "action", "variant": "assign_owner", "name": id,
          "config": { "actionType": "assign", "queue": "standard" }
        })
      })
      .collect();
    let edges: Vec<serde_json::Value> = ids
      .windows(2)
      .enumerate()
      .map(|(i, pair)| edge(&format!("e{}", i), &pair[0], &pair[1]))
      .collect();

    let workflow = validate(&definition(json!(nodes), json!(edges))).unwrap();

    assert_eq!(workflow.nodes().len(), 100_000);
    assert_eq!(workflow.graph().entry_points(), &[0]);
  }

  #[test]
  fn test_fails_on_empty_definition() {
    let def = definition(json!([]), json!([]));
    assert_eq!(validate(&def).unwrap_err(), ValidationError::NoNodes);
  }

  #[test]
  fn test_fails_on_duplicate_node_id() {
    let def = definition(json!([trigger("t"), email("t")]), json!([]));
    assert!(matches!(
      validate(&def),
      Err(ValidationError::DuplicateNodeId { node_id }) if node_id == "t"
    ));
  }

  #[test]
  fn test_fails_on_duplicate_edge_id() {
    let def = definition(
      json!([trigger("t"), email("a"), email("b")]),
      json!([edge("e1", "t", "a"), edge("e1", "t", "b")]),
    );
    assert!(matches!(
      validate(&def),
      Err(ValidationError::DuplicateEdgeId { .. })
    ));
  }

  #[test]
  fn test_fails_on_dangling_edge() {
    let def = definition(
      json!([trigger("t")]),
      json!([edge("e1", "t", "nonexistent")]),
    );
    assert_eq!(
      validate(&def).unwrap_err(),
      ValidationError::InvalidEdge {
        edge_id: "e1".to_string(),
        node_id: "nonexistent".to_string(),
      }
    );
  }

  #[test]
  fn test_fails_on_cycle() {
    let def = definition(
      json!([trigger("node-a"), email("node-b")]),
      json!([edge("edge-a", "node-a", "node-b"), edge("edge-b", "node-b", "node-a")]),
    );

    let err = validate(&def).unwrap_err();
    assert!(err.is_cycle());
    let message = err.to_string();
    assert!(message.contains("cycle"));
    assert!(message.contains("node-a -> node-b -> node-a"));
  }

  #[test]
  fn test_duplicate_id_reported_before_cycle() {
    let def = definition(
      json!([trigger("a"), email("a")]),
      json!([edge("e1", "a", "a")]),
    );
    assert!(matches!(
      validate(&def),
      Err(ValidationError::DuplicateNodeId { .. })
    ));
  }

  #[test]
  fn test_fails_on_action_mismatch() {
    let def = definition(
      json!([{
        "id": "a", "key": "a", "type": "action", "variant": "send_email", "name": "a",
        "config": { "actionType": "assign", "queue": "standard" }
      }]),
      json!([]),
    );
    assert!(matches!(
      validate(&def),
      Err(ValidationError::ActionMismatch { expected, actual, .. })
        if expected == "notify" && actual == "assign"
    ));
  }

  #[test]
  fn test_fails_on_notify_without_recipients() {
    let def = definition(
      json!([{
        "id": "a", "key": "a", "type": "action", "variant": "notify_slack", "name": "a",
        "config": { "actionType": "notify", "channel": "slack", "template": "t", "recipients": [] }
      }]),
      json!([]),
    );
    assert!(matches!(
      validate(&def),
      Err(ValidationError::InvalidNode { .. })
    ));
  }

  #[test]
  fn test_fails_on_bad_webhook_url() {
    let def = definition(
      json!([{
        "id": "w", "key": "w", "type": "action", "variant": "call_webhook", "name": "w",
        "config": {
          "actionType": "webhook", "url": "ftp://example.com", "method": "PUT",
          "headers": [], "bodyTemplate": "{}"
        }
      }]),
      json!([]),
    );
    assert!(matches!(
      validate(&def),
      Err(ValidationError::InvalidNode { node_id, .. }) if node_id == "w"
    ));
  }

  #[test]
  fn test_context_rule_must_reference_known_node() {
    let condition = |field: &str| {
      json!({
        "id": "c", "key": "c", "type": "condition", "variant": "sentiment_check", "name": "c",
        "config": {
          "logic": "AND", "defaultOutcome": "success",
          "rules": [{ "source": "context", "field": field, "operator": "exists" }]
        }
      })
    };

    let def = definition(
      json!([trigger("t"), condition("ghost.result")]),
      json!([edge("e1", "t", "c")]),
    );
    assert_eq!(
      validate(&def).unwrap_err(),
      ValidationError::UnknownRuleNode {
        node_id: "c".to_string(),
        referenced: "ghost".to_string(),
      }
    );

    let def = definition(
      json!([trigger("t"), condition("t.event")]),
      json!([edge("e1", "t", "c")]),
    );
    assert!(validate(&def).is_ok());
  }

  #[test]
  fn test_status_guard_edges_validate() {
    let mut def = definition(json!([trigger("t"), email("a")]), json!([]));
    def
      .edges
      .push(Edge::on_status("e1", "t", "a", GuardStatus::Failure));
    assert!(validate(&def).is_ok());
  }
}
