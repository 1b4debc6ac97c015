//! Backend suitability analysis.
//!
//! Scores every known backend against the shape of a workflow so callers can
//! see which strategy the graph would be better served by, independent of
//! which backend actually ran it.

use serde::{Deserialize, Serialize};
use triageflow_config::{ActionVariant, NodeKind, OrchestrationBackend};
use triageflow_workflow::Workflow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suitability {
  Low,
  Medium,
  High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendAnalysis {
  pub backend: OrchestrationBackend,
  pub suitability: Suitability,
  pub summary: String,
  pub prerequisites: Vec<String>,
  pub risks: Vec<String>,
}

/// Structural measurements the scores are derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphProfile {
  /// Node count plus edge count.
  pub complexity: usize,
  /// Nodes with more than one outgoing edge.
  pub branching_nodes: usize,
  /// Nodes with more than one incoming edge.
  pub join_nodes: usize,
  pub includes_webhook: bool,
}

impl GraphProfile {
  pub fn of(workflow: &Workflow) -> Self {
    let includes_webhook = workflow.nodes().iter().any(|node| {
      matches!(
        node.kind,
        NodeKind::Action {
          variant: ActionVariant::CallWebhook,
          ..
        }
      )
    });

    Self {
      complexity: workflow.nodes().len() + workflow.edges().len(),
      branching_nodes: workflow.graph().branch_points().count(),
      join_nodes: workflow.graph().join_points().count(),
      includes_webhook,
    }
  }

  fn branches(&self) -> bool {
    self.branching_nodes > 0
  }
}

/// Analyse every backend for `workflow`, in [`OrchestrationBackend::ALL`] order.
pub fn assess(workflow: &Workflow) -> Vec<BackendAnalysis> {
  let profile = GraphProfile::of(workflow);
  OrchestrationBackend::ALL
    .into_iter()
    .map(|backend| analyse(backend, &profile))
    .collect()
}

fn analyse(backend: OrchestrationBackend, profile: &GraphProfile) -> BackendAnalysis {
  match backend {
    OrchestrationBackend::Inline => {
      let suitability = if profile.complexity <= 10 && !profile.branches() {
        Suitability::High
      } else if profile.complexity <= 14 {
        Suitability::Medium
      } else {
        Suitability::Low
      };

      BackendAnalysis {
        backend,
        suitability,
        summary: if suitability == Suitability::High {
          "Best for rapid iteration and workflows with predictable latency."
        } else {
          "Use for development or lightweight automations. Monitor cold-start latency."
        }
        .to_string(),
        prerequisites: strings(&["Runs inside the calling process", "Input records under 1 MB"]),
        risks: {
          let mut risks = if suitability == Suitability::Low {
            strings(&[
              "Potential timeouts for long-running actions",
              "No retries beyond what collaborators provide",
            ])
          } else {
            Vec::new()
          };
          if profile.join_nodes > 0 {
            risks.push("Join nodes run once, on the first satisfied incoming edge".to_string());
          }
          risks
        },
      }
    }
    OrchestrationBackend::Temporal => BackendAnalysis {
      backend,
      suitability: if profile.complexity > 8 || profile.includes_webhook || profile.branches() {
        Suitability::High
      } else {
        Suitability::Medium
      },
      summary: "Ideal for resilient, long-running orchestrations with retries and durable timers."
        .to_string(),
      prerequisites: strings(&[
        "Managed Temporal cluster (Cloud or self-hosted)",
        "Workers deployed in trusted network",
      ]),
      risks: strings(&[
        "Increased operational overhead",
        "Requires workflow and activity code separation",
      ]),
    },
    OrchestrationBackend::DurableObjects => BackendAnalysis {
      backend,
      suitability: if profile.branches() && profile.complexity <= 14 {
        Suitability::Medium
      } else {
        Suitability::Low
      },
      summary: "Good fit for low-latency, stateful coordination at the edge.".to_string(),
      prerequisites: strings(&["Cloudflare account with Durable Objects enabled"]),
      risks: strings(&[
        "Vendor lock-in to Cloudflare",
        "Execution limited to a single-region object",
      ]),
    },
  }
}

fn strings(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::{Value, json};
  use triageflow_config::WorkflowDef;
  use triageflow_workflow::validate;

  fn action(id: &str, variant: &str, config: Value) -> Value {
    json!({
      "id": id, "key": id, "type": "action", "variant": variant, "name": id, "config": config
    })
  }

  fn assign(id: &str) -> Value {
    action(id, "assign_owner", json!({ "actionType": "assign", "queue": "q" }))
  }

  fn workflow(nodes: Vec<Value>, edges: Vec<(&str, &str)>) -> Workflow {
    let edges: Vec<Value> = edges
      .iter()
      .enumerate()
      .map(|(i, (s, t))| {
        json!({ "id": format!("e{}", i), "sourceId": s, "targetId": t, "guard": { "type": "always" } })
      })
      .collect();
    let def: WorkflowDef = serde_json::from_value(json!({
      "metadata": { "name": "w", "status": "draft", "organizationId": "org" },
      "nodes": nodes,
      "edges": edges
    }))
    .unwrap();
    validate(&def).unwrap()
  }

  fn suitability(analysis: &[BackendAnalysis], backend: OrchestrationBackend) -> Suitability {
    analysis
      .iter()
      .find(|a| a.backend == backend)
      .map(|a| a.suitability)
      .unwrap()
  }

  #[test]
  fn test_small_linear_graph_prefers_inline() {
    let workflow = workflow(vec![assign("a"), assign("b")], vec![("a", "b")]);
    let analysis = assess(&workflow);

    assert_eq!(analysis.len(), 3);
    assert_eq!(suitability(&analysis, OrchestrationBackend::Inline), Suitability::High);
    assert_eq!(suitability(&analysis, OrchestrationBackend::Temporal), Suitability::Medium);
    assert_eq!(
      suitability(&analysis, OrchestrationBackend::DurableObjects),
      Suitability::Low
    );
    assert!(analysis[0].risks.is_empty());
  }

  #[test]
  fn test_branching_graph() {
    let workflow = workflow(
      vec![assign("a"), assign("b"), assign("c")],
      vec![("a", "b"), ("a", "c")],
    );
    let profile = GraphProfile::of(&workflow);
    assert_eq!(profile.complexity, 5);
    assert_eq!(profile.branching_nodes, 1);
    assert_eq!(profile.join_nodes, 0);

    let analysis = assess(&workflow);
    assert_eq!(suitability(&analysis, OrchestrationBackend::Inline), Suitability::Medium);
    assert_eq!(suitability(&analysis, OrchestrationBackend::Temporal), Suitability::High);
    assert_eq!(
      suitability(&analysis, OrchestrationBackend::DurableObjects),
      Suitability::Medium
    );
  }

  #[test]
  fn test_join_node_flagged_for_inline() {
    let workflow = workflow(
      vec![assign("a"), assign("b"), assign("c")],
      vec![("a", "c"), ("b", "c")],
    );
    assert_eq!(GraphProfile::of(&workflow).join_nodes, 1);

    let analysis = assess(&workflow);
    assert_eq!(analysis[0].backend, OrchestrationBackend::Inline);
    assert_eq!(analysis[0].suitability, Suitability::High);
    assert_eq!(
      analysis[0].risks,
      vec!["Join nodes run once, on the first satisfied incoming edge"]
    );
  }

  #[test]
  fn test_webhook_raises_temporal() {
    let hook = action(
      "hook",
      "call_webhook",
      json!({
        "actionType": "webhook", "url": "https://example.com", "method": "POST",
        "bodyTemplate": "{}"
      }),
    );
    let workflow = workflow(vec![hook], vec![]);
    assert!(GraphProfile::of(&workflow).includes_webhook);
    assert_eq!(
      suitability(&assess(&workflow), OrchestrationBackend::Temporal),
      Suitability::High
    );
  }

  #[test]
  fn test_large_graph_makes_inline_risky() {
    let ids: Vec<String> = (0..8).map(|i| format!("n{}", i)).collect();
    let nodes = ids.iter().map(|id| assign(id)).collect();
    let edges = ids
      .windows(2)
      .map(|pair| (pair[0].as_str(), pair[1].as_str()))
      .collect();
    // 8 nodes + 7 edges
    let analysis = assess(&workflow(nodes, edges));

    assert_eq!(analysis[0].suitability, Suitability::Low);
    assert_eq!(analysis[0].risks.len(), 2);
  }
}
