//! End-to-end tests for `WorkflowEngine::run_workflow`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use triageflow_config::{ExecutionOptions, ExecutionPayload, OrchestrationBackend};
use triageflow_engine::{Backend, EngineError, WorkflowEngine};
use triageflow_runtime::{
  DeliveryReceipt, EffectError, Effects, InvokeResult, Notification, NotificationDispatcher,
  NodeStatus, RunStatus, Termination,
};
use triageflow_workflow::{ValidationError, Workflow};

const ORG: &str = "123e4567-e89b-12d3-a456-426614174000";

#[derive(Default)]
struct CountingDispatcher {
  calls: AtomicUsize,
}

#[async_trait]
impl NotificationDispatcher for CountingDispatcher {
  async fn dispatch(&self, notification: &Notification) -> Result<DeliveryReceipt, EffectError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    Ok(DeliveryReceipt {
      delivery_id: "d-1".to_string(),
      accepted: notification.recipients.len(),
    })
  }
}

fn engine() -> (WorkflowEngine, Arc<CountingDispatcher>) {
  let dispatcher = Arc::new(CountingDispatcher::default());
  let effects = Effects::simulated().with_notifications(dispatcher.clone());
  (WorkflowEngine::new(effects), dispatcher)
}

fn metadata() -> Value {
  json!({
    "name": "Escalation Workflow",
    "description": "Auto escalate based on priority.",
    "status": "draft",
    "organizationId": ORG,
    "revision": 1
  })
}

fn escalation_payload(input: Value, options: Value) -> ExecutionPayload {
  serde_json::from_value(json!({
    "organizationId": ORG,
    "definition": {
      "metadata": metadata(),
      "nodes": [
        {
          "id": "trigger-1", "key": "trigger-1", "type": "trigger", "variant": "ticket_created",
          "name": "Ticket Created", "description": "",
          "config": {
            "resource": "tickets", "event": "created",
            "filters": [{ "field": "priority", "operator": "greater_than", "value": "0" }]
          }
        },
        {
          "id": "condition-1", "key": "condition-1", "type": "condition",
          "variant": "priority_check", "name": "Priority Check", "description": "",
          "config": {
            "logic": "AND", "defaultOutcome": "failure",
            "rules": [
              { "source": "input", "field": "priority", "operator": "greater_than", "value": "3" }
            ]
          }
        },
        {
          "id": "action-1", "key": "action-1", "type": "action", "variant": "send_email",
          "name": "Notify Leadership", "description": "",
          "config": {
            "actionType": "notify", "channel": "email",
            "template": "Ticket {{ticketId}} triggered escalation",
            "recipients": ["exec@example.com"]
          }
        },
        {
          "id": "action-2", "key": "action-2", "type": "action", "variant": "assign_owner",
          "name": "Assign Queue", "description": "",
          "config": { "actionType": "assign", "queue": "standard", "owner": "" }
        }
      ],
      "edges": [
        { "id": "edge-1", "sourceId": "trigger-1", "targetId": "condition-1",
          "guard": { "type": "always" } },
        { "id": "edge-2", "sourceId": "condition-1", "targetId": "action-1",
          "guard": { "type": "status", "status": "success" } },
        { "id": "edge-3", "sourceId": "condition-1", "targetId": "action-2",
          "guard": { "type": "status", "status": "failure" } }
      ]
    },
    "input": input,
    "options": options
  }))
  .expect("invalid payload fixture")
}

fn cyclic_payload() -> ExecutionPayload {
  serde_json::from_value(json!({
    "organizationId": ORG,
    "definition": {
      "metadata": metadata(),
      "nodes": [
        {
          "id": "node-a", "key": "node-a", "type": "trigger", "variant": "ticket_created",
          "name": "A",
          "config": {
            "resource": "tickets", "event": "created",
            "filters": [{ "field": "priority", "operator": "greater_than", "value": "0" }]
          }
        },
        {
          "id": "node-b", "key": "node-b", "type": "action", "variant": "send_email",
          "name": "B",
          "config": {
            "actionType": "notify", "channel": "email",
            "template": "Test", "recipients": ["ops@example.com"]
          }
        }
      ],
      "edges": [
        { "id": "edge-a", "sourceId": "node-a", "targetId": "node-b", "guard": { "type": "always" } },
        { "id": "edge-b", "sourceId": "node-b", "targetId": "node-a", "guard": { "type": "always" } }
      ]
    },
    "input": { "priority": "1" },
    "options": { "orchestration": "inline", "maxExecutionMs": 1000 }
  }))
  .expect("invalid payload fixture")
}

#[tokio::test]
async fn test_routes_through_success_branch() {
  let (engine, dispatcher) = engine();
  let payload = escalation_payload(
    json!({ "priority": "5", "ticketId": "T-1000" }),
    json!({ "orchestration": "inline", "maxExecutionMs": 1000 }),
  );

  let result = engine.run_workflow(payload).await.unwrap();

  assert_eq!(result.status(), RunStatus::Succeeded);
  assert_eq!(
    result.orchestration.selected_backend,
    OrchestrationBackend::Inline
  );
  assert_eq!(result.node_status("trigger-1"), Some(NodeStatus::Success));
  assert_eq!(result.node_status("condition-1"), Some(NodeStatus::Success));
  assert_eq!(result.node_status("action-1"), Some(NodeStatus::Success));
  assert_eq!(result.node_status("action-2"), Some(NodeStatus::Skipped));
  assert!(!result.run.logs.is_empty());
  assert_eq!(
    result.executed_nodes(),
    &["trigger-1", "condition-1", "action-1"]
  );
  assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 1);

  let message = &result.run.output.context["action-1"]["message"];
  assert_eq!(message, "Ticket T-1000 triggered escalation");
}

#[tokio::test]
async fn test_result_wire_format() {
  let (engine, _) = engine();
  let payload = escalation_payload(json!({ "priority": "1" }), json!({}));

  let result = engine.run_workflow(payload).await.unwrap();
  let value = serde_json::to_value(&result).unwrap();

  assert_eq!(value["status"], "succeeded");
  assert_eq!(value["orchestration"]["selectedBackend"], "inline");
  assert_eq!(value["orchestration"]["analysis"].as_array().unwrap().len(), 3);
  assert_eq!(value["nodeResults"]["action-1"]["status"], "skipped");
  assert_eq!(value["nodeResults"]["action-2"]["status"], "success");
  assert_eq!(
    value["output"]["state"]["assignment"],
    json!({ "queue": "standard", "owner": "" })
  );
  assert_eq!(
    value["output"]["executedNodes"],
    json!(["trigger-1", "condition-1", "action-2"])
  );
  assert!(value["runId"].is_string());
  assert!(value.get("termination").is_none());
}

#[tokio::test]
async fn test_rejects_cycle_without_side_effects() {
  let (engine, dispatcher) = engine();

  let err = engine.run_workflow(cyclic_payload()).await.unwrap_err();

  assert!(err.is_validation());
  assert!(matches!(err, EngineError::Validation(ValidationError::Cycle { .. })));
  assert!(err.to_string().contains("cycle"));
  assert!(err.to_string().contains("node-a -> node-b -> node-a"));
  assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 0);
  assert!(engine.cache().is_empty());
}

#[tokio::test]
async fn test_rejects_duplicate_node_ids() {
  let (engine, _) = engine();
  let mut payload = escalation_payload(json!({ "priority": "5" }), json!({}));
  let duplicate = payload.definition.nodes[0].clone();
  payload.definition.nodes.push(duplicate);

  let err = engine.run_workflow(payload).await.unwrap_err();

  assert!(matches!(
    err,
    EngineError::Validation(ValidationError::DuplicateNodeId { ref node_id }) if node_id == "trigger-1"
  ));
}

#[tokio::test]
async fn test_unavailable_backend_falls_back_to_inline() {
  let (engine, _) = engine();
  let payload = escalation_payload(
    json!({ "priority": "5" }),
    json!({ "orchestration": "temporal" }),
  );

  let result = engine.run_workflow(payload).await.unwrap();

  assert_eq!(result.status(), RunStatus::Succeeded);
  assert_eq!(
    result.orchestration.selected_backend,
    OrchestrationBackend::Inline
  );
  assert_eq!(
    result.orchestration.preferred_backend,
    OrchestrationBackend::Temporal
  );
}

/// Backend that refuses every run.
struct RejectingBackend;

#[async_trait]
impl Backend for RejectingBackend {
  fn kind(&self) -> OrchestrationBackend {
    OrchestrationBackend::DurableObjects
  }

  async fn run(
    &self,
    _workflow: Arc<Workflow>,
    _input: Value,
    _options: &ExecutionOptions,
    _cancel: CancellationToken,
  ) -> Result<InvokeResult, EngineError> {
    Err(EngineError::Backend {
      backend: self.kind(),
      message: "namespace not provisioned".to_string(),
    })
  }
}

#[tokio::test]
async fn test_registered_backend_is_selected() {
  let (mut engine, dispatcher) = engine();
  engine.register_backend(Arc::new(RejectingBackend));

  let payload = escalation_payload(
    json!({ "priority": "5" }),
    json!({ "orchestration": "durable-objects" }),
  );
  let err = engine.run_workflow(payload).await.unwrap_err();

  assert!(matches!(
    err,
    EngineError::Backend {
      backend: OrchestrationBackend::DurableObjects,
      ..
    }
  ));
  assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rejects_foreign_organization() {
  let (engine, dispatcher) = engine();
  let mut payload = escalation_payload(json!({ "priority": "5" }), json!({}));
  payload.organization_id = "someone-else".to_string();

  let err = engine.run_workflow(payload).await.unwrap_err();

  assert!(matches!(err, EngineError::OrganizationMismatch { .. }));
  assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rejects_non_object_input() {
  let (engine, _) = engine();
  let payload = escalation_payload(json!(["priority", 5]), json!({}));

  let err = engine.run_workflow(payload).await.unwrap_err();

  assert!(matches!(err, EngineError::InvalidInput { found: "array" }));
}

#[tokio::test]
async fn test_validation_is_cached_across_runs() {
  let (engine, _) = engine();

  for priority in ["5", "1"] {
    let payload = escalation_payload(json!({ "priority": priority }), json!({}));
    engine.run_workflow(payload).await.unwrap();
  }

  assert_eq!(engine.cache().len(), 1);
}

#[tokio::test]
async fn test_cancelled_run_reports_failure() {
  let (engine, dispatcher) = engine();
  let payload = escalation_payload(json!({ "priority": "5" }), json!({}));
  let cancel = CancellationToken::new();
  cancel.cancel();

  let result = engine
    .run_workflow_with_cancel(payload, cancel)
    .await
    .unwrap();

  assert_eq!(result.status(), RunStatus::Failed);
  assert_eq!(result.run.termination, Some(Termination::Cancelled));
  assert!(result.executed_nodes().is_empty());
  assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 0);
}
