//! Action node execution.

use minijinja::value::ValueKind;
use minijinja::{Environment, escape_formatter};
use serde_json::json;
use tracing::{error, info, instrument};
use triageflow_config::{
  ActionConfig, AssignAction, GuardStatus, HttpMethod, NotifyAction, NotifyChannel, WebhookAction,
};

use crate::context::RunContext;
use crate::effects::{Assignment, Effects, Notification, WebhookRequest};
use crate::error::NodeError;
use crate::result::{LogLevel, NodeOutcome};

/// Executes action nodes against the configured effect collaborators.
///
/// A completed action always reports success. Collaborator and rendering
/// errors are returned to the caller, which records them on the node.
pub(crate) struct ActionExecutor<'a> {
  effects: &'a Effects,
}

impl<'a> ActionExecutor<'a> {
  pub(crate) fn new(effects: &'a Effects) -> Self {
    Self { effects }
  }

  #[instrument(
    name = "action_execute",
    skip_all,
    fields(node_id = %node_id, action = config.kind())
  )]
  pub(crate) async fn execute(
    &self,
    node_id: &str,
    config: &ActionConfig,
    ctx: &mut RunContext,
  ) -> Result<NodeOutcome, NodeError> {
    let result = match config {
      ActionConfig::Notify(notify) => self.notify(node_id, notify, ctx).await,
      ActionConfig::Assign(assign) => self.assign(node_id, assign, ctx).await,
      ActionConfig::Webhook(webhook) => self.webhook(node_id, webhook, ctx).await,
    };

    match &result {
      Ok(_) => info!("action completed"),
      Err(e) => error!(error = %e, "action failed"),
    }

    result
  }

  async fn notify(
    &self,
    node_id: &str,
    config: &NotifyAction,
    ctx: &mut RunContext,
  ) -> Result<NodeOutcome, NodeError> {
    let message = render(node_id, &config.template, ctx)?;
    let notification = Notification {
      node_id: node_id.to_string(),
      channel: config.channel,
      recipients: config.recipients.clone(),
      message,
    };

    let receipt = self.effects.notifications.dispatch(&notification).await?;

    let channel = match config.channel {
      NotifyChannel::Email => "Email",
      NotifyChannel::Slack => "Slack",
    };
    ctx.log(
      LogLevel::Info,
      format!(
        "{} notification sent to {} recipient(s)",
        channel,
        config.recipients.len()
      ),
      Some(node_id),
    );

    Ok(NodeOutcome {
      status: GuardStatus::Success,
      output: json!({
        "channel": config.channel,
        "recipients": config.recipients,
        "message": notification.message,
        "deliveryId": receipt.delivery_id,
      }),
      notes: format!("Notification accepted for {} recipient(s)", receipt.accepted),
    })
  }

  async fn assign(
    &self,
    node_id: &str,
    config: &AssignAction,
    ctx: &mut RunContext,
  ) -> Result<NodeOutcome, NodeError> {
    let assignment = Assignment {
      node_id: node_id.to_string(),
      queue: config.queue.clone(),
      owner: config.owner.clone(),
    };

    self.effects.tickets.assign(&assignment).await?;

    let output = json!({
      "queue": assignment.queue,
      "owner": assignment.owner,
    });
    ctx.set_state("assignment", output.clone());
    ctx.log(
      LogLevel::Info,
      format!("Assignment prepared for queue {}", config.queue),
      Some(node_id),
    );

    Ok(NodeOutcome {
      status: GuardStatus::Success,
      output,
      notes: "Assignment applied".to_string(),
    })
  }

  async fn webhook(
    &self,
    node_id: &str,
    config: &WebhookAction,
    ctx: &mut RunContext,
  ) -> Result<NodeOutcome, NodeError> {
    let body = render(node_id, &config.body_template, ctx)?;
    let request = WebhookRequest {
      node_id: node_id.to_string(),
      url: config.url.clone(),
      method: config.method,
      headers: config
        .headers
        .iter()
        .map(|h| (h.key.clone(), h.value.clone()))
        .collect(),
      body,
    };

    let response = self.effects.webhooks.call(&request).await?;

    let (level, notes) = if response.simulated {
      (
        LogLevel::Warn,
        "Webhook execution simulated, no outbound call made",
      )
    } else {
      (LogLevel::Info, "Webhook delivered")
    };
    ctx.log(
      level,
      format!(
        "Webhook {} {} returned {}",
        method_name(config),
        config.url,
        response.status
      ),
      Some(node_id),
    );

    Ok(NodeOutcome {
      status: GuardStatus::Success,
      output: json!({
        "url": config.url,
        "method": config.method,
        "headers": config.headers,
        "body": request.body,
        "responseStatus": response.status,
      }),
      notes: notes.to_string(),
    })
  }
}

fn method_name(config: &WebhookAction) -> &'static str {
  match config.method {
    HttpMethod::Post => "POST",
    HttpMethod::Put => "PUT",
  }
}

/// Render an action template against the input record and prior outputs.
///
/// Booleans and null print as JSON literals so webhook bodies stay valid
/// JSON. Undefined variables still render empty.
fn render(node_id: &str, template: &str, ctx: &RunContext) -> Result<String, NodeError> {
  let mut env = Environment::new();
  env.set_formatter(|out, state, value| match value.kind() {
    ValueKind::None => Ok(out.write_str("null")?),
    ValueKind::Bool if value.is_true() => Ok(out.write_str("true")?),
    ValueKind::Bool => Ok(out.write_str("false")?),
    _ => escape_formatter(out, state, value),
  });
  let context = minijinja::Value::from_serialize(ctx.template_context());

  env
    .render_str(template, context)
    .map_err(|e| NodeError::Template {
      node_id: node_id.to_string(),
      message: e.to_string(),
    })
}
