use serde::{Deserialize, Serialize};

/// Configuration of an action node, discriminated by `actionType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "actionType", rename_all = "snake_case")]
pub enum ActionConfig {
  Notify(NotifyAction),
  Assign(AssignAction),
  Webhook(WebhookAction),
}

impl ActionConfig {
  /// The `actionType` tag, as it appears on the wire.
  pub fn kind(&self) -> &'static str {
    match self {
      ActionConfig::Notify(_) => "notify",
      ActionConfig::Assign(_) => "assign",
      ActionConfig::Webhook(_) => "webhook",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyChannel {
  Email,
  Slack,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyAction {
  pub channel: NotifyChannel,
  /// Message template, rendered with minijinja against the input record.
  pub template: String,
  pub recipients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignAction {
  pub queue: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub owner: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
  Post,
  Put,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookHeader {
  pub key: String,
  pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAction {
  pub url: String,
  pub method: HttpMethod,
  #[serde(default)]
  pub headers: Vec<WebhookHeader>,
  pub body_template: String,
}
