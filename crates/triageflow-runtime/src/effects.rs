//! Effect collaborators used by action nodes.
//!
//! The runtime never talks to mail servers, chat providers, the ticket store
//! or remote HTTP endpoints directly. Action executors call these traits and
//! the caller decides what sits behind them. [`Effects::simulated`] wires in
//! implementations that only log, which is what the CLI and most tests use.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use triageflow_config::{HttpMethod, NotifyChannel};

use crate::error::EffectError;

/// A rendered notification ready for delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
  pub node_id: String,
  pub channel: NotifyChannel,
  pub recipients: Vec<String>,
  pub message: String,
}

/// Acknowledgement returned by a notification dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReceipt {
  pub delivery_id: String,
  pub accepted: usize,
}

/// A queue/owner assignment for the ticket being triaged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
  pub node_id: String,
  pub queue: String,
  pub owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
  pub node_id: String,
  pub url: String,
  pub method: HttpMethod,
  pub headers: Vec<(String, String)>,
  pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
  pub status: u16,
  /// True when no outbound call was made.
  pub simulated: bool,
}

/// Delivers notifications over email or chat.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
  async fn dispatch(&self, notification: &Notification) -> Result<DeliveryReceipt, EffectError>;
}

/// Applies queue/owner assignments to tickets.
#[async_trait]
pub trait TicketMutator: Send + Sync {
  async fn assign(&self, assignment: &Assignment) -> Result<(), EffectError>;
}

/// Performs outbound webhook calls.
#[async_trait]
pub trait WebhookCaller: Send + Sync {
  async fn call(&self, request: &WebhookRequest) -> Result<WebhookResponse, EffectError>;
}

/// Time source for timestamps and deadline checks.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// Dispatcher that logs the notification and reports it as delivered.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingDispatcher;

#[async_trait]
impl NotificationDispatcher for LoggingDispatcher {
  async fn dispatch(&self, notification: &Notification) -> Result<DeliveryReceipt, EffectError> {
    let delivery_id = uuid::Uuid::new_v4().to_string();
    info!(
      node_id = %notification.node_id,
      channel = ?notification.channel,
      recipients = notification.recipients.len(),
      delivery_id = %delivery_id,
      "notification delivered (simulated)"
    );
    Ok(DeliveryReceipt {
      delivery_id,
      accepted: notification.recipients.len(),
    })
  }
}

/// Ticket mutator that only logs the assignment.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingTicketMutator;

#[async_trait]
impl TicketMutator for LoggingTicketMutator {
  async fn assign(&self, assignment: &Assignment) -> Result<(), EffectError> {
    info!(
      node_id = %assignment.node_id,
      queue = %assignment.queue,
      owner = ?assignment.owner,
      "assignment applied (simulated)"
    );
    Ok(())
  }
}

/// Webhook caller that never leaves the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedWebhookCaller;

#[async_trait]
impl WebhookCaller for SimulatedWebhookCaller {
  async fn call(&self, request: &WebhookRequest) -> Result<WebhookResponse, EffectError> {
    warn!(
      node_id = %request.node_id,
      method = ?request.method,
      url = %request.url,
      "webhook simulated (no outbound call)"
    );
    Ok(WebhookResponse {
      status: 202,
      simulated: true,
    })
  }
}

/// The set of collaborators a run executes against.
#[derive(Clone)]
pub struct Effects {
  pub notifications: Arc<dyn NotificationDispatcher>,
  pub tickets: Arc<dyn TicketMutator>,
  pub webhooks: Arc<dyn WebhookCaller>,
  pub clock: Arc<dyn Clock>,
}

impl Effects {
  /// Logging collaborators and the system clock.
  pub fn simulated() -> Self {
    Self {
      notifications: Arc::new(LoggingDispatcher),
      tickets: Arc::new(LoggingTicketMutator),
      webhooks: Arc::new(SimulatedWebhookCaller),
      clock: Arc::new(SystemClock),
    }
  }

  pub fn with_notifications(mut self, notifications: Arc<dyn NotificationDispatcher>) -> Self {
    self.notifications = notifications;
    self
  }

  pub fn with_tickets(mut self, tickets: Arc<dyn TicketMutator>) -> Self {
    self.tickets = tickets;
    self
  }

  pub fn with_webhooks(mut self, webhooks: Arc<dyn WebhookCaller>) -> Self {
    self.webhooks = webhooks;
    self
  }

  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }
}

impl Default for Effects {
  fn default() -> Self {
    Self::simulated()
  }
}

impl std::fmt::Debug for Effects {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Effects").finish_non_exhaustive()
  }
}
