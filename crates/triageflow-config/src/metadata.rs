use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
  Draft,
  Active,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowMetadata {
  pub name: String,
  #[serde(default)]
  pub description: String,
  pub status: WorkflowStatus,
  pub organization_id: String,
  #[serde(default = "default_revision")]
  pub revision: u32,
}

fn default_revision() -> u32 {
  1
}
