//! Loading run requests from disk.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use triageflow_config::{ExecutionOptions, ExecutionPayload, WorkflowDef};

/// Read a definition file. The file may hold a bare workflow definition or
/// a full execution payload (`organizationId`, `definition`, `input`,
/// `options`). A bare definition is wrapped in a payload owned by its own
/// organization, with an empty input and default options.
pub fn load_payload(path: &Path) -> Result<ExecutionPayload> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read definition file: {}", path.display()))?;
  parse_payload(&content)
    .with_context(|| format!("failed to parse definition file: {}", path.display()))
}

pub fn parse_payload(content: &str) -> Result<ExecutionPayload> {
  let value: Value = serde_json::from_str(content).context("not valid JSON")?;

  if value.get("definition").is_some() {
    return serde_json::from_value(value).context("invalid execution payload");
  }

  let definition: WorkflowDef =
    serde_json::from_value(value).context("invalid workflow definition")?;
  Ok(ExecutionPayload {
    organization_id: definition.metadata.organization_id.clone(),
    definition,
    input: Value::Object(serde_json::Map::new()),
    options: ExecutionOptions::default(),
  })
}

/// Read an input record from a file, or from stdin when `path` is `-`.
pub fn load_input(path: &Path) -> Result<Value> {
  let content = if path == Path::new("-") {
    let mut buf = String::new();
    std::io::stdin()
      .read_to_string(&mut buf)
      .context("failed to read input from stdin")?;
    buf
  } else {
    std::fs::read_to_string(path)
      .with_context(|| format!("failed to read input file: {}", path.display()))?
  };

  let input: Value = serde_json::from_str(&content).context("input is not valid JSON")?;
  if !input.is_object() {
    bail!("input must be a JSON object");
  }
  Ok(input)
}
