//! Per-run execution state.

use std::sync::Arc;

use serde_json::{Map, Value};
use triageflow_config::FieldRef;

use crate::effects::Clock;
use crate::result::{LogEntry, LogLevel};

/// Everything a run accumulates while it executes.
///
/// Allocated per run and never shared; executors read the input record and
/// prior outputs from here and append audit log entries to it.
pub struct RunContext {
  input: Value,
  outputs: Map<String, Value>,
  state: Map<String, Value>,
  logs: Vec<LogEntry>,
  clock: Arc<dyn Clock>,
}

impl RunContext {
  pub fn new(input: Value, clock: Arc<dyn Clock>) -> Self {
    Self {
      input,
      outputs: Map::new(),
      state: Map::new(),
      logs: Vec::new(),
      clock,
    }
  }

  pub fn input(&self) -> &Value {
    &self.input
  }

  /// Output of a node that already executed in this run.
  pub fn output(&self, node_id: &str) -> Option<&Value> {
    self.outputs.get(node_id)
  }

  pub fn record_output(&mut self, node_id: &str, output: Value) {
    self.outputs.insert(node_id.to_string(), output);
  }

  pub fn state(&self) -> &Map<String, Value> {
    &self.state
  }

  pub fn set_state(&mut self, key: &str, value: Value) {
    self.state.insert(key.to_string(), value);
  }

  pub fn log(&mut self, level: LogLevel, message: impl Into<String>, node_id: Option<&str>) {
    self.logs.push(LogEntry {
      timestamp: self.clock.now(),
      level,
      message: message.into(),
      node_id: node_id.map(str::to_string),
    });
  }

  /// Resolve a rule field. `None` means the field is absent, which is
  /// distinct from a present `null`.
  pub fn lookup(&self, field: &FieldRef<'_>) -> Option<&Value> {
    match field {
      FieldRef::Input { path } => walk(&self.input, path),
      FieldRef::NodeOutput { node_id, path } => walk(self.outputs.get(*node_id)?, path),
    }
  }

  /// Template context: the input record's fields at the top level plus
  /// `nodes`, the outputs of nodes executed so far.
  pub fn template_context(&self) -> Value {
    let mut context = match &self.input {
      Value::Object(fields) => fields.clone(),
      _ => Map::new(),
    };
    context.insert("nodes".to_string(), Value::Object(self.outputs.clone()));
    Value::Object(context)
  }

  pub(crate) fn into_parts(self) -> (Map<String, Value>, Map<String, Value>, Vec<LogEntry>) {
    (self.outputs, self.state, self.logs)
  }
}

fn walk<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
  path.iter().try_fold(root, |current, segment| match current {
    Value::Object(fields) => fields.get(*segment),
    Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
    _ => None,
  })
}
