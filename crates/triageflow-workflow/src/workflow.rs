use std::collections::HashMap;

use triageflow_config::{Edge, NodeDef, WorkflowDef, WorkflowMetadata};

use crate::graph::Graph;

/// A validated workflow ready for execution.
///
/// Constructed only by [`crate::validate`]. The definition is immutable from
/// here on; runs borrow it read-only.
#[derive(Debug, Clone)]
pub struct Workflow {
  definition: WorkflowDef,
  index: HashMap<String, usize>,
  graph: Graph,
}

impl Workflow {
  pub(crate) fn new(definition: WorkflowDef, index: HashMap<String, usize>, graph: Graph) -> Self {
    Self {
      definition,
      index,
      graph,
    }
  }

  pub fn metadata(&self) -> &WorkflowMetadata {
    &self.definition.metadata
  }

  /// Nodes in definition order. A node's position is its index in the graph.
  pub fn nodes(&self) -> &[NodeDef] {
    &self.definition.nodes
  }

  pub fn edges(&self) -> &[Edge] {
    &self.definition.edges
  }

  pub fn node(&self, idx: usize) -> Option<&NodeDef> {
    self.definition.nodes.get(idx)
  }

  pub fn edge(&self, idx: usize) -> Option<&Edge> {
    self.definition.edges.get(idx)
  }

  /// Get a node by ID.
  pub fn get_node(&self, node_id: &str) -> Option<&NodeDef> {
    self.index_of(node_id).and_then(|idx| self.node(idx))
  }

  pub fn index_of(&self, node_id: &str) -> Option<usize> {
    self.index.get(node_id).copied()
  }

  pub fn graph(&self) -> &Graph {
    &self.graph
  }

  /// Entry nodes (no incoming edges), in definition order.
  pub fn entry_nodes(&self) -> impl Iterator<Item = &NodeDef> + '_ {
    self
      .graph
      .entry_points()
      .iter()
      .filter_map(|&idx| self.node(idx))
  }

  /// The definition this workflow was validated from.
  pub fn definition(&self) -> &WorkflowDef {
    &self.definition
  }
}
