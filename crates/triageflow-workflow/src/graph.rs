/// Index-based adjacency for a validated workflow.
///
/// Nodes are identified by their position in the definition's node list and
/// edges by their position in the edge list, so traversal never needs to
/// hash node ids or hold references back into the definition.
#[derive(Debug, Clone)]
pub struct Graph {
  /// Outgoing edge indices per node, in definition order.
  outgoing: Vec<Vec<usize>>,
  /// Incoming edge indices per node, in definition order.
  incoming: Vec<Vec<usize>>,
  /// Edge endpoints: edge index -> (source node, target node).
  endpoints: Vec<(usize, usize)>,
  /// Nodes with no incoming edges, in definition order.
  entry_points: Vec<usize>,
}

impl Graph {
  /// Build a graph over `node_count` nodes from resolved edge endpoints.
  pub(crate) fn new(node_count: usize, endpoints: Vec<(usize, usize)>) -> Self {
    let mut outgoing = vec![Vec::new(); node_count];
    let mut incoming = vec![Vec::new(); node_count];

    for (edge_idx, &(source, target)) in endpoints.iter().enumerate() {
      outgoing[source].push(edge_idx);
      incoming[target].push(edge_idx);
    }

    let entry_points = (0..node_count)
      .filter(|&node| incoming[node].is_empty())
      .collect();

    Self {
      outgoing,
      incoming,
      endpoints,
      entry_points,
    }
  }

  pub fn node_count(&self) -> usize {
    self.outgoing.len()
  }

  /// Nodes with no incoming edges. Execution starts here.
  pub fn entry_points(&self) -> &[usize] {
    &self.entry_points
  }

  /// Outgoing edge indices for a node.
  pub fn outgoing(&self, node: usize) -> &[usize] {
    self.outgoing.get(node).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Incoming edge indices for a node.
  pub fn incoming(&self, node: usize) -> &[usize] {
    self.incoming.get(node).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Source and target node of an edge.
  pub fn endpoints(&self, edge: usize) -> Option<(usize, usize)> {
    self.endpoints.get(edge).copied()
  }

  /// Check if a node has more than one incoming edge.
  pub fn is_join_point(&self, node: usize) -> bool {
    self.incoming(node).len() > 1
  }

  /// Nodes with more than one incoming edge.
  pub fn join_points(&self) -> impl Iterator<Item = usize> + '_ {
    (0..self.node_count()).filter(|&node| self.is_join_point(node))
  }

  /// Nodes with more than one outgoing edge.
  pub fn branch_points(&self) -> impl Iterator<Item = usize> + '_ {
    (0..self.node_count()).filter(|&node| self.outgoing(node).len() > 1)
  }

  /// Find a directed cycle, returned as the node path that closes it
  /// (first and last element are the same node).
  ///
  /// Depth-first search starting from nodes in definition order so the
  /// reported cycle is deterministic. The walk keeps its own stack of
  /// `(node, next outgoing edge)` frames, so chain length is bounded by
  /// memory rather than the thread's call stack.
  pub(crate) fn find_cycle(&self) -> Option<Vec<usize>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
      Unvisited,
      InProgress,
      Done,
    }

    let mut marks = vec![Mark::Unvisited; self.node_count()];
    let mut frames: Vec<(usize, usize)> = Vec::new();

    for root in 0..self.node_count() {
      if marks[root] != Mark::Unvisited {
        continue;
      }

      marks[root] = Mark::InProgress;
      frames.push((root, 0));

      while let Some(&(node, cursor)) = frames.last() {
        let Some(&edge) = self.outgoing(node).get(cursor) else {
          marks[node] = Mark::Done;
          frames.pop();
          continue;
        };
        if let Some(frame) = frames.last_mut() {
          frame.1 += 1;
        }

        let Some((_, next)) = self.endpoints(edge) else {
          continue;
        };

        match marks[next] {
          Mark::InProgress => {
            // Back edge: the cycle is the frame suffix starting at `next`
            let start = frames.iter().position(|&(n, _)| n == next).unwrap_or(0);
            let mut cycle: Vec<usize> = frames[start..].iter().map(|&(n, _)| n).collect();
            cycle.push(next);
            return Some(cycle);
          }
          Mark::Unvisited => {
            marks[next] = Mark::InProgress;
            frames.push((next, 0));
          }
          Mark::Done => {}
        }
      }
    }

    None
  }
}
