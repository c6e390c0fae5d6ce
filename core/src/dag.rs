//! Adjacency-list directed acyclic graph.
//!
//! [`Dag`] stores nodes as dense indices and edges as per-node successor and
//! predecessor lists. Edges can be inserted either with immediate cycle
//! rejection ([`Dag::try_add_edge`]) or unchecked, deferring validation to
//! [`Dag::topological_order`].
//!
//! # Example
//!
//! ```
//! use framegraph_core::dag::Dag;
//!
//! let mut dag = Dag::new();
//! let shadow = dag.add_node();
//! let lighting = dag.add_node();
//!
//! dag.try_add_edge(shadow, lighting).unwrap();
//! assert!(dag.try_add_edge(lighting, shadow).is_err());
//!
//! assert_eq!(dag.topological_order().unwrap(), vec![shadow, lighting]);
//! ```

use std::collections::VecDeque;
use std::fmt;

use fixedbitset::FixedBitSet;

/// Handle to a node in a [`Dag`].
///
/// `NodeIndex` is `Copy` and only valid within the `Dag` that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(u32);

impl NodeIndex {
    /// Create a handle from a raw index.
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw index of this node.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Returned when inserting an edge would close a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleError {
    /// Source of the rejected edge.
    pub from: NodeIndex,
    /// Target of the rejected edge.
    pub to: NodeIndex,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "edge {} -> {} would introduce a cycle",
            self.from.index(),
            self.to.index()
        )
    }
}

impl std::error::Error for CycleError {}

/// A directed graph stored as adjacency lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dag {
    outgoing: Vec<Vec<NodeIndex>>,
    incoming: Vec<Vec<NodeIndex>>,
    edge_count: usize,
}

impl Dag {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with room for `nodes` nodes.
    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            outgoing: Vec::with_capacity(nodes),
            incoming: Vec::with_capacity(nodes),
            edge_count: 0,
        }
    }

    /// Add a node and return its handle.
    pub fn add_node(&mut self) -> NodeIndex {
        let index = self.outgoing.len() as u32;
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        NodeIndex::new(index)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.outgoing.len()
    }

    /// Number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Check whether `node` belongs to this graph.
    pub fn contains(&self, node: NodeIndex) -> bool {
        node.index() < self.outgoing.len()
    }

    /// Check whether the edge `from -> to` exists.
    pub fn has_edge(&self, from: NodeIndex, to: NodeIndex) -> bool {
        self.outgoing[from.index()].contains(&to)
    }

    /// Insert `from -> to`, rejecting it if it would close a cycle.
    ///
    /// Returns `Ok(false)` if the edge already exists (duplicates collapse)
    /// and `Ok(true)` if it was inserted. A self-loop is always a cycle.
    ///
    /// # Panics
    ///
    /// Panics if either handle does not belong to this graph.
    pub fn try_add_edge(&mut self, from: NodeIndex, to: NodeIndex) -> Result<bool, CycleError> {
        assert!(self.contains(from), "Invalid source node");
        assert!(self.contains(to), "Invalid target node");

        if self.has_edge(from, to) {
            return Ok(false);
        }
        if self.reaches(to, from) {
            return Err(CycleError { from, to });
        }
        Ok(self.add_edge_unchecked(from, to))
    }

    /// Insert `from -> to` without cycle checking.
    ///
    /// Returns `false` if the edge already existed.
    pub fn add_edge_unchecked(&mut self, from: NodeIndex, to: NodeIndex) -> bool {
        if self.has_edge(from, to) {
            return false;
        }
        self.outgoing[from.index()].push(to);
        self.incoming[to.index()].push(from);
        self.edge_count += 1;
        true
    }

    /// Check whether `to` is reachable from `from` (a node reaches itself).
    pub fn reaches(&self, from: NodeIndex, to: NodeIndex) -> bool {
        if from == to {
            return true;
        }

        let mut visited = FixedBitSet::with_capacity(self.node_count());
        let mut stack = vec![from];
        visited.insert(from.index());

        while let Some(node) = stack.pop() {
            for &next in &self.outgoing[node.index()] {
                if next == to {
                    return true;
                }
                if !visited.put(next.index()) {
                    stack.push(next);
                }
            }
        }

        false
    }

    /// Direct successors of `node`, in insertion order.
    pub fn successors(&self, node: NodeIndex) -> &[NodeIndex] {
        &self.outgoing[node.index()]
    }

    /// Direct predecessors of `node`, in insertion order.
    pub fn predecessors(&self, node: NodeIndex) -> &[NodeIndex] {
        &self.incoming[node.index()]
    }

    /// Nodes without predecessors, in index order.
    pub fn roots(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.incoming
            .iter()
            .enumerate()
            .filter(|(_, preds)| preds.is_empty())
            .map(|(i, _)| NodeIndex::new(i as u32))
    }

    /// Iterate over all edges as `(from, to)` pairs.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.outgoing.iter().enumerate().flat_map(|(i, succs)| {
            let from = NodeIndex::new(i as u32);
            succs.iter().map(move |&to| (from, to))
        })
    }

    /// Topologically sort all nodes using Kahn's algorithm.
    ///
    /// Ready nodes are processed in index order, so the result is
    /// deterministic for a given insertion sequence. On failure, returns the
    /// nodes that could not be ordered (those on or behind a cycle).
    pub fn topological_order(&self) -> Result<Vec<NodeIndex>, Vec<NodeIndex>> {
        let n = self.node_count();
        let mut in_degree: Vec<usize> = self.incoming.iter().map(Vec::len).collect();

        let mut queue: VecDeque<NodeIndex> = (0..n as u32)
            .map(NodeIndex::new)
            .filter(|node| in_degree[node.index()] == 0)
            .collect();

        let mut order = Vec::with_capacity(n);
        while let Some(node) = queue.pop_front() {
            order.push(node);
            for &next in &self.outgoing[node.index()] {
                in_degree[next.index()] -= 1;
                if in_degree[next.index()] == 0 {
                    queue.push_back(next);
                }
            }
        }

        if order.len() != n {
            let stuck = in_degree
                .iter()
                .enumerate()
                .filter(|(_, deg)| **deg > 0)
                .map(|(i, _)| NodeIndex::new(i as u32))
                .collect();
            return Err(stuck);
        }

        Ok(order)
    }
}
