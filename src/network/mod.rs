//! Bipartite miRNA → target network: construction and metrics.
//!
//! ```text
//!   Vec<Interaction>  (sorted, deduplicated)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ builder  │  one node per id and side, one edge per pair
//!   └──────────┘
//!        │
//!        ▼
//!   ┌────────────────┐
//!   │ BipartiteGraph │  petgraph DiGraph<Node, f64>
//!   └────────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ metrics  │  degree, centrality, components, density
//!   └──────────┘
//! ```

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::data::model::Side;

pub mod builder;
pub mod metrics;

pub use builder::build;
pub use metrics::{compute, GraphSummary, NetworkMetrics, NodeMetrics};

/// A node tagged with the side it was inserted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub side: Side,
}

/// Directed bipartite graph: every edge runs entity → target.
///
/// Node indices follow insertion order (entities sorted by id, then targets
/// sorted by id), so iteration over the graph is deterministic.
#[derive(Debug, Clone, Default)]
pub struct BipartiteGraph {
    inner: DiGraph<Node, f64>,
    index: HashMap<(Side, String), NodeIndex>,
}

impl BipartiteGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Access the underlying petgraph graph.
    pub fn inner(&self) -> &DiGraph<Node, f64> {
        &self.inner
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    pub fn count_side(&self, side: Side) -> usize {
        self.inner.node_weights().filter(|n| n.side == side).count()
    }

    pub fn node_index(&self, side: Side, id: &str) -> Option<NodeIndex> {
        self.index.get(&(side, id.to_string())).copied()
    }

    pub(crate) fn add_node(&mut self, side: Side, id: &str) -> NodeIndex {
        if let Some(idx) = self.node_index(side, id) {
            return idx;
        }
        let idx = self.inner.add_node(Node {
            id: id.to_string(),
            side,
        });
        self.index.insert((side, id.to_string()), idx);
        idx
    }

    pub(crate) fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, weight: f64) {
        debug_assert_eq!(self.inner[from].side, Side::Entity);
        debug_assert_eq!(self.inner[to].side, Side::Target);
        self.inner.add_edge(from, to, weight);
    }

    /// Direction-aware degree: out-degree for entities, in-degree for targets.
    pub fn degree(&self, idx: NodeIndex) -> usize {
        let dir = match self.inner[idx].side {
            Side::Entity => Direction::Outgoing,
            Side::Target => Direction::Incoming,
        };
        self.inner.edges_directed(idx, dir).count()
    }

    /// Neighbours in the undirected view, in ascending index order.
    pub fn undirected_neighbors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut ns: Vec<NodeIndex> = self.inner.neighbors_undirected(idx).collect();
        ns.sort();
        ns.dedup();
        ns
    }
}
