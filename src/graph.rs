//! petgraph-backed graph primitives with node-identity lookup.
//!
//! [`DirectedGraph`] stores the two-slice template; [`UndirectedGraph`] is
//! what moralization hands to inference engines. Both keep a map from
//! [`Node`] to petgraph index so callers never deal with raw indices.

use std::collections::HashMap;

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::node::Node;

/// A directed edge between two template nodes.
pub type Edge = (Node, Node);

/// Directed graph keyed by [`Node`].
#[derive(Debug, Clone, Default)]
pub struct DirectedGraph {
    graph: DiGraph<Node, ()>,
    index: HashMap<Node, NodeIndex>,
}

impl DirectedGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the node. Adding an existing node is a no-op.
    pub fn add_node(&mut self, node: Node) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node) {
            return idx;
        }
        let idx = self.graph.add_node(node.clone());
        self.index.insert(node, idx);
        idx
    }

    /// Add an edge, creating missing endpoints. Returns false if the edge already existed.
    pub fn add_edge(&mut self, start: Node, end: Node) -> bool {
        let a = self.add_node(start);
        let b = self.add_node(end);
        if self.graph.find_edge(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(a, b, ());
        true
    }

    #[must_use]
    pub fn contains(&self, node: &Node) -> bool {
        self.index.contains_key(node)
    }

    #[must_use]
    pub fn has_edge(&self, start: &Node, end: &Node) -> bool {
        match (self.index.get(start), self.index.get(end)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// True if a directed path leads from `from` to `to`. Absent nodes have no paths.
    #[must_use]
    pub fn has_path(&self, from: &Node, to: &Node) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&a), Some(&b)) => has_path_connecting(&self.graph, a, b, None),
            _ => false,
        }
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> Vec<Edge> {
        self.graph
            .edge_references()
            .map(|e| (self.graph[e.source()].clone(), self.graph[e.target()].clone()))
            .collect()
    }

    /// Parents of `node` in the order their edges were added. Empty for absent nodes.
    #[must_use]
    pub fn parents(&self, node: &Node) -> Vec<Node> {
        let Some(&idx) = self.index.get(node) else {
            return Vec::new();
        };
        let mut incoming: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (e.id(), e.source()))
            .collect();
        incoming.sort_by_key(|(id, _)| *id);
        incoming
            .into_iter()
            .map(|(_, source)| self.graph[source].clone())
            .collect()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Undirected projection: every node, every edge with direction dropped and duplicates merged.
    #[must_use]
    pub fn to_undirected(&self) -> UndirectedGraph {
        let mut undirected = UndirectedGraph::new();
        for node in self.nodes() {
            undirected.add_node(node.clone());
        }
        for (start, end) in self.edges() {
            undirected.add_edge(start, end);
        }
        undirected
    }
}

/// Undirected graph keyed by [`Node`].
#[derive(Debug, Clone, Default)]
pub struct UndirectedGraph {
    graph: UnGraph<Node, ()>,
    index: HashMap<Node, NodeIndex>,
}

impl UndirectedGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the node.
    pub fn add_node(&mut self, node: Node) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node) {
            return idx;
        }
        let idx = self.graph.add_node(node.clone());
        self.index.insert(node, idx);
        idx
    }

    /// Add an undirected edge. Returns false if `a -- b` already existed in either orientation.
    pub fn add_edge(&mut self, a: Node, b: Node) -> bool {
        let a = self.add_node(a);
        let b = self.add_node(b);
        if self.graph.find_edge(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(a, b, ());
        true
    }

    #[must_use]
    pub fn contains(&self, node: &Node) -> bool {
        self.index.contains_key(node)
    }

    /// Orientation-insensitive edge lookup.
    #[must_use]
    pub fn has_edge(&self, a: &Node, b: &Node) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    #[must_use]
    pub fn edges(&self) -> Vec<Edge> {
        self.graph
            .edge_references()
            .map(|e| (self.graph[e.source()].clone(), self.graph[e.target()].clone()))
            .collect()
    }

    /// Neighbors of `node`, sorted. Empty for absent nodes.
    #[must_use]
    pub fn neighbors(&self, node: &Node) -> Vec<Node> {
        let Some(&idx) = self.index.get(node) else {
            return Vec::new();
        };
        let mut out: Vec<Node> = self
            .graph
            .neighbors(idx)
            .map(|n| self.graph[n].clone())
            .collect();
        out.sort();
        out.dedup();
        out
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Borrow the underlying petgraph graph.
    #[must_use]
    pub const fn as_petgraph(&self) -> &UnGraph<Node, ()> {
        &self.graph
    }
}
