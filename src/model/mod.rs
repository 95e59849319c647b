//! The two-slice Dynamic Bayesian Network template.
//!
//! A [`DynamicBayesianNetwork`] stores slice 0 and slice 1 of an unrolled
//! process. Edge admission keeps the template well-formed:
//!
//! - intra-slice edges are normalized onto slice 0 and mirrored into slice 1;
//! - inter-slice edges only run forward, from slice 0 to slice 1;
//! - self loops, cycles and edges spanning more than one step are rejected.

mod completion;
mod cpds;
mod moral;

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::config::DbnConfig;
use crate::error::{DbnResult, StructureError};
use crate::factors::Cpd;
use crate::graph::{DirectedGraph, Edge};
use crate::node::{validate_time_slice, Node, Slice, TimedNode};

/// Dynamic Bayesian Network over a two-slice template.
///
/// # Examples
///
/// ```
/// use dbnet::{DynamicBayesianNetwork, Node};
///
/// let mut dbn = DynamicBayesianNetwork::new();
/// dbn.add_nodes_from(["D", "G", "I", "S", "L"]);
/// dbn.add_edges_from([(("D", 0), ("G", 0)), (("I", 0), ("G", 0)), (("D", 0), ("D", 1))])
///     .unwrap();
///
/// // Intra-slice edges are mirrored into slice 1.
/// assert!(dbn.has_edge(&Node::next("D"), &Node::next("G")));
/// assert_eq!(dbn.get_inter_edges(), vec![(Node::current("D"), Node::next("D"))]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DynamicBayesianNetwork {
    graph: DirectedGraph,
    cpds: BTreeMap<Node, Cpd>,
    cardinalities: BTreeMap<String, usize>,
    config: DbnConfig,
}

impl DynamicBayesianNetwork {
    /// Creates an empty network with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty network with a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `DbnError::Config` if the configuration is invalid.
    pub fn with_config(config: DbnConfig) -> DbnResult<Self> {
        Ok(Self {
            config: config.validate()?,
            ..Self::default()
        })
    }

    /// Creates a network from an initial edge collection.
    ///
    /// # Errors
    ///
    /// Fails like [`add_edges_from`](Self::add_edges_from).
    pub fn from_edges<I, A, B>(edges: I) -> DbnResult<Self>
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<TimedNode>,
        B: Into<TimedNode>,
    {
        let mut dbn = Self::new();
        dbn.add_edges_from(edges)?;
        Ok(dbn)
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &DbnConfig {
        &self.config
    }

    /// Read access to the underlying directed graph.
    #[must_use]
    pub const fn graph(&self) -> &DirectedGraph {
        &self.graph
    }

    /// Adds `(name, 0)`. Adding an existing node is a no-op.
    pub fn add_node(&mut self, name: impl Into<String>) {
        self.graph.add_node(Node::current(name));
    }

    /// Adds every name in slice 0.
    pub fn add_nodes_from<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.add_node(name);
        }
    }

    /// Distinct base names, sorted.
    #[must_use]
    pub fn nodes(&self) -> Vec<String> {
        let mut names: Vec<String> = self.graph.nodes().map(|n| n.name.clone()).collect();
        names.sort();
        names.dedup();
        names
    }

    #[must_use]
    pub fn has_node(&self, node: &Node) -> bool {
        self.graph.contains(node)
    }

    #[must_use]
    pub fn has_edge(&self, start: &Node, end: &Node) -> bool {
        self.graph.has_edge(start, end)
    }

    /// All edges of both slices, in insertion order.
    #[must_use]
    pub fn edges(&self) -> Vec<Edge> {
        self.graph.edges()
    }

    /// Parents of `node`, in the order their edges were added.
    #[must_use]
    pub fn get_parents(&self, node: &Node) -> Vec<Node> {
        self.graph.parents(node)
    }

    /// Number of materialized `(name, slice)` nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Adds a single edge between `(name, time_slice)` coordinates.
    ///
    /// Missing endpoints are added. Intra-slice edges are stored on slice 0
    /// and mirrored to slice 1; forward inter-slice edges are stored as
    /// slice 0 to slice 1.
    ///
    /// # Errors
    ///
    /// - `StructureError::InvalidDirection` for edges pointing back in time
    /// - `StructureError::UnsupportedSpan` for edges spanning several slices
    /// - `StructureError::SelfLoop` if both ends normalize to the same node
    /// - `StructureError::Cycle` if the edge would close a directed cycle
    pub fn add_edge(&mut self, start: impl Into<TimedNode>, end: impl Into<TimedNode>) -> DbnResult<()> {
        admit_edge(&mut self.graph, &start.into(), &end.into())?;
        Ok(())
    }

    /// Adds every edge in order.
    ///
    /// With [`EdgeBatchMode::Atomic`](crate::EdgeBatchMode::Atomic) a failure
    /// leaves the graph as it was before the call; with `BestEffort` edges
    /// preceding the failure stay committed.
    ///
    /// # Errors
    ///
    /// The first error raised by [`add_edge`](Self::add_edge).
    pub fn add_edges_from<I, A, B>(&mut self, edges: I) -> DbnResult<()>
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<TimedNode>,
        B: Into<TimedNode>,
    {
        if !self.config.edge_batches.is_atomic() {
            for (start, end) in edges {
                admit_edge(&mut self.graph, &start.into(), &end.into())?;
            }
            return Ok(());
        }

        let mut staged = self.graph.clone();
        for (position, (start, end)) in edges.into_iter().enumerate() {
            if let Err(e) = admit_edge(&mut staged, &start.into(), &end.into()) {
                debug!(position, error = %e, "edge batch rejected, rolling back");
                return Err(e);
            }
        }
        self.graph = staged;
        Ok(())
    }

    /// Adds an edge from dynamically-typed `[name, time_slice]` pairs.
    ///
    /// # Errors
    ///
    /// `StructureError::MalformedNode` if either value is not a
    /// `(name, integer)` pair, then as [`add_edge`](Self::add_edge).
    pub fn add_edge_json(&mut self, start: &serde_json::Value, end: &serde_json::Value) -> DbnResult<()> {
        let start = TimedNode::from_json(start)?;
        let end = TimedNode::from_json(end)?;
        self.add_edge(start, end)
    }

    /// Adds edges from a JSON array of `[[name, slice], [name, slice]]` pairs.
    ///
    /// # Errors
    ///
    /// `StructureError::MalformedNode` if the batch or any edge is malformed
    /// (nothing is added in that case), then as
    /// [`add_edges_from`](Self::add_edges_from).
    pub fn add_edges_from_json(&mut self, edges: &serde_json::Value) -> DbnResult<()> {
        let Some(items) = edges.as_array() else {
            return Err(StructureError::MalformedNode {
                reason: format!("expected an array of edges, got {edges}"),
            }
            .into());
        };
        let mut parsed = Vec::with_capacity(items.len());
        for item in items {
            match item.as_array().map(Vec::as_slice) {
                Some([start, end]) => parsed.push((TimedNode::from_json(start)?, TimedNode::from_json(end)?)),
                _ => {
                    return Err(StructureError::MalformedNode {
                        reason: format!("edge must be a [start, end] pair, got {item}"),
                    }
                    .into())
                }
            }
        }
        self.add_edges_from(parsed)
    }

    /// Intra-slice edges, relabeled to `time_slice`.
    ///
    /// # Errors
    ///
    /// `StructureError::InvalidSlice` if `time_slice` is negative.
    pub fn get_intra_edges(&self, time_slice: i64) -> DbnResult<Vec<(TimedNode, TimedNode)>> {
        validate_time_slice(time_slice)?;
        Ok(self
            .graph
            .edges()
            .into_iter()
            .filter(|(start, end)| start.slice == Slice::Current && end.slice == Slice::Current)
            .map(|(start, end)| (start.at(time_slice), end.at(time_slice)))
            .collect())
    }

    /// Edges whose endpoints lie in different slices (always slice 0 to slice 1).
    #[must_use]
    pub fn get_inter_edges(&self) -> Vec<Edge> {
        self.graph
            .edges()
            .into_iter()
            .filter(|(start, end)| start.slice != end.slice)
            .collect()
    }

    /// Sources of the inter-slice edges, relabeled to `time_slice`, each listed once.
    ///
    /// # Errors
    ///
    /// `StructureError::InvalidSlice` if `time_slice` is negative.
    pub fn get_interface_nodes(&self, time_slice: i64) -> DbnResult<Vec<TimedNode>> {
        validate_time_slice(time_slice)?;
        let mut interface: Vec<TimedNode> = Vec::new();
        for (start, _) in self.get_inter_edges() {
            let node = start.at(time_slice);
            if !interface.contains(&node) {
                interface.push(node);
            }
        }
        Ok(interface)
    }

    /// Every base name paired with `time_slice`.
    ///
    /// # Errors
    ///
    /// `StructureError::InvalidSlice` if `time_slice` is negative.
    pub fn get_slice_nodes(&self, time_slice: i64) -> DbnResult<Vec<TimedNode>> {
        validate_time_slice(time_slice)?;
        Ok(self
            .nodes()
            .into_iter()
            .map(|name| TimedNode::new(name, time_slice))
            .collect())
    }
}

/// Maps a proposed edge onto the canonical slices.
fn normalize_edge(start: &TimedNode, end: &TimedNode) -> Result<Edge, StructureError> {
    let (from_slice, to_slice) = (start.time_slice, end.time_slice);
    let (start_slice, end_slice) = if from_slice == to_slice {
        (Slice::Current, Slice::Current)
    } else if from_slice.checked_add(1) == Some(to_slice) {
        (Slice::Current, Slice::Next)
    } else if to_slice.checked_add(1) == Some(from_slice) {
        return Err(StructureError::InvalidDirection { from_slice, to_slice });
    } else {
        return Err(StructureError::UnsupportedSpan { from_slice, to_slice });
    };
    Ok((
        Node::new(start.name.clone(), start_slice),
        Node::new(end.name.clone(), end_slice),
    ))
}

/// Validates and commits one edge, mirroring intra-slice edges into slice 1.
fn admit_edge(graph: &mut DirectedGraph, start: &TimedNode, end: &TimedNode) -> DbnResult<Edge> {
    let (start, end) = normalize_edge(start, end)?;

    if start == end {
        return Err(StructureError::SelfLoop { node: start }.into());
    }
    if graph.contains(&start) && graph.contains(&end) && graph.has_path(&end, &start) {
        return Err(StructureError::Cycle { start, end }.into());
    }

    graph.add_edge(start.clone(), end.clone());
    trace!(start = %start, end = %end, "edge committed");

    if start.slice == end.slice {
        let (mirror_start, mirror_end) = (start.mirrored(), end.mirrored());
        trace!(start = %mirror_start, end = %mirror_end, "intra-slice edge mirrored");
        graph.add_edge(mirror_start, mirror_end);
    }
    Ok((start, end))
}
