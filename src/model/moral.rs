//! Moral graph construction.

use super::DynamicBayesianNetwork;
use crate::graph::UndirectedGraph;

impl DynamicBayesianNetwork {
    /// Builds the moral graph of the two-slice template.
    ///
    /// Starts from the undirected projection of every edge, then marries the
    /// parents of each node pairwise. Isolated nodes are kept. The network is
    /// not modified.
    ///
    /// # Examples
    ///
    /// ```
    /// use dbnet::{DynamicBayesianNetwork, Node};
    ///
    /// let dbn = DynamicBayesianNetwork::from_edges([(("D", 0), ("G", 0)), (("I", 0), ("G", 0))]).unwrap();
    /// let moral = dbn.moralize();
    /// assert!(moral.has_edge(&Node::current("D"), &Node::current("I")));
    /// assert!(moral.has_edge(&Node::next("D"), &Node::next("I")));
    /// ```
    #[must_use]
    pub fn moralize(&self) -> UndirectedGraph {
        let mut moral = self.graph.to_undirected();
        for node in self.graph.nodes() {
            let parents = self.graph.parents(node);
            for (i, a) in parents.iter().enumerate() {
                for b in &parents[i + 1..] {
                    moral.add_edge(a.clone(), b.clone());
                }
            }
        }
        moral
    }
}
