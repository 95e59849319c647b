//! # dbnet - Two-slice Dynamic Bayesian Networks
//!
//! dbnet models a probability distribution over a sequence of time-indexed
//! variable copies. A two-slice template (slice 0 and slice 1) stands for
//! an unrolled process of arbitrary length.
//!
//! ## Core Concepts
//!
//! - **Node**: a variable name in one of the two canonical slices
//! - **Intra-slice edge**: dependency inside one slice, mirrored automatically
//! - **Inter-slice edge**: forward dependency from slice 0 to slice 1
//! - **CPD**: tabular, tree or rule conditional distribution of one variable
//! - **Moral graph**: undirected graph handed to inference engines
//!
//! ## Usage
//!
//! ```rust
//! use dbnet::{DynamicBayesianNetwork, Node, TabularCpd};
//!
//! let mut dbn = DynamicBayesianNetwork::new();
//! dbn.add_nodes_from(["D", "I", "G"]);
//! dbn.add_edges_from([(("D", 0), ("G", 0)), (("I", 0), ("G", 0)), (("D", 0), ("D", 1))])?;
//!
//! dbn.add_cpds([
//!     TabularCpd::prior(Node::current("D"), vec![0.6, 0.4])?,
//!     TabularCpd::prior(Node::current("I"), vec![0.7, 0.3])?,
//! ])?;
//! dbn.check_model()?;
//!
//! let moral = dbn.moralize();
//! assert!(moral.has_edge(&Node::current("D"), &Node::current("I")));
//! # Ok::<(), dbnet::DbnError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod factors;
pub mod graph;
pub mod model;
pub mod node;

// Re-export primary types at crate root for convenience
pub use config::{DbnConfig, DuplicateCpdPolicy, EdgeBatchMode, DEFAULT_NORMALIZATION_TOLERANCE};
pub use error::{CpdError, DbnError, DbnResult, StructureError};
pub use factors::{
	ConditionalDistribution, Cpd, DiscreteFactor, Factor, Rule, RuleCpd, TabularCpd, TreeCpd, TreeNode,
};
pub use graph::{DirectedGraph, Edge, UndirectedGraph};
pub use model::DynamicBayesianNetwork;
pub use node::{Node, Slice, TimedNode};
