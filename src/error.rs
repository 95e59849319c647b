//! Error types for dbnet.
//!
//! All errors are strongly typed using thiserror, grouped by the concern
//! that raised them. Structural errors come from node and edge admission,
//! CPD errors from factor construction, registration and model checks.

use thiserror::Error;

use crate::node::Node;

/// Errors raised while admitting nodes and edges or querying slices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("Nodes must be of type (node, time_slice): {reason}")]
    MalformedNode {
        reason: String,
    },

    #[error("Edges in backward direction are not allowed: ({from_slice} -> {to_slice})")]
    InvalidDirection {
        from_slice: i64,
        to_slice: i64,
    },

    #[error("Edges over multiple time slices are not supported: ({from_slice} -> {to_slice})")]
    UnsupportedSpan {
        from_slice: i64,
        to_slice: i64,
    },

    #[error("Self loops are not allowed: {node}")]
    SelfLoop {
        node: Node,
    },

    #[error("Loops are not allowed. Adding the edge from ({start} -> {end}) forms a loop")]
    Cycle {
        start: Node,
        end: Node,
    },

    #[error("The time slice should be a value greater than or equal to zero, got {time_slice}")]
    InvalidSlice {
        time_slice: i64,
    },
}

/// Errors raised by CPD construction, registration and consistency checks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CpdError {
    #[error("Unsupported factor type '{kind}': cpds should be tabular, tree or rule CPDs")]
    UnsupportedFactorType {
        kind: &'static str,
    },

    #[error("CPD references variable not in the model: {variable}")]
    UnknownVariable {
        variable: Node,
    },

    #[error("CPD associated with {node} doesn't have proper parents associated with it (evidence: {evidence:?}, parents: {parents:?})")]
    InconsistentParents {
        node: Node,
        evidence: Vec<Node>,
        parents: Vec<Node>,
    },

    #[error("Sum of probabilities of states for node {node} is {sum} (evidence column {column}), expected 1")]
    ProbabilityNormalization {
        node: Node,
        column: usize,
        sum: f64,
    },

    #[error("Invalid CPD shape for {variable}: {reason}")]
    InvalidShape {
        variable: Node,
        reason: String,
    },

    #[error("Invalid probability {value} in CPD for {variable}")]
    InvalidProbability {
        variable: Node,
        value: f64,
    },

    #[error("Invalid tree CPD for {variable}: {reason}")]
    InvalidTree {
        variable: Node,
        reason: String,
    },

    #[error("Rule CPD for {variable} has no rule covering evidence assignment {assignment:?}")]
    UncoveredAssignment {
        variable: Node,
        assignment: Vec<usize>,
    },

    #[error("Factor must range over at least one variable")]
    EmptyScope,

    #[error("A CPD for {variable} is already registered")]
    DuplicateCpd {
        variable: Node,
    },

    #[error("Cardinality of '{name}' declared as {declared}, previously registered as {registered}")]
    CardinalityMismatch {
        name: String,
        declared: usize,
        registered: usize,
    },
}

/// Top-level error type for dbnet.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DbnError {
    #[error("Structure error: {0}")]
    Structure(#[from] StructureError),

    #[error("CPD error: {0}")]
    Cpd(#[from] CpdError),

    #[error("Configuration error: {message}")]
    Config {
        message: String,
    },
}

impl DbnError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns true if this is a structural (node/edge/slice) error.
    #[must_use]
    pub const fn is_structure(&self) -> bool {
        matches!(self, Self::Structure(_))
    }

    /// Returns true if this is a CPD error.
    #[must_use]
    pub const fn is_cpd(&self) -> bool {
        matches!(self, Self::Cpd(_))
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Returns the node a model check or admission failure is about, if any.
    #[must_use]
    pub fn node(&self) -> Option<&Node> {
        match self {
            Self::Structure(StructureError::SelfLoop { node }) => Some(node),
            Self::Structure(StructureError::Cycle { start, .. }) => Some(start),
            Self::Cpd(
                CpdError::UnknownVariable { variable }
                | CpdError::InvalidShape { variable, .. }
                | CpdError::InvalidProbability { variable, .. }
                | CpdError::InvalidTree { variable, .. }
                | CpdError::UncoveredAssignment { variable, .. }
                | CpdError::DuplicateCpd { variable },
            ) => Some(variable),
            Self::Cpd(
                CpdError::InconsistentParents { node, .. }
                | CpdError::ProbabilityNormalization { node, .. },
            ) => Some(node),
            _ => None,
        }
    }
}

/// Result type alias for dbnet operations.
pub type DbnResult<T> = Result<T, DbnError>;
