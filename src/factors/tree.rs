//! Tree-structured CPDs: evidence splits down to leaf distributions.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::{evidence_assignments, validate_probabilities, validate_scope, ConditionalDistribution};
use crate::error::CpdError;
use crate::node::Node;

/// A node of a CPD tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Distribution over the owned variable's states.
    Leaf(Vec<f64>),
    /// Branch on an evidence variable, one child per state.
    Split { on: Node, children: Vec<TreeNode> },
}

impl TreeNode {
    #[must_use]
    pub fn leaf(distribution: Vec<f64>) -> Self {
        Self::Leaf(distribution)
    }

    #[must_use]
    pub fn split(on: Node, children: Vec<Self>) -> Self {
        Self::Split { on, children }
    }
}

/// CPD whose distributions are shared across evidence assignments that reach
/// the same leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeCpd {
    variable: Node,
    variable_card: usize,
    evidence: Vec<Node>,
    evidence_card: Vec<usize>,
    root: TreeNode,
    #[serde(skip)]
    values: Array2<f64>,
}

impl TreeCpd {
    /// Builds a tree CPD and expands it into its value table.
    ///
    /// # Errors
    ///
    /// Returns `CpdError::InvalidTree` if a split names a non-evidence
    /// variable, has the wrong number of children, or a leaf has the wrong
    /// length. Scope and probability errors are as for tabular CPDs.
    pub fn new(
        variable: Node,
        variable_card: usize,
        evidence: Vec<Node>,
        evidence_card: Vec<usize>,
        root: TreeNode,
    ) -> Result<Self, CpdError> {
        let columns = validate_scope(&variable, variable_card, &evidence, &evidence_card)?;

        let assignments = evidence_assignments(&evidence_card, columns);
        let mut values = Array2::zeros((variable_card, assignments.len()));
        for (column, assignment) in assignments.iter().enumerate() {
            let leaf = Self::descend(&variable, variable_card, &evidence, &evidence_card, &root, assignment)?;
            validate_probabilities(&variable, leaf)?;
            for (state, &p) in leaf.iter().enumerate() {
                values[(state, column)] = p;
            }
        }

        Ok(Self {
            variable,
            variable_card,
            evidence,
            evidence_card,
            root,
            values,
        })
    }

    fn descend<'t>(
        variable: &Node,
        variable_card: usize,
        evidence: &[Node],
        evidence_card: &[usize],
        mut node: &'t TreeNode,
        assignment: &[usize],
    ) -> Result<&'t [f64], CpdError> {
        let invalid = |reason: String| CpdError::InvalidTree {
            variable: variable.clone(),
            reason,
        };
        loop {
            match node {
                TreeNode::Leaf(distribution) => {
                    if distribution.len() != variable_card {
                        return Err(invalid(format!(
                            "leaf has {} entries, expected {variable_card}",
                            distribution.len()
                        )));
                    }
                    return Ok(distribution);
                }
                TreeNode::Split { on, children } => {
                    let Some(pos) = evidence.iter().position(|e| e == on) else {
                        return Err(invalid(format!("split on {on}, which is not evidence")));
                    };
                    if children.len() != evidence_card[pos] {
                        return Err(invalid(format!(
                            "split on {on} has {} children, expected {}",
                            children.len(),
                            evidence_card[pos]
                        )));
                    }
                    node = &children[assignment[pos]];
                }
            }
        }
    }

    #[must_use]
    pub const fn root(&self) -> &TreeNode {
        &self.root
    }
}

impl ConditionalDistribution for TreeCpd {
    fn variable(&self) -> &Node {
        &self.variable
    }

    fn variable_card(&self) -> usize {
        self.variable_card
    }

    fn evidence(&self) -> &[Node] {
        &self.evidence
    }

    fn evidence_card(&self) -> &[usize] {
        &self.evidence_card
    }

    fn values(&self) -> &Array2<f64> {
        &self.values
    }
}
