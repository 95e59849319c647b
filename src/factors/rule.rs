//! Rule-based CPDs: ordered partial evidence assignments mapped to distributions.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::{evidence_assignments, validate_probabilities, validate_scope, ConditionalDistribution};
use crate::error::CpdError;
use crate::node::Node;

/// One rule: when every condition holds, the owned variable follows `distribution`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// `(evidence variable, state)` pairs that must all match. Empty matches everything.
    pub conditions: Vec<(Node, usize)>,
    /// Distribution over the owned variable's states.
    pub distribution: Vec<f64>,
}

impl Rule {
    #[must_use]
    pub fn new(conditions: Vec<(Node, usize)>, distribution: Vec<f64>) -> Self {
        Self {
            conditions,
            distribution,
        }
    }

    /// Catch-all rule.
    #[must_use]
    pub fn otherwise(distribution: Vec<f64>) -> Self {
        Self::new(Vec::new(), distribution)
    }
}

/// CPD given by an ordered rule list; the first matching rule wins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleCpd {
    variable: Node,
    variable_card: usize,
    evidence: Vec<Node>,
    evidence_card: Vec<usize>,
    rules: Vec<Rule>,
    #[serde(skip)]
    values: Array2<f64>,
}

impl RuleCpd {
    /// Builds a rule CPD and expands it into its value table.
    ///
    /// # Errors
    ///
    /// Returns `CpdError::InvalidShape` for conditions on non-evidence
    /// variables, out-of-range states or distributions of the wrong length,
    /// and `CpdError::UncoveredAssignment` if some evidence assignment
    /// matches no rule.
    pub fn new(
        variable: Node,
        variable_card: usize,
        evidence: Vec<Node>,
        evidence_card: Vec<usize>,
        rules: Vec<Rule>,
    ) -> Result<Self, CpdError> {
        let columns = validate_scope(&variable, variable_card, &evidence, &evidence_card)?;

        // Conditions resolved to evidence positions, per rule.
        let mut resolved: Vec<Vec<(usize, usize)>> = Vec::with_capacity(rules.len());
        for rule in &rules {
            if rule.distribution.len() != variable_card {
                return Err(CpdError::InvalidShape {
                    variable,
                    reason: format!(
                        "rule distribution has {} entries, expected {variable_card}",
                        rule.distribution.len()
                    ),
                });
            }
            validate_probabilities(&variable, &rule.distribution)?;

            let mut conditions = Vec::with_capacity(rule.conditions.len());
            for (node, state) in &rule.conditions {
                let Some(pos) = evidence.iter().position(|e| e == node) else {
                    return Err(CpdError::InvalidShape {
                        reason: format!("rule conditions on {node}, which is not evidence"),
                        variable,
                    });
                };
                if *state >= evidence_card[pos] {
                    return Err(CpdError::InvalidShape {
                        reason: format!("state {state} out of range for {node}"),
                        variable,
                    });
                }
                conditions.push((pos, *state));
            }
            resolved.push(conditions);
        }

        let assignments = evidence_assignments(&evidence_card, columns);
        let mut values = Array2::zeros((variable_card, assignments.len()));
        for (column, assignment) in assignments.iter().enumerate() {
            let matched = resolved
                .iter()
                .position(|conds| conds.iter().all(|&(pos, state)| assignment[pos] == state));
            let Some(idx) = matched else {
                return Err(CpdError::UncoveredAssignment {
                    variable,
                    assignment: assignment.clone(),
                });
            };
            for (state, &p) in rules[idx].distribution.iter().enumerate() {
                values[(state, column)] = p;
            }
        }

        Ok(Self {
            variable,
            variable_card,
            evidence,
            evidence_card,
            rules,
            values,
        })
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

impl ConditionalDistribution for RuleCpd {
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
