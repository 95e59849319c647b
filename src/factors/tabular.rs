//! Tabular CPDs: an explicit value per (state, evidence assignment).

use ndarray::{Array2, IxDyn};
use serde::Serialize;

use super::discrete::DiscreteFactor;
use super::{validate_probabilities, validate_scope, ConditionalDistribution};
use crate::error::CpdError;
use crate::node::Node;

/// Conditional probability table.
///
/// Row `s` holds `P(variable = s | evidence)` for every evidence assignment,
/// one column per assignment.
///
/// # Examples
///
/// ```
/// use dbnet::{ConditionalDistribution, Node, TabularCpd};
///
/// let cpd = TabularCpd::new(
///     Node::next("D"),
///     2,
///     vec![vec![0.6, 0.3], vec![0.4, 0.7]],
///     vec![Node::current("D")],
///     vec![2],
/// )
/// .unwrap();
/// assert_eq!(cpd.values().shape(), &[2, 2]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabularCpd {
    variable: Node,
    variable_card: usize,
    evidence: Vec<Node>,
    evidence_card: Vec<usize>,
    values: Array2<f64>,
}

impl TabularCpd {
    /// Builds a CPD from row-major nested rows, one row per state.
    ///
    /// # Errors
    ///
    /// Returns `CpdError::InvalidShape` if the rows do not form a
    /// `(variable_card, prod(evidence_card))` table, and
    /// `CpdError::InvalidProbability` for negative or non-finite entries.
    pub fn new(
        variable: Node,
        variable_card: usize,
        values: Vec<Vec<f64>>,
        evidence: Vec<Node>,
        evidence_card: Vec<usize>,
    ) -> Result<Self, CpdError> {
        let rows = values.len();
        let cols = values.first().map_or(0, Vec::len);
        if values.iter().any(|row| row.len() != cols) {
            return Err(CpdError::InvalidShape {
                variable,
                reason: "rows have different lengths".to_string(),
            });
        }
        let flat: Vec<f64> = values.into_iter().flatten().collect();
        let table = Array2::from_shape_vec((rows, cols), flat).map_err(|e| CpdError::InvalidShape {
            variable: variable.clone(),
            reason: e.to_string(),
        })?;
        Self::from_array(variable, variable_card, table, evidence, evidence_card)
    }

    /// Builds a CPD from an existing value table.
    ///
    /// # Errors
    ///
    /// Same as [`TabularCpd::new`].
    pub fn from_array(
        variable: Node,
        variable_card: usize,
        values: Array2<f64>,
        evidence: Vec<Node>,
        evidence_card: Vec<usize>,
    ) -> Result<Self, CpdError> {
        let columns = validate_scope(&variable, variable_card, &evidence, &evidence_card)?;
        if values.dim() != (variable_card, columns) {
            return Err(CpdError::InvalidShape {
                reason: format!(
                    "expected shape ({variable_card}, {columns}), got {:?}",
                    values.dim()
                ),
                variable,
            });
        }
        validate_probabilities(&variable, values.iter())?;

        Ok(Self {
            variable,
            variable_card,
            evidence,
            evidence_card,
            values,
        })
    }

    /// A CPD without evidence; the cardinality is the number of values.
    ///
    /// # Errors
    ///
    /// Same as [`TabularCpd::new`].
    pub fn prior(variable: Node, values: Vec<f64>) -> Result<Self, CpdError> {
        let card = values.len();
        let rows = values.into_iter().map(|v| vec![v]).collect();
        Self::new(variable, card, rows, Vec::new(), Vec::new())
    }

    /// `P(variable = state | evidence = assignment)`, if both are in range.
    #[must_use]
    pub fn probability(&self, state: usize, assignment: &[usize]) -> Option<f64> {
        if assignment.len() != self.evidence_card.len() {
            return None;
        }
        let mut column = 0usize;
        for (&value, &card) in assignment.iter().zip(&self.evidence_card) {
            if value >= card {
                return None;
            }
            column = column * card + value;
        }
        self.values.get((state, column)).copied()
    }

    /// The table as a joint factor over `[variable, evidence...]`.
    ///
    /// # Errors
    ///
    /// Returns `CpdError::InvalidShape` if the table cannot be reshaped.
    pub fn to_factor(&self) -> Result<DiscreteFactor, CpdError> {
        let mut cards = Vec::with_capacity(self.evidence_card.len() + 1);
        cards.push(self.variable_card);
        cards.extend_from_slice(&self.evidence_card);
        let values = ndarray::ArrayD::from_shape_vec(
            IxDyn(&cards),
            self.values.iter().copied().collect(),
        )
        .map_err(|e| CpdError::InvalidShape {
            variable: self.variable.clone(),
            reason: e.to_string(),
        })?;
        Ok(DiscreteFactor::from_parts(self.variables(), cards, values))
    }
}

impl ConditionalDistribution for TabularCpd {
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn grade_cpd() -> TabularCpd {
        TabularCpd::new(
            Node::current("G"),
            3,
            vec![
                vec![0.3, 0.05, 0.9, 0.5],
                vec![0.4, 0.25, 0.08, 0.3],
                vec![0.3, 0.7, 0.02, 0.2],
            ],
            vec![Node::current("I"), Node::current("D")],
            vec![2, 2],
        )
        .unwrap()
    }

    #[test]
    fn test_tabular_shape_and_accessors() {
        let cpd = grade_cpd();
        assert_eq!(cpd.variable_card(), 3);
        assert_eq!(cpd.evidence_card(), &[2, 2]);
        assert_eq!(cpd.values().dim(), (3, 4));
        assert_eq!(
            cpd.variables(),
            vec![Node::current("G"), Node::current("I"), Node::current("D")]
        );
    }

    #[test]
    fn test_tabular_marginalize_sums_columns() {
        let sums = grade_cpd().marginalize_variable();
        assert_eq!(sums.len(), 4);
        for s in sums.iter() {
            assert_abs_diff_eq!(*s, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_tabular_probability_lookup() {
        let cpd = grade_cpd();
        // I = 1, D = 0 is column 2.
        assert_eq!(cpd.probability(0, &[1, 0]), Some(0.9));
        assert_eq!(cpd.probability(2, &[0, 1]), Some(0.7));
        assert_eq!(cpd.probability(0, &[2, 0]), None);
        assert_eq!(cpd.probability(3, &[0, 0]), None);
    }

    #[test]
    fn test_tabular_rejects_wrong_shape() {
        let err = TabularCpd::new(
            Node::current("G"),
            3,
            vec![vec![0.5, 0.5], vec![0.5, 0.5]],
            vec![Node::current("I")],
            vec![2],
        )
        .unwrap_err();
        assert!(matches!(err, CpdError::InvalidShape { .. }));

        let ragged = TabularCpd::new(
            Node::current("G"),
            2,
            vec![vec![0.5, 0.5], vec![0.5]],
            vec![Node::current("I")],
            vec![2],
        );
        assert!(ragged.is_err());
    }

    #[test]
    fn test_tabular_rejects_overflowing_evidence_cardinalities() {
        // The column product wraps to 0 if unchecked, which would admit an empty table.
        let huge = usize::MAX / 2 + 1;
        let err = TabularCpd::from_array(
            Node::current("G"),
            2,
            Array2::zeros((2, 0)),
            vec![Node::current("A"), Node::current("B")],
            vec![huge, 2],
        )
        .unwrap_err();
        assert!(matches!(err, CpdError::InvalidShape { ref variable, .. } if *variable == Node::current("G")));
    }

    #[test]
    fn test_tabular_rejects_negative_values() {
        let err = TabularCpd::prior(Node::current("D"), vec![1.2, -0.2]).unwrap_err();
        assert!(matches!(err, CpdError::InvalidProbability { value, .. } if value < 0.0));
    }

    #[test]
    fn test_tabular_accepts_unnormalized_table() {
        // Normalization is a model-level check.
        let cpd = TabularCpd::prior(Node::current("D"), vec![0.3, 0.3]).unwrap();
        assert_abs_diff_eq!(cpd.marginalize_variable()[0], 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_tabular_to_factor() {
        let factor = grade_cpd().to_factor().unwrap();
        assert_eq!(factor.cardinality(), &[3, 2, 2]);
        assert_abs_diff_eq!(factor.values()[[0, 1, 0]], 0.9, epsilon = 1e-12);
    }
}
