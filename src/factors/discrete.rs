//! Joint potentials over a set of discrete variables.

use ndarray::{ArrayD, Axis, IxDyn};

use crate::error::CpdError;
use crate::node::Node;

/// A non-negative potential over the joint states of `variables`.
///
/// Unlike a CPD it has no owned variable, so the model does not accept it
/// as a CPD. Inference engines build these from CPDs via
/// [`TabularCpd::to_factor`](super::TabularCpd::to_factor).
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteFactor {
    variables: Vec<Node>,
    cardinality: Vec<usize>,
    values: ArrayD<f64>,
}

impl DiscreteFactor {
    /// Builds a factor from a row-major flat value vector.
    ///
    /// # Errors
    ///
    /// Returns `CpdError::EmptyScope` without variables, `CpdError::InvalidShape`
    /// when the value count does not match the cardinalities, and
    /// `CpdError::InvalidProbability` for negative or non-finite entries.
    pub fn new(variables: Vec<Node>, cardinality: Vec<usize>, values: Vec<f64>) -> Result<Self, CpdError> {
        let Some(first) = variables.first() else {
            return Err(CpdError::EmptyScope);
        };
        if variables.len() != cardinality.len() {
            return Err(CpdError::InvalidShape {
                variable: first.clone(),
                reason: format!(
                    "{} variables but {} cardinalities",
                    variables.len(),
                    cardinality.len()
                ),
            });
        }
        super::validate_probabilities(first, values.iter())?;
        let values = ArrayD::from_shape_vec(IxDyn(&cardinality), values).map_err(|e| CpdError::InvalidShape {
            variable: first.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_parts(variables, cardinality, values))
    }

    pub(crate) fn from_parts(variables: Vec<Node>, cardinality: Vec<usize>, values: ArrayD<f64>) -> Self {
        Self {
            variables,
            cardinality,
            values,
        }
    }

    #[must_use]
    pub fn variables(&self) -> &[Node] {
        &self.variables
    }

    #[must_use]
    pub fn cardinality(&self) -> &[usize] {
        &self.cardinality
    }

    #[must_use]
    pub const fn values(&self) -> &ArrayD<f64> {
        &self.values
    }

    /// Sums out `variables`, returning the reduced factor.
    ///
    /// # Errors
    ///
    /// Returns `CpdError::UnknownVariable` if a variable is not in scope and
    /// `CpdError::EmptyScope` if every variable would be summed out.
    pub fn marginalize(&self, variables: &[Node]) -> Result<Self, CpdError> {
        let mut axes = Vec::with_capacity(variables.len());
        for variable in variables {
            let Some(axis) = self.variables.iter().position(|v| v == variable) else {
                return Err(CpdError::UnknownVariable {
                    variable: variable.clone(),
                });
            };
            if !axes.contains(&axis) {
                axes.push(axis);
            }
        }
        if axes.len() == self.variables.len() {
            return Err(CpdError::EmptyScope);
        }

        // Highest axis first so remaining indices stay valid.
        axes.sort_unstable_by(|a, b| b.cmp(a));
        let mut values = self.values.clone();
        let mut remaining = self.variables.clone();
        let mut cards = self.cardinality.clone();
        for axis in axes {
            values = values.sum_axis(Axis(axis));
            remaining.remove(axis);
            cards.remove(axis);
        }
        Ok(Self::from_parts(remaining, cards, values))
    }

    /// Scales the values so they sum to one. A zero factor is left unchanged.
    pub fn normalize(&mut self) {
        let total = self.values.sum();
        if total > 0.0 {
            self.values.mapv_inplace(|v| v / total);
        }
    }
}
