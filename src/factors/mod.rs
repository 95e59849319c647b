//! Conditional probability distributions attached to model variables.
//!
//! The model accepts a closed set of CPD representations, collected in the
//! [`Cpd`] tagged union. Every variant exposes the same capability set
//! through [`ConditionalDistribution`]: owned variable, evidence,
//! cardinalities, a `(variable_card, prod(evidence_card))` value table, and
//! marginalization over the owned variable.
//!
//! Value tables use the column order where the first evidence variable is
//! the most significant digit of the column index.

mod discrete;
mod rule;
mod tabular;
mod tree;

use ndarray::{Array1, Array2, Axis};
use serde::Serialize;

use crate::error::CpdError;
use crate::node::Node;

pub use discrete::DiscreteFactor;
pub use rule::{Rule, RuleCpd};
pub use tabular::TabularCpd;
pub use tree::{TreeCpd, TreeNode};

/// Capability set shared by every CPD representation the model accepts.
pub trait ConditionalDistribution {
    /// The variable whose distribution this CPD gives.
    fn variable(&self) -> &Node;

    /// Number of states of the owned variable.
    fn variable_card(&self) -> usize;

    /// Evidence (parent) variables, in column order.
    fn evidence(&self) -> &[Node];

    /// Number of states of each evidence variable.
    fn evidence_card(&self) -> &[usize];

    /// Value table of shape `(variable_card, prod(evidence_card))`.
    fn values(&self) -> &Array2<f64>;

    /// Owned variable followed by the evidence variables.
    fn variables(&self) -> Vec<Node> {
        std::iter::once(self.variable().clone())
            .chain(self.evidence().iter().cloned())
            .collect()
    }

    /// Sums out the owned variable, leaving one entry per evidence assignment.
    fn marginalize_variable(&self) -> Array1<f64> {
        self.values().sum_axis(Axis(0))
    }
}

/// The CPD kinds a model can hold.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cpd {
    Tabular(TabularCpd),
    Tree(TreeCpd),
    Rule(RuleCpd),
}

impl Cpd {
    /// Short name of the representation.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Tabular(_) => "tabular",
            Self::Tree(_) => "tree",
            Self::Rule(_) => "rule",
        }
    }

    fn inner(&self) -> &dyn ConditionalDistribution {
        match self {
            Self::Tabular(c) => c,
            Self::Tree(c) => c,
            Self::Rule(c) => c,
        }
    }
}

impl ConditionalDistribution for Cpd {
    fn variable(&self) -> &Node {
        self.inner().variable()
    }

    fn variable_card(&self) -> usize {
        self.inner().variable_card()
    }

    fn evidence(&self) -> &[Node] {
        self.inner().evidence()
    }

    fn evidence_card(&self) -> &[usize] {
        self.inner().evidence_card()
    }

    fn values(&self) -> &Array2<f64> {
        self.inner().values()
    }
}

/// Any factor a caller may hand to the model.
///
/// Joint [`DiscreteFactor`]s have no owned variable and are refused by
/// `add_cpds`.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum Factor {
    Tabular(TabularCpd),
    Tree(TreeCpd),
    Rule(RuleCpd),
    Discrete(DiscreteFactor),
}

impl Factor {
    /// Short name of the representation.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Tabular(_) => "tabular",
            Self::Tree(_) => "tree",
            Self::Rule(_) => "rule",
            Self::Discrete(_) => "discrete",
        }
    }
}

impl TryFrom<Factor> for Cpd {
    type Error = CpdError;

    fn try_from(factor: Factor) -> Result<Self, Self::Error> {
        match factor {
            Factor::Tabular(c) => Ok(Self::Tabular(c)),
            Factor::Tree(c) => Ok(Self::Tree(c)),
            Factor::Rule(c) => Ok(Self::Rule(c)),
            other @ Factor::Discrete(_) => Err(CpdError::UnsupportedFactorType { kind: other.kind() }),
        }
    }
}

impl From<Cpd> for Factor {
    fn from(cpd: Cpd) -> Self {
        match cpd {
            Cpd::Tabular(c) => Self::Tabular(c),
            Cpd::Tree(c) => Self::Tree(c),
            Cpd::Rule(c) => Self::Rule(c),
        }
    }
}

impl From<TabularCpd> for Factor {
    fn from(cpd: TabularCpd) -> Self {
        Self::Tabular(cpd)
    }
}

impl From<TreeCpd> for Factor {
    fn from(cpd: TreeCpd) -> Self {
        Self::Tree(cpd)
    }
}

impl From<RuleCpd> for Factor {
    fn from(cpd: RuleCpd) -> Self {
        Self::Rule(cpd)
    }
}

impl From<DiscreteFactor> for Factor {
    fn from(factor: DiscreteFactor) -> Self {
        Self::Discrete(factor)
    }
}

impl From<TabularCpd> for Cpd {
    fn from(cpd: TabularCpd) -> Self {
        Self::Tabular(cpd)
    }
}

impl From<TreeCpd> for Cpd {
    fn from(cpd: TreeCpd) -> Self {
        Self::Tree(cpd)
    }
}

impl From<RuleCpd> for Cpd {
    fn from(cpd: RuleCpd) -> Self {
        Self::Rule(cpd)
    }
}

/// Every evidence assignment, in value-table column order.
///
/// `columns` is the product of `cards`, as returned by [`validate_scope`].
pub(crate) fn evidence_assignments(cards: &[usize], columns: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::with_capacity(columns);
    let mut current = vec![0usize; cards.len()];
    for _ in 0..columns {
        out.push(current.clone());
        for pos in (0..cards.len()).rev() {
            current[pos] += 1;
            if current[pos] < cards[pos] {
                break;
            }
            current[pos] = 0;
        }
    }
    out
}

/// Checks the evidence list against its cardinalities and the owned variable.
///
/// Returns the number of value-table columns, `prod(evidence_card)`.
pub(crate) fn validate_scope(
    variable: &Node,
    variable_card: usize,
    evidence: &[Node],
    evidence_card: &[usize],
) -> Result<usize, CpdError> {
    let shape = |reason: String| CpdError::InvalidShape {
        variable: variable.clone(),
        reason,
    };
    if variable_card == 0 {
        return Err(shape("variable cardinality must be at least 1".to_string()));
    }
    if evidence.len() != evidence_card.len() {
        return Err(shape(format!(
            "{} evidence variables but {} evidence cardinalities",
            evidence.len(),
            evidence_card.len()
        )));
    }
    if let Some(pos) = evidence_card.iter().position(|&c| c == 0) {
        return Err(shape(format!("evidence {} has cardinality 0", evidence[pos])));
    }
    if evidence.contains(variable) {
        return Err(shape("variable cannot be its own evidence".to_string()));
    }
    for (i, e) in evidence.iter().enumerate() {
        if evidence[..i].contains(e) {
            return Err(shape(format!("evidence {e} listed twice")));
        }
    }
    evidence_card
        .iter()
        .try_fold(1usize, |columns, &card| columns.checked_mul(card))
        .ok_or_else(|| shape(format!("evidence cardinalities {evidence_card:?} overflow the column count")))
}

/// Rejects negative and non-finite entries.
pub(crate) fn validate_probabilities<'a>(
    variable: &Node,
    values: impl IntoIterator<Item = &'a f64>,
) -> Result<(), CpdError> {
    for &value in values {
        if !value.is_finite() || value < 0.0 {
            return Err(CpdError::InvalidProbability {
                variable: variable.clone(),
                value,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evidence_assignments_order() {
        let all = evidence_assignments(&[2, 3], 6);
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], vec![0, 0]);
        assert_eq!(all[1], vec![0, 1]);
        assert_eq!(all[3], vec![1, 0]);
        assert_eq!(all[5], vec![1, 2]);
    }

    #[test]
    fn test_evidence_assignments_without_evidence() {
        assert_eq!(evidence_assignments(&[], 1), vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_validate_scope_rejects_mismatched_lengths() {
        let err = validate_scope(&Node::current("G"), 3, &[Node::current("I")], &[2, 2]).unwrap_err();
        assert!(matches!(err, CpdError::InvalidShape { .. }));
    }

    #[test]
    fn test_validate_scope_returns_column_count() {
        let columns = validate_scope(&Node::current("G"), 3, &[Node::current("I"), Node::current("D")], &[2, 3]);
        assert_eq!(columns, Ok(6));
        assert_eq!(validate_scope(&Node::current("D"), 2, &[], &[]), Ok(1));
    }

    #[test]
    fn test_validate_scope_rejects_overflowing_cardinalities() {
        let err = validate_scope(
            &Node::current("G"),
            2,
            &[Node::current("A"), Node::current("B")],
            &[usize::MAX, 2],
        )
        .unwrap_err();
        assert!(matches!(err, CpdError::InvalidShape { ref reason, .. } if reason.contains("overflow")));
    }

    #[test]
    fn test_validate_scope_rejects_self_evidence_and_duplicates() {
        let g = Node::current("G");
        assert!(validate_scope(&g, 2, &[g.clone()], &[2]).is_err());
        let i = Node::current("I");
        assert!(validate_scope(&g, 2, &[i.clone(), i], &[2, 2]).is_err());
    }

    #[test]
    fn test_discrete_factor_is_not_a_cpd() {
        let factor = DiscreteFactor::new(vec![Node::current("A")], vec![2], vec![0.5, 0.5]).unwrap();
        let err = Cpd::try_from(Factor::from(factor)).unwrap_err();
        assert_eq!(err, CpdError::UnsupportedFactorType { kind: "discrete" });
    }

    #[test]
    fn test_cpd_dispatch() {
        let tab = TabularCpd::prior(Node::current("D"), vec![0.6, 0.4]).unwrap();
        let cpd = Cpd::from(tab);
        assert_eq!(cpd.kind(), "tabular");
        assert_eq!(cpd.variable(), &Node::current("D"));
        assert_eq!(cpd.variables(), vec![Node::current("D")]);
        let sums = cpd.marginalize_variable();
        assert_eq!(sums.len(), 1);
        approx::assert_abs_diff_eq!(sums[0], 1.0, epsilon = 1e-12);
    }
}
