//! CPD association and model consistency checks.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use super::DynamicBayesianNetwork;
use crate::config::DuplicateCpdPolicy;
use crate::error::{CpdError, DbnResult};
use crate::factors::{ConditionalDistribution, Cpd, Factor};
use crate::node::{validate_time_slice, Node};

impl DynamicBayesianNetwork {
    /// Associates CPDs with model variables.
    ///
    /// CPDs are registered one by one; those preceding a failure stay
    /// registered.
    ///
    /// # Errors
    ///
    /// - `CpdError::UnsupportedFactorType` for factors that are not tabular, tree or rule CPDs
    /// - `CpdError::UnknownVariable` if the CPD mentions a node absent from the model
    /// - `CpdError::DuplicateCpd` under [`DuplicateCpdPolicy::Reject`]
    /// - `CpdError::CardinalityMismatch` if a cardinality contradicts another registered CPD
    ///   (a CPD being replaced does not count)
    pub fn add_cpds<I, F>(&mut self, cpds: I) -> DbnResult<()>
    where
        I: IntoIterator<Item = F>,
        F: Into<Factor>,
    {
        for factor in cpds {
            self.add_cpd(factor)?;
        }
        Ok(())
    }

    /// Associates a single CPD. See [`add_cpds`](Self::add_cpds).
    ///
    /// # Errors
    ///
    /// As [`add_cpds`](Self::add_cpds).
    pub fn add_cpd(&mut self, factor: impl Into<Factor>) -> DbnResult<()> {
        let cpd = Cpd::try_from(factor.into())?;

        for variable in cpd.variables() {
            if !self.graph.contains(&variable) {
                return Err(CpdError::UnknownVariable { variable }.into());
            }
        }

        let variable = cpd.variable().clone();
        let replacing = self.cpds.contains_key(&variable);
        if replacing {
            match self.config.duplicate_cpds {
                DuplicateCpdPolicy::Reject => return Err(CpdError::DuplicateCpd { variable }.into()),
                DuplicateCpdPolicy::Replace => warn!(variable = %variable, "replacing registered CPD"),
            }
        }

        let declared: Vec<(&str, usize)> = std::iter::once((variable.name.as_str(), cpd.variable_card()))
            .chain(
                cpd.evidence()
                    .iter()
                    .map(|e| e.name.as_str())
                    .zip(cpd.evidence_card().iter().copied()),
            )
            .collect();
        // A replaced CPD's own declarations do not constrain its replacement.
        let rebuilt = replacing.then(|| self.cardinalities_without(&variable));
        let registry = rebuilt.as_ref().unwrap_or(&self.cardinalities);
        for (i, &(name, card)) in declared.iter().enumerate() {
            let registered = registry
                .get(name)
                .copied()
                .or_else(|| declared[..i].iter().find(|(n, _)| *n == name).map(|&(_, c)| c));
            if let Some(registered) = registered {
                if registered != card {
                    return Err(CpdError::CardinalityMismatch {
                        name: name.to_string(),
                        declared: card,
                        registered,
                    }
                    .into());
                }
            }
        }
        if let Some(rebuilt) = rebuilt {
            self.cardinalities = rebuilt;
        }
        for (name, card) in declared {
            self.cardinalities.insert(name.to_string(), card);
        }

        debug!(variable = %variable, kind = cpd.kind(), "CPD registered");
        self.cpds.insert(variable, cpd);
        Ok(())
    }

    /// Cardinalities declared by every registered CPD except the one owned by `skipped`.
    fn cardinalities_without(&self, skipped: &Node) -> BTreeMap<String, usize> {
        let mut registry = BTreeMap::new();
        for cpd in self.cpds.values().filter(|cpd| cpd.variable() != skipped) {
            registry.insert(cpd.variable().name.clone(), cpd.variable_card());
            for (evidence, &card) in cpd.evidence().iter().zip(cpd.evidence_card()) {
                registry.insert(evidence.name.clone(), card);
            }
        }
        registry
    }

    /// The CPD owned by `node`, if one is registered.
    ///
    /// # Errors
    ///
    /// `CpdError::UnknownVariable` if `node` is not in the model.
    pub fn get_cpd(&self, node: &Node) -> DbnResult<Option<&Cpd>> {
        if !self.graph.contains(node) {
            return Err(CpdError::UnknownVariable {
                variable: node.clone(),
            }
            .into());
        }
        Ok(self.cpds.get(node))
    }

    /// CPDs whose variables all lie in `time_slice`.
    ///
    /// # Errors
    ///
    /// `StructureError::InvalidSlice` if `time_slice` is negative.
    pub fn get_slice_cpds(&self, time_slice: i64) -> DbnResult<Vec<&Cpd>> {
        validate_time_slice(time_slice)?;
        let names: BTreeSet<String> = self.nodes().into_iter().collect();
        Ok(self
            .cpds
            .values()
            .filter(|cpd| {
                cpd.variables()
                    .iter()
                    .all(|v| v.slice.index() == time_slice && names.contains(&v.name))
            })
            .collect())
    }

    /// All registered CPDs, ordered by variable.
    pub fn cpds(&self) -> impl Iterator<Item = &Cpd> {
        self.cpds.values()
    }

    /// Registered state count of a base variable name.
    #[must_use]
    pub fn cardinality(&self, name: &str) -> Option<usize> {
        self.cardinalities.get(name).copied()
    }

    /// Every registered `(name, cardinality)` pair, ordered by name.
    pub fn cardinalities(&self) -> impl Iterator<Item = (&str, usize)> {
        self.cardinalities.iter().map(|(name, &card)| (name.as_str(), card))
    }

    /// Checks every registered CPD against the graph.
    ///
    /// Nodes without a CPD are skipped. Checks run in node insertion order
    /// and stop at the first failing node.
    ///
    /// # Errors
    ///
    /// - `CpdError::InconsistentParents` if a CPD's evidence set differs from the node's parents
    /// - `CpdError::ProbabilityNormalization` if some evidence column does not sum to 1
    ///   within the configured tolerance
    pub fn check_model(&self) -> DbnResult<()> {
        let tolerance = self.config.normalization_tolerance;
        for node in self.graph.nodes() {
            let Some(cpd) = self.cpds.get(node) else {
                continue;
            };

            let parents = self.graph.parents(node);
            let evidence: BTreeSet<&Node> = cpd.evidence().iter().collect();
            if evidence != parents.iter().collect::<BTreeSet<_>>() {
                debug!(node = %node, "CPD evidence does not match parents");
                return Err(CpdError::InconsistentParents {
                    node: node.clone(),
                    evidence: cpd.evidence().to_vec(),
                    parents,
                }
                .into());
            }

            for (column, &sum) in cpd.marginalize_variable().iter().enumerate() {
                if (sum - 1.0).abs() > tolerance {
                    debug!(node = %node, column, sum, "CPD column is not normalized");
                    return Err(CpdError::ProbabilityNormalization {
                        node: node.clone(),
                        column,
                        sum,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}
