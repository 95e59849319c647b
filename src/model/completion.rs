//! Two-slice completion: synthesizing the missing slice's CPDs.
//!
//! Templates are usually authored on slice 0 plus the transition CPDs. For
//! every registered CPD whose mirrored variable has no CPD yet, completion
//! copies the value table onto the mirrored variable, conditioned on that
//! variable's actual parents. This assumes the process is stationary.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use super::DynamicBayesianNetwork;
use crate::error::DbnResult;
use crate::factors::{ConditionalDistribution, Cpd, TabularCpd};
use crate::node::Node;

impl DynamicBayesianNetwork {
    /// Synthesizes missing mirrored CPDs, running [`check_model`](Self::check_model)
    /// after each one. Returns the variables that received a CPD.
    ///
    /// # Errors
    ///
    /// The first error from building, registering or checking a synthesized CPD.
    pub fn initialize_initial_state(&mut self) -> DbnResult<Vec<Node>> {
        self.initialize_initial_state_with(Self::check_model)
    }

    /// Like [`initialize_initial_state`](Self::initialize_initial_state), with
    /// `validate` run after every synthesized CPD instead of `check_model`.
    ///
    /// CPDs registered before a failure stay registered.
    ///
    /// # Errors
    ///
    /// The first error from synthesis or from `validate`.
    pub fn initialize_initial_state_with<F>(&mut self, mut validate: F) -> DbnResult<Vec<Node>>
    where
        F: FnMut(&Self) -> DbnResult<()>,
    {
        let templates: Vec<Node> = self.cpds.keys().cloned().collect();
        let mut synthesized = Vec::new();

        for variable in templates {
            let Some(template) = self.cpds.get(&variable) else {
                continue;
            };
            let Some(cpd) = self.mirror_cpd(template)? else {
                continue;
            };

            let target = cpd.variable().clone();
            debug!(source = %variable, target = %target, evidence = ?cpd.evidence(), "synthesized mirrored CPD");
            self.add_cpd(cpd)?;
            validate(&*self)?;
            synthesized.push(target);
        }

        Ok(synthesized)
    }

    /// Builds the CPD of `template`'s mirrored variable, or `None` if it needs none.
    fn mirror_cpd(&self, template: &Cpd) -> DbnResult<Option<TabularCpd>> {
        let target = template.variable().mirrored();
        if !self.graph.contains(&target) {
            trace!(target = %target, "mirrored variable not in the model");
            return Ok(None);
        }
        if self.cpds.contains_key(&target) {
            return Ok(None);
        }

        let parents = self.graph.parents(&target);
        if let Some(first) = parents.first() {
            if parents.iter().any(|p| p.slice != first.slice) {
                trace!(target = %target, "parents span both slices, not synthesizing");
                return Ok(None);
            }
        }

        let mirrored_evidence: Vec<Node> = template.evidence().iter().map(Node::mirrored).collect();
        let (evidence, evidence_card) = if parents.is_empty() {
            (Vec::new(), Vec::new())
        } else if same_members(&mirrored_evidence, &parents) {
            // Keep the template's column order.
            (mirrored_evidence, template.evidence_card().to_vec())
        } else {
            (parents, template.evidence_card().to_vec())
        };

        // One row per state, reused for the mirrored variable.
        let values = template.values().clone();
        let cpd = TabularCpd::from_array(target, template.variable_card(), values, evidence, evidence_card)?;
        Ok(Some(cpd))
    }
}

fn same_members(a: &[Node], b: &[Node]) -> bool {
    a.len() == b.len() && a.iter().collect::<BTreeSet<_>>() == b.iter().collect::<BTreeSet<_>>()
}
