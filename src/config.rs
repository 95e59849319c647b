//! Model configuration.
//!
//! Controls the numeric tolerance of model checks and the two policies the
//! model has to pick explicitly: what happens when a second CPD is
//! registered for a variable, and whether batch edge insertion is atomic.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DbnError, DbnResult};

/// Absolute tolerance used when checking that CPD columns sum to one.
pub const DEFAULT_NORMALIZATION_TOLERANCE: f64 = 0.01;

/// What `add_cpds` does with a CPD for a variable that already has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateCpdPolicy {
    /// Fail with `CpdError::DuplicateCpd`.
    #[default]
    Reject,

    /// Last write wins.
    Replace,
}

/// Failure semantics of `add_edges_from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EdgeBatchMode {
    /// All edges are committed or none are.
    #[default]
    Atomic,

    /// Edges before the first failure stay committed.
    BestEffort,
}

impl EdgeBatchMode {
    /// True for [`EdgeBatchMode::Atomic`].
    #[must_use]
    pub const fn is_atomic(&self) -> bool {
        matches!(self, Self::Atomic)
    }
}

/// Configuration for a [`DynamicBayesianNetwork`](crate::DynamicBayesianNetwork).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbnConfig {
    /// Absolute tolerance for the sum-to-one check.
    pub normalization_tolerance: f64,
    pub duplicate_cpds: DuplicateCpdPolicy,
    pub edge_batches: EdgeBatchMode,
}

impl Default for DbnConfig {
    fn default() -> Self {
        Self {
            normalization_tolerance: DEFAULT_NORMALIZATION_TOLERANCE,
            duplicate_cpds: DuplicateCpdPolicy::default(),
            edge_batches: EdgeBatchMode::default(),
        }
    }
}

impl DbnConfig {
    /// Checks the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `DbnError::Config` if the tolerance is negative or not finite.
    pub fn validate(self) -> DbnResult<Self> {
        if !self.normalization_tolerance.is_finite() || self.normalization_tolerance < 0.0 {
            return Err(DbnError::config(format!(
                "normalization_tolerance must be finite and >= 0, got {}",
                self.normalization_tolerance
            )));
        }
        Ok(self)
    }

    /// Parses and validates a JSON configuration. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns `DbnError::Config` on malformed JSON or invalid values.
    pub fn from_json_str(json: &str) -> DbnResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| DbnError::config(format!("invalid config JSON: {e}")))?;
        config.validate()
    }

    /// Reads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns `DbnError::Config` if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> DbnResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| DbnError::config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.normalization_tolerance = tolerance;
        self
    }

    #[must_use]
    pub const fn with_duplicate_cpds(mut self, policy: DuplicateCpdPolicy) -> Self {
        self.duplicate_cpds = policy;
        self
    }

    #[must_use]
    pub const fn with_edge_batches(mut self, mode: EdgeBatchMode) -> Self {
        self.edge_batches = mode;
        self
    }
}
