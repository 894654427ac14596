//! Run configuration shared by all solver variants.

use getset::{CopyGetters, Setters};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Order of the Taylor model. Only third-order models are supported.
pub const MODEL_ORDER: usize = 3;

/// Stopping test applied in every iterate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConvergenceTest {
    /// Norm of the gradient falls below the tolerance.
    GradientNorm,
    /// Decrease of the objective achieved by the last accepted step falls
    /// below the tolerance. Never satisfied right after a rejection.
    ValueChange,
}

/// Error returned when the configuration is not usable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// An option is out of its valid range.
    #[error("option `{option}` must be {requirement}")]
    Invalid {
        /// Name of the option.
        option: &'static str,
        /// Human-readable constraint.
        requirement: &'static str,
    },
    /// The model order is not supported.
    #[error("model order {0} is not supported, only third-order models are")]
    UnsupportedModelOrder(usize),
    /// The dimension of the starting point does not match the objective.
    #[error("invalid dimensionality: expected {expected}, found {found}")]
    Dimension {
        /// Dimension of the objective.
        expected: usize,
        /// Dimension of the supplied data.
        found: usize,
    },
}

impl ConfigError {
    fn invalid(option: &'static str, requirement: &'static str) -> Self {
        Self::Invalid {
            option,
            requirement,
        }
    }
}

/// Options for the [`Ar3`](crate::algo::Ar3) solver loop.
#[derive(Debug, Clone, CopyGetters, Setters, Serialize, Deserialize)]
#[getset(get_copy = "pub", set = "pub")]
#[serde(default)]
pub struct RunConfig {
    /// Maximum number of iterations. Default: `100`.
    max_iterations: usize,
    /// Tolerance of the convergence test. Default: `1e-8`.
    tolerance: f64,
    /// Which convergence test is used. Default: gradient norm.
    convergence: ConvergenceTest,
    /// Threshold for the ratio of actual and predicted reduction that needs
    /// to be reached to accept the step. Default: `0.1`.
    eta: f64,
    /// Factor by which the weight is increased after a (pre-)rejection.
    /// Default: `2`.
    growth_factor: f64,
    /// Factor by which the weight is decreased after an acceptance.
    /// Default: `0.5`.
    shrink_factor: f64,
    /// Initial regularization weight. Default: `1`.
    sigma_initial: f64,
    /// Minimum allowed weight. Default: `1e-8`.
    sigma_floor: f64,
    /// Maximum allowed weight. Default: `1e8`.
    sigma_ceiling: f64,
    /// Steps longer than this are pre-rejected. Default: `1e6`.
    step_ceiling: f64,
    /// Iteration budget of each inner loop of the subproblem solver.
    /// Default: `100`.
    max_inner_iterations: usize,
    /// Relative tolerance of the subproblem solver. Default: `1e-10`.
    inner_tolerance: f64,
    /// Order of the Taylor model. Default: `3`.
    model_order: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-8,
            convergence: ConvergenceTest::GradientNorm,
            eta: 0.1,
            growth_factor: 2.0,
            shrink_factor: 0.5,
            sigma_initial: 1.0,
            sigma_floor: 1e-8,
            sigma_ceiling: 1e8,
            step_ceiling: 1e6,
            max_inner_iterations: 100,
            inner_tolerance: 1e-10,
            model_order: MODEL_ORDER,
        }
    }
}

impl RunConfig {
    /// Checks that all options are within their valid ranges.
    ///
    /// Growth and shrink factors of exactly one are accepted and freeze the
    /// weight.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::invalid("max_iterations", "positive"));
        }
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(ConfigError::invalid("tolerance", "positive and finite"));
        }
        if !(self.eta > 0.0 && self.eta < 1.0) {
            return Err(ConfigError::invalid("eta", "in (0, 1)"));
        }
        if !(self.growth_factor >= 1.0 && self.growth_factor.is_finite()) {
            return Err(ConfigError::invalid(
                "growth_factor",
                "at least 1 and finite",
            ));
        }
        if !(self.shrink_factor > 0.0 && self.shrink_factor <= 1.0) {
            return Err(ConfigError::invalid("shrink_factor", "in (0, 1]"));
        }
        if !(self.sigma_floor >= 0.0 && self.sigma_floor.is_finite()) {
            return Err(ConfigError::invalid(
                "sigma_floor",
                "non-negative and finite",
            ));
        }
        if !(self.sigma_ceiling > self.sigma_floor && self.sigma_ceiling.is_finite()) {
            return Err(ConfigError::invalid(
                "sigma_ceiling",
                "greater than sigma_floor and finite",
            ));
        }
        if !(self.sigma_initial >= 0.0 && self.sigma_initial.is_finite()) {
            return Err(ConfigError::invalid(
                "sigma_initial",
                "non-negative and finite",
            ));
        }
        if !(self.step_ceiling > 0.0 && self.step_ceiling.is_finite()) {
            return Err(ConfigError::invalid("step_ceiling", "positive and finite"));
        }
        if self.max_inner_iterations == 0 {
            return Err(ConfigError::invalid("max_inner_iterations", "positive"));
        }
        if !(self.inner_tolerance > 0.0 && self.inner_tolerance < 1.0) {
            return Err(ConfigError::invalid("inner_tolerance", "in (0, 1)"));
        }
        if self.model_order != MODEL_ORDER {
            return Err(ConfigError::UnsupportedModelOrder(self.model_order));
        }

        Ok(())
    }
}
