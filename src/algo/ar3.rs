//! Adaptive regularized third-order Newton method.
//!
//! In every iteration, the objective is approximated by its third-order
//! Taylor expansion with a quartic regularization term (see
//! [`TaylorModel`]). The minimizer of the model is taken as the trial step,
//! which is accepted if the objective decreased by at least `eta` times the
//! decrease predicted by the model. The regularization weight is controlled
//! by a [`RegularizationPolicy`]: the [`Adaptive`] policy gives the AR3
//! method, the [`Unregularized`] policy gives the plain third-order Newton
//! method with the same acceptance test.
//!
//! The loop is strictly sequential and never fails. Every way a run can end
//! is described by the [`Termination`] of the returned [`RunResult`], and
//! every iteration leaves exactly one entry in its [`RunHistory`].
//!
//! # References
//!
//! \[1\] [Worst-case evaluation complexity for unconstrained nonlinear
//! optimization using high-order regularized
//! models](https://link.springer.com/article/10.1007/s10107-016-1065-8)
//!
//! \[2\] [Adaptive regularization with cubics on manifolds and a tensor
//! variant](https://arxiv.org/abs/1806.00065)

use log::{debug, warn};
use nalgebra::DVector;

use crate::core::{
    Derivatives, Objective, RegularizationPolicy, RunHistory, RunResult, StepOutcome, Termination,
};
use crate::model::TaylorModel;
use crate::options::{ConfigError, ConvergenceTest, RunConfig};

use super::regularization::{classify, Adaptive, Unregularized};
use super::step::evaluate;
use super::subproblem::{proxy_weight, Subproblem};

/// The solver loop, parametrized by the policy controlling the weight.
///
/// See [module](self) documentation for more details.
#[derive(Debug, Clone)]
pub struct Ar3<P = Adaptive> {
    config: RunConfig,
    policy: P,
    subproblem: Subproblem,
}

impl Ar3<Adaptive> {
    /// Initializes AR3 solver with default options.
    pub fn new() -> Self {
        let config = RunConfig::default();
        let subproblem = Subproblem::new(&config);

        Self {
            config,
            policy: Adaptive,
            subproblem,
        }
    }

    /// Initializes AR3 solver with given options.
    pub fn with_config(config: RunConfig) -> Result<Self, ConfigError> {
        Self::with_policy(config, Adaptive)
    }
}

impl Default for Ar3<Adaptive> {
    fn default() -> Self {
        Self::new()
    }
}

impl Ar3<Unregularized> {
    /// Initializes the unregularized baseline with given options.
    pub fn unregularized(config: RunConfig) -> Result<Self, ConfigError> {
        Self::with_policy(config, Unregularized)
    }
}

impl<P: RegularizationPolicy> Ar3<P> {
    /// Initializes the solver with given options and weight policy.
    pub fn with_policy(config: RunConfig, policy: P) -> Result<Self, ConfigError> {
        config.validate()?;
        let subproblem = Subproblem::new(&config);

        Ok(Self {
            config,
            policy,
            subproblem,
        })
    }

    /// Options of the solver.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Policy controlling the weight.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Name of the method.
    pub fn name(&self) -> &'static str {
        P::NAME
    }

    /// Minimizes the objective starting in `x0`.
    pub fn run<F>(&self, f: &F, x0: &DVector<f64>) -> RunResult
    where
        F: Objective + ?Sized,
    {
        let max_iterations = self.config.max_iterations();
        let eta = self.config.eta();

        let mut x = x0.clone();
        let mut d = f.eval(&x);
        let mut sigma = self.policy.initial(&self.config);
        let mut history = RunHistory::new(d.value, sigma);

        // Decrease achieved by the last step, if it was accepted.
        let mut last_change = None;
        let mut k = 0;

        let termination = loop {
            let model = match TaylorModel::new(&x, &d, sigma) {
                Ok(model) => model,
                Err(fault) => {
                    warn!("{} stopped in iteration {}: {}", P::NAME, k, fault);
                    break Termination::DataFault { iteration: k, fault };
                }
            };

            if self.is_converged(&d, last_change) {
                debug!("converged in iteration {} with f = {}", k, d.value);
                break Termination::Converged;
            }

            if k == max_iterations {
                debug!("iteration budget exhausted");
                break Termination::MaxIterations;
            }

            let sigma_approx = proxy_weight(&d, k);

            let outcome = match self.subproblem.solve(&model) {
                Err(failure) => {
                    debug!("step pre-rejected: {}", failure);
                    StepOutcome::PreRejected(failure.reason())
                }
                Ok(step) => {
                    debug!(
                        "iteration {}: sigma = {}, ||s|| = {}, passes = {}",
                        k,
                        sigma,
                        step.s.norm(),
                        step.passes
                    );

                    let evaluation = evaluate(f, &x, d.value, &step);

                    if !evaluation.is_finite() {
                        sigma = self.policy.update(sigma, &StepOutcome::Rejected, &self.config);
                        history.record(StepOutcome::Rejected, sigma_approx, sigma, d.value);
                        warn!(
                            "{} diverged in iteration {}: f = {}",
                            P::NAME,
                            k,
                            evaluation.trial.value
                        );
                        break Termination::Diverged { iteration: k };
                    }

                    let outcome = classify(evaluation.ratio, eta);

                    if outcome.is_accepted() {
                        debug!("step accepted, gain ratio = {}", evaluation.ratio);
                        last_change = Some(evaluation.actual);
                        x = evaluation.x;
                        d = evaluation.trial;
                    } else {
                        debug!("step rejected, threshold for accepting = {}", eta);
                    }

                    outcome
                }
            };

            if !outcome.is_accepted() {
                last_change = None;
            }

            sigma = self.policy.update(sigma, &outcome, &self.config);
            history.record(outcome, sigma_approx, sigma, d.value);
            k += 1;
        };

        let iterations = history.len();
        RunResult::new(x, iterations, termination, history)
    }

    fn is_converged(&self, d: &Derivatives, last_change: Option<f64>) -> bool {
        let tolerance = self.config.tolerance();

        match self.config.convergence() {
            ConvergenceTest::GradientNorm => d.gradient.norm() < tolerance,
            ConvergenceTest::ValueChange => last_change.map_or(false, |change| change < tolerance),
        }
    }
}
