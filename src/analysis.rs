//! Diagnostics derived from the record of a run.
//!
//! The [convergence profile](convergence_profile) pairs, for every iteration,
//! the weight controlled by the policy with the closed-form proxy weight and
//! the gap to the optimal value. It is the data behind the usual "sigma and
//! `f(x_k) - f*` versus iteration" plots.

use serde::{Deserialize, Serialize};

use crate::core::{RunResult, StepOutcome};

/// Weights below this threshold are considered zero.
pub const ZERO_WEIGHT: f64 = 1e-12;

/// Status of an iteration in the convergence profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatus {
    /// The step was accepted.
    Accepted,
    /// The step was evaluated and rejected.
    Rejected,
    /// The step was discarded before evaluation.
    PreRejected,
    /// Last iteration of a converged run.
    Converged,
}

/// One point of the convergence profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfilePoint {
    /// Iteration index.
    pub iteration: usize,
    /// Weight used in the iteration.
    pub sigma: f64,
    /// Proxy weight of the iteration.
    pub sigma_approx: f64,
    /// Gap `f(x_k) - f*` before the step.
    pub gap: f64,
    /// Status of the step.
    pub status: StepStatus,
    /// Whether the weight was nonzero.
    pub regularized: bool,
}

/// Builds the convergence profile of a run, given the optimal value
/// `f_star`.
pub fn convergence_profile(result: &RunResult, f_star: f64) -> Vec<ProfilePoint> {
    let history = result.history();
    let last = history.len().checked_sub(1);

    history
        .outcomes()
        .iter()
        .enumerate()
        .map(|(k, outcome)| {
            let sigma = history.sigma()[k];

            let status = if result.converged() && Some(k) == last {
                StepStatus::Converged
            } else {
                match outcome {
                    StepOutcome::Accepted => StepStatus::Accepted,
                    StepOutcome::Rejected => StepStatus::Rejected,
                    StepOutcome::PreRejected(_) => StepStatus::PreRejected,
                }
            };

            ProfilePoint {
                iteration: k,
                sigma,
                sigma_approx: history.sigma_approx()[k],
                gap: history.f()[k] - f_star,
                status,
                regularized: sigma.abs() > ZERO_WEIGHT,
            }
        })
        .collect()
}

/// Number of iterations with each outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    /// Accepted steps.
    pub accepted: usize,
    /// Rejected steps.
    pub rejected: usize,
    /// Pre-rejected steps.
    pub pre_rejected: usize,
}

/// Counts the outcomes of all iterations of a run.
pub fn outcome_counts(result: &RunResult) -> OutcomeCounts {
    result
        .history()
        .outcomes()
        .iter()
        .fold(OutcomeCounts::default(), |mut counts, outcome| {
            match outcome {
                StepOutcome::Accepted => counts.accepted += 1,
                StepOutcome::Rejected => counts.rejected += 1,
                StepOutcome::PreRejected(_) => counts.pre_rejected += 1,
            }
            counts
        })
}

#[cfg(test)]
mod tests {
    use nalgebra::dvector;

    use super::*;
    use crate::algo::Ar3;
    use crate::options::RunConfig;
    use crate::testing::{DoubleWell, QuadraticBowl};

    #[test]
    fn profile_of_converged_run() {
        let f = QuadraticBowl::new(dvector![1.0, -1.0]);
        let result = Ar3::new().run(&f, &dvector![1.1, -1.1]);
        let profile = convergence_profile(&result, 0.0);

        assert_eq!(profile.len(), result.iterations());
        let (last, rest) = profile.split_last().unwrap();
        assert_eq!(last.status, StepStatus::Converged);
        assert!(rest.iter().all(|p| p.status == StepStatus::Accepted));
        assert!(profile.iter().all(|p| p.regularized && p.gap >= 0.0));
        assert_eq!(profile[0].gap, result.history().f()[0]);
    }

    #[test]
    fn profile_of_rejections() {
        let mut config = RunConfig::default();
        config.set_sigma_initial(0.01);

        let f = DoubleWell;
        let result = Ar3::with_config(config).unwrap().run(&f, &dvector![0.0, 1.0]);
        let profile = convergence_profile(&result, -0.25);

        assert_eq!(profile[0].status, StepStatus::Rejected);
        assert_eq!(profile[0].gap, 1.25);

        let counts = outcome_counts(&result);
        assert_eq!(
            counts.accepted + counts.rejected + counts.pre_rejected,
            result.iterations()
        );
        assert_eq!(counts.accepted, result.accepted_steps());
        assert!(counts.rejected >= 1);
    }

    #[test]
    fn profile_of_unregularized_run() {
        let mut config = RunConfig::default();
        config.set_max_iterations(5);

        let f = DoubleWell;
        let result = Ar3::unregularized(config)
            .unwrap()
            .run(&f, &dvector![0.5, 0.5]);

        let profile = convergence_profile(&result, -0.25);
        assert!(profile.iter().all(|p| !p.regularized));
    }

    #[test]
    fn empty_profile() {
        let f = QuadraticBowl::default();
        let result = Ar3::new().run(&f, &dvector![0.0, 0.0]);

        assert!(convergence_profile(&result, 0.0).is_empty());
        assert_eq!(outcome_counts(&result), OutcomeCounts::default());
    }
}
