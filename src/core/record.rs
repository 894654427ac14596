//! Outcome of single iterations and the record of a whole run.

use std::fmt;

use getset::{CopyGetters, Getters};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use super::objective::DataFault;

/// Reason for discarding a step before evaluating the objective in the trial
/// point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreRejection {
    /// The secular equation did not converge within the inner budget.
    SubproblemStall,
    /// The step is not finite or exceeds the step ceiling.
    StepOverflow,
    /// The model does not predict any decrease for the step.
    NonpositiveModelReduction,
}

impl PreRejection {
    /// Stable textual identifier of the reason.
    pub fn reason(&self) -> &'static str {
        match self {
            PreRejection::SubproblemStall => "subproblem-stall",
            PreRejection::StepOverflow => "step-overflow",
            PreRejection::NonpositiveModelReduction => "nonpositive-model-reduction",
        }
    }
}

impl fmt::Display for PreRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Outcome of one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "kebab-case")]
pub enum StepOutcome {
    /// The trial point became the new iterate.
    Accepted,
    /// The trial point was evaluated and found wanting.
    Rejected,
    /// The step was discarded without evaluating the trial point.
    PreRejected(PreRejection),
}

impl StepOutcome {
    /// Whether the iterate moved.
    pub fn is_accepted(&self) -> bool {
        matches!(self, StepOutcome::Accepted)
    }

    /// Pre-rejection reason, if any.
    pub fn reason(&self) -> Option<PreRejection> {
        match self {
            StepOutcome::PreRejected(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Sequences recorded during a run, one entry per iteration.
///
/// The weight and objective sequences additionally contain the entry for the
/// starting point, so that
///
/// ```text
/// len(f) == len(sigma) == len(outcomes) + 1 == len(sigma_approx) + 1
/// ```
///
/// holds at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunHistory {
    sigma: Vec<f64>,
    sigma_approx: Vec<f64>,
    f: Vec<f64>,
    outcomes: Vec<StepOutcome>,
}

impl RunHistory {
    pub(crate) fn new(f0: f64, sigma0: f64) -> Self {
        Self {
            sigma: vec![sigma0],
            sigma_approx: Vec::new(),
            f: vec![f0],
            outcomes: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, outcome: StepOutcome, sigma_approx: f64, sigma: f64, f: f64) {
        self.outcomes.push(outcome);
        self.sigma_approx.push(sigma_approx);
        self.sigma.push(sigma);
        self.f.push(f);
    }

    /// Weight before each step plus the final weight.
    ///
    /// Lies within the configured floor and ceiling for the
    /// [`Adaptive`](crate::Adaptive) policy. Other policies are not clamped,
    /// e.g., [`Unregularized`](crate::Unregularized) records zeros.
    pub fn sigma(&self) -> &[f64] {
        &self.sigma
    }

    /// Diagnostic proxy weight of each iteration.
    pub fn sigma_approx(&self) -> &[f64] {
        &self.sigma_approx
    }

    /// Objective value in each visited iterate, including the starting point.
    pub fn f(&self) -> &[f64] {
        &self.f
    }

    /// Outcome of each iteration.
    pub fn outcomes(&self) -> &[StepOutcome] {
        &self.outcomes
    }

    /// Number of recorded iterations.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Determines whether no iteration was recorded.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Checks the length invariant between the sequences.
    pub fn is_consistent(&self) -> bool {
        let n = self.outcomes.len();
        self.f.len() == n + 1 && self.sigma.len() == n + 1 && self.sigma_approx.len() == n
    }
}

/// Reason why a run stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Termination {
    /// The stopping tolerance was satisfied.
    Converged,
    /// The iteration budget was exhausted.
    MaxIterations,
    /// The objective value in a trial point was not finite.
    Diverged {
        /// Index of the iteration in which it happened.
        iteration: usize,
    },
    /// The objective returned invalid derivative data.
    DataFault {
        /// Index of the iteration whose iterate is faulty.
        iteration: usize,
        /// Description of the fault.
        fault: DataFault,
    },
}

/// Record of a finished run.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters, Serialize, Deserialize)]
pub struct RunResult {
    /// Final iterate. For a data fault, this is the faulty point.
    #[getset(get = "pub")]
    x: DVector<f64>,
    /// Number of performed iterations.
    #[getset(get_copy = "pub")]
    iterations: usize,
    /// Why the run stopped.
    #[getset(get = "pub")]
    termination: Termination,
    /// Recorded sequences.
    #[getset(get = "pub")]
    history: RunHistory,
}

impl RunResult {
    pub(crate) fn new(
        x: DVector<f64>,
        iterations: usize,
        termination: Termination,
        history: RunHistory,
    ) -> Self {
        Self {
            x,
            iterations,
            termination,
            history,
        }
    }

    /// Whether the run converged.
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }

    /// Objective value in the final iterate.
    pub fn value(&self) -> f64 {
        // The history always holds the starting point.
        self.history.f[self.history.f.len() - 1]
    }

    /// Number of accepted steps.
    pub fn accepted_steps(&self) -> usize {
        self.history
            .outcomes
            .iter()
            .filter(|outcome| outcome.is_accepted())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_strings() {
        assert_eq!(
            StepOutcome::PreRejected(PreRejection::SubproblemStall)
                .reason()
                .map(|r| r.reason()),
            Some("subproblem-stall")
        );
        assert_eq!(PreRejection::StepOverflow.to_string(), "step-overflow");
        assert_eq!(
            PreRejection::NonpositiveModelReduction.to_string(),
            "nonpositive-model-reduction"
        );
        assert_eq!(StepOutcome::Rejected.reason(), None);
    }

    #[test]
    fn history_lengths() {
        let mut history = RunHistory::new(1.0, 0.5);
        assert!(history.is_consistent());
        assert!(history.is_empty());

        history.record(StepOutcome::Accepted, 0.1, 0.25, 0.5);
        history.record(StepOutcome::Rejected, 0.2, 0.5, 0.5);

        assert!(history.is_consistent());
        assert_eq!(history.len(), 2);
        assert_eq!(history.f(), &[1.0, 0.5, 0.5]);
        assert_eq!(history.sigma(), &[0.5, 0.25, 0.5]);
    }
}
