//! Evaluation of a trial step.

use log::debug;
use nalgebra::DVector;

use crate::core::{Derivatives, Objective};

use super::subproblem::Step;

/// Result of evaluating the objective in the trial point.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Trial point `x + s`.
    pub x: DVector<f64>,
    /// Derivatives in the trial point. Reused as the next iterate's bundle if
    /// the step is accepted.
    pub trial: Derivatives,
    /// Actual reduction `f(x) - f(x + s)`.
    pub actual: f64,
    /// Ratio of the actual and predicted reduction.
    pub ratio: f64,
}

impl Evaluation {
    /// Determines whether the trial point and its value are finite. If not,
    /// the run diverged.
    pub fn is_finite(&self) -> bool {
        self.trial.value.is_finite() && self.x.iter().all(|xi| xi.is_finite())
    }
}

/// Evaluates the objective in `x + s`, calling the objective exactly once.
///
/// The predicted reduction of the step is positive, the subproblem solver
/// pre-rejects the step otherwise.
pub fn evaluate<F>(f: &F, x: &DVector<f64>, fx: f64, step: &Step) -> Evaluation
where
    F: Objective + ?Sized,
{
    let trial_x = x + &step.s;
    let trial = f.eval(&trial_x);

    let actual = fx - trial.value;
    let ratio = actual / step.predicted;

    debug!(
        "gain ratio = {} / {} = {}",
        actual, step.predicted, ratio
    );

    Evaluation {
        x: trial_x,
        trial,
        actual,
        ratio,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::dvector;

    use super::*;
    use crate::testing::QuadraticBowl;

    #[test]
    fn ratio_of_exact_model_is_one() {
        let f = QuadraticBowl::new(dvector![1.0, -1.0]);
        let x = dvector![0.0, 0.0];
        let fx = f.eval(&x).value;

        // Full Newton step of an exact quadratic model.
        let s = dvector![1.0, -1.0];
        let predicted = fx - f.eval(&s).value;
        let step = Step {
            s,
            predicted,
            lambda: 0.0,
            passes: 1,
        };

        let evaluation = evaluate(&f, &x, fx, &step);
        assert!(evaluation.is_finite());
        assert_eq!(evaluation.x, dvector![1.0, -1.0]);
        assert_relative_eq!(evaluation.actual, fx, epsilon = 1e-12);
        assert_relative_eq!(evaluation.ratio, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn overshoot_has_negative_ratio() {
        let f = QuadraticBowl::new(dvector![0.0, 0.0]);
        let x = dvector![1.0, 0.0];
        let fx = f.eval(&x).value;

        let step = Step {
            s: dvector![-3.0, 0.0],
            predicted: 1.0,
            lambda: 1.0,
            passes: 1,
        };

        let evaluation = evaluate(&f, &x, fx, &step);
        assert!(evaluation.actual < 0.0);
        assert!(evaluation.ratio < 0.0);
    }
}
