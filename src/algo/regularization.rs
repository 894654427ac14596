//! Policies controlling the regularization weight.
//!
//! After every iteration, the weight is adapted to how well the model fitted
//! the objective. A step that was accepted indicates a good fit and the
//! weight is decreased, allowing longer steps. A rejected or pre-rejected
//! step increases the weight, which shortens the next step and makes the
//! model more convex.

use log::debug;

use crate::core::{RegularizationPolicy, StepOutcome};
use crate::options::RunConfig;

/// Adaptive weight of the AR3 method.
///
/// The weight is multiplied by the shrink factor after an accepted step and
/// by the growth factor otherwise. It always stays within
/// `[sigma_floor, sigma_ceiling]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Adaptive;

impl RegularizationPolicy for Adaptive {
    const NAME: &'static str = "AR3";

    fn initial(&self, config: &RunConfig) -> f64 {
        clamp(config.sigma_initial(), config)
    }

    fn update(&self, sigma: f64, outcome: &StepOutcome, config: &RunConfig) -> f64 {
        let next = if outcome.is_accepted() {
            sigma * config.shrink_factor()
        } else {
            sigma * config.growth_factor()
        };
        let next = clamp(next, config);

        if next < sigma {
            debug!("shrink sigma from {} to {}", sigma, next);
        } else if next > sigma {
            debug!("expand sigma from {} to {}", sigma, next);
        }

        next
    }
}

fn clamp(sigma: f64, config: &RunConfig) -> f64 {
    sigma.max(config.sigma_floor()).min(config.sigma_ceiling())
}

/// Third-order Newton method without regularization. The weight is zero for
/// the whole run while the acceptance test still applies.
///
/// The weight bounds `sigma_floor` and `sigma_ceiling` of [`RunConfig`] are
/// not applied, so the recorded weight stays zero even below the floor.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unregularized;

impl RegularizationPolicy for Unregularized {
    const NAME: &'static str = "Unregularized";

    fn initial(&self, _: &RunConfig) -> f64 {
        0.0
    }

    fn update(&self, _: f64, _: &StepOutcome, _: &RunConfig) -> f64 {
        0.0
    }
}

/// Classifies an evaluated step by its gain ratio. A ratio that is not a
/// number is a rejection.
pub fn classify(ratio: f64, eta: f64) -> StepOutcome {
    if ratio >= eta {
        StepOutcome::Accepted
    } else {
        StepOutcome::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PreRejection;

    #[test]
    fn adaptive_moves_within_bounds() {
        let mut config = RunConfig::default();
        config
            .set_sigma_floor(0.1)
            .set_sigma_ceiling(10.0)
            .set_sigma_initial(100.0);

        let policy = Adaptive;
        assert_eq!(policy.initial(&config), 10.0);

        let pre_rejected = StepOutcome::PreRejected(PreRejection::StepOverflow);
        assert_eq!(policy.update(1.0, &StepOutcome::Accepted, &config), 0.5);
        assert_eq!(policy.update(1.0, &StepOutcome::Rejected, &config), 2.0);
        assert_eq!(policy.update(1.0, &pre_rejected, &config), 2.0);

        assert_eq!(policy.update(0.15, &StepOutcome::Accepted, &config), 0.1);
        assert_eq!(policy.update(8.0, &StepOutcome::Rejected, &config), 10.0);
    }

    #[test]
    fn unit_factors_freeze_weight() {
        let mut config = RunConfig::default();
        config
            .set_growth_factor(1.0)
            .set_shrink_factor(1.0)
            .set_sigma_floor(0.0)
            .set_sigma_initial(0.0);

        let policy = Adaptive;
        let sigma = policy.initial(&config);
        assert_eq!(sigma, 0.0);
        assert_eq!(policy.update(sigma, &StepOutcome::Rejected, &config), 0.0);
        assert_eq!(policy.update(sigma, &StepOutcome::Accepted, &config), 0.0);
    }

    #[test]
    fn unregularized_is_zero() {
        let config = RunConfig::default();
        assert_eq!(Unregularized.initial(&config), 0.0);
        assert_eq!(
            Unregularized.update(0.0, &StepOutcome::Rejected, &config),
            0.0
        );
    }

    #[test]
    fn classification() {
        assert_eq!(classify(0.1, 0.1), StepOutcome::Accepted);
        assert_eq!(classify(0.09, 0.1), StepOutcome::Rejected);
        assert_eq!(classify(-1.0, 0.1), StepOutcome::Rejected);
        assert_eq!(classify(f64::NAN, 0.1), StepOutcome::Rejected);
    }
}
