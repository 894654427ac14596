use crate::options::RunConfig;

use super::record::StepOutcome;

/// Strategy that controls the regularization weight of the solver.
///
/// The solver loop depends on the weight only through this trait: it asks for
/// the weight to start with and, after every iteration, for the weight to use
/// in the next one given the outcome of the step. Implementations must be
/// pure functions of their inputs, otherwise runs are not reproducible.
///
/// ## Implementing a policy
///
/// ```rust
/// use ar3::{RegularizationPolicy, RunConfig, StepOutcome};
///
/// // Keeps the initial weight no matter what.
/// struct Constant;
///
/// impl RegularizationPolicy for Constant {
///     const NAME: &'static str = "Constant";
///
///     fn initial(&self, config: &RunConfig) -> f64 {
///         config.sigma_initial()
///     }
///
///     fn update(&self, sigma: f64, _: &StepOutcome, _: &RunConfig) -> f64 {
///         sigma
///     }
/// }
/// ```
pub trait RegularizationPolicy {
    /// Name of the method the policy turns the solver into.
    const NAME: &'static str;

    /// Weight in effect before the first step.
    fn initial(&self, config: &RunConfig) -> f64;

    /// Weight for the next iteration after a step with given outcome was
    /// taken with weight `sigma`.
    fn update(&self, sigma: f64, outcome: &StepOutcome, config: &RunConfig) -> f64;
}
