//! Minimization of the regularized third-order model.
//!
//! A stationary point of the model satisfies
//!
//! ```text
//! (H + 1/2 T[s] + sigma ||s||^2 I) s = -g
//! ```
//!
//! The solver freezes the tensor term in the previous approximation `s_j`,
//! which turns the problem into a quadratic model with quartic regularization
//! and matrix `B_j = H + 1/2 T[s_j]`. That one is solved exactly by finding
//! the multiplier `lambda = sigma ||s||^2` from the *secular equation*
//!
//! ```text
//! ||(B_j + lambda I)^-1 g|| = sqrt(lambda / sigma)
//! ```
//!
//! in the eigenbasis of `B_j`. The passes are repeated until the step
//! settles. For zero weight, the passes solve `B_j s = -g` directly.
//!
//! # References
//!
//! \[1\] [Evaluation Complexity of Algorithms for Nonconvex
//! Optimization](https://epubs.siam.org/doi/book/10.1137/1.9781611976991)
//!
//! \[2\] [Trust Region Methods](https://epubs.siam.org/doi/book/10.1137/1.9780898719857)

use log::{debug, log_enabled, trace, Level};
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

use crate::core::{Derivatives, PreRejection};
use crate::model::TaylorModel;
use crate::options::RunConfig;

/// Failure of the subproblem solve. The step is pre-rejected with the
/// corresponding [`PreRejection`] reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubproblemFailure {
    /// The secular equation or the outer passes did not converge.
    #[error("subproblem solve did not converge within the inner budget")]
    Stall,
    /// The step is not finite or longer than the step ceiling.
    #[error("step is not finite or exceeds the step ceiling")]
    Overflow,
    /// The model does not decrease along the step.
    #[error("model does not predict any decrease")]
    NonpositiveReduction,
}

impl SubproblemFailure {
    /// Pre-rejection reason recorded in the history.
    pub fn reason(&self) -> PreRejection {
        match self {
            SubproblemFailure::Stall => PreRejection::SubproblemStall,
            SubproblemFailure::Overflow => PreRejection::StepOverflow,
            SubproblemFailure::NonpositiveReduction => PreRejection::NonpositiveModelReduction,
        }
    }
}

impl From<SubproblemFailure> for PreRejection {
    fn from(failure: SubproblemFailure) -> Self {
        failure.reason()
    }
}

/// Solution of the subproblem.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// The step.
    pub s: DVector<f64>,
    /// Decrease of the unregularized Taylor polynomial along the step.
    pub predicted: f64,
    /// Multiplier `sigma ||s||^2` of the last pass.
    pub lambda: f64,
    /// Number of passes needed for the step to settle.
    pub passes: usize,
}

/// Solver of the regularized subproblem.
#[derive(Debug, Clone, Copy)]
pub struct Subproblem {
    max_iterations: usize,
    tolerance: f64,
    step_ceiling: f64,
}

impl Subproblem {
    /// Creates the solver with the inner budget taken from the
    /// configuration.
    pub fn new(config: &RunConfig) -> Self {
        Self {
            max_iterations: config.max_inner_iterations(),
            tolerance: config.inner_tolerance(),
            step_ceiling: config.step_ceiling(),
        }
    }

    /// Computes the step minimizing the model.
    pub fn solve(&self, model: &TaylorModel<'_>) -> Result<Step, SubproblemFailure> {
        let g = &model.derivatives().gradient;
        let sigma = model.sigma();

        let mut s = DVector::zeros(g.len());
        let mut lambda = 0.0;
        let mut passes = None;

        for pass in 0..self.max_iterations {
            let b = model.secant_matrix(&s);

            let next = if sigma > 0.0 {
                let (next, next_lambda) = self.secular(&b, g, sigma)?;
                lambda = next_lambda;
                next
            } else {
                b.lu().solve(&-g).ok_or(SubproblemFailure::Overflow)?
            };

            let next_norm = next.norm();
            if !next_norm.is_finite() || next_norm > self.step_ceiling {
                debug!("step overflow (norm = {}) in pass {}", next_norm, pass);
                return Err(SubproblemFailure::Overflow);
            }

            let change = (&next - &s).norm();
            s = next;

            trace!("pass {}: ||s|| = {}, change = {}", pass, next_norm, change);

            if change <= self.tolerance * next_norm.max(1.0) {
                passes = Some(pass + 1);
                break;
            }
        }

        let passes = passes.ok_or_else(|| {
            debug!("passes did not settle within {}", self.max_iterations);
            SubproblemFailure::Stall
        })?;

        let predicted = model.predicted_reduction(&s);
        if predicted.is_nan() || predicted <= 0.0 {
            debug!("predicted reduction = {} <= 0", predicted);
            return Err(SubproblemFailure::NonpositiveReduction);
        }

        if log_enabled!(Level::Debug) {
            let curvature = model.hessian(&s).symmetric_eigenvalues().min();
            if curvature < 0.0 {
                debug!(
                    "step is a saddle of the model (smallest curvature = {})",
                    curvature
                );
            }
        }

        Ok(Step {
            s,
            predicted,
            lambda,
            passes,
        })
    }

    /// Finds the global minimizer of
    ///
    /// ```text
    /// g^T s + 1/2 s^T B s + sigma/4 ||s||^4
    /// ```
    ///
    /// and returns it with the multiplier `sigma ||s||^2`.
    fn secular(
        &self,
        b: &DMatrix<f64>,
        g: &DVector<f64>,
        sigma: f64,
    ) -> Result<(DVector<f64>, f64), SubproblemFailure> {
        let eigen = b.clone().symmetric_eigen();
        let mu = &eigen.eigenvalues;
        let q = &eigen.eigenvectors;

        // Gradient in the eigenbasis.
        let gamma = q.tr_mul(g);

        let g_norm = g.norm();
        let min = mu.imin();
        let mu_min = mu[min];

        if g_norm == 0.0 && mu_min >= 0.0 {
            // Already stationary and the model is locally convex.
            return Ok((DVector::zeros(g.len()), 0.0));
        }

        // The global minimizer requires B + lambda I to be positive
        // semidefinite, so the multiplier is at least lo and the norm of the
        // step at least t_lo.
        let lo = (-mu_min).max(0.0);
        let t_lo = (lo / sigma).sqrt();

        // Hard case: the gradient has (almost) no component in the direction
        // of the smallest eigenvalue. The pseudo-step ignoring that direction
        // may be too short, the remaining length is then taken along the
        // eigenvector.
        if mu_min <= 0.0 && gamma[min].abs() <= f64::EPSILON.sqrt() * g_norm {
            let degenerate = |mu_i: f64| (mu_i + lo).abs() <= f64::EPSILON.sqrt() * (1.0 + lo);

            let pseudo = DVector::from_iterator(
                mu.len(),
                mu.iter().zip(gamma.iter()).map(|(&mu_i, &gamma_i)| {
                    if degenerate(mu_i) {
                        0.0
                    } else {
                        -gamma_i / (mu_i + lo)
                    }
                }),
            );

            let r = pseudo.norm();
            if r <= t_lo {
                let tau = (t_lo * t_lo - r * r).sqrt();
                let s = q * pseudo + q.column(min) * tau;
                debug!("hard case (lambda = {}, tau = {})", lo, tau);
                return Ok((s, lo));
            }
        }

        // Let lambda = sigma t^2. We seek t such that
        //
        //     psi(t) = ||s(sigma t^2)|| - t = 0,
        //
        // where s(lambda) = -(B + lambda I)^-1 g. The function is decreasing,
        // positive near t_lo and negative for large t. For large t, we have
        // ||s|| ~ ||g|| / (sigma t^2), which gives the initial upper bound.
        let psi = |t: f64| {
            let lambda = sigma * t * t;
            let (norm2, cube) = mu.iter().zip(gamma.iter()).fold(
                (0.0, 0.0),
                |(norm2, cube), (&mu_i, &gamma_i)| {
                    let d = mu_i + lambda;
                    let gamma2 = gamma_i * gamma_i;
                    (norm2 + gamma2 / (d * d), cube + gamma2 / (d * d * d))
                },
            );

            let r = norm2.sqrt();
            let dr = if r > 0.0 {
                -2.0 * sigma * t * cube / r
            } else {
                0.0
            };

            (r - t, dr - 1.0, r)
        };

        let mut lower = t_lo;
        let mut width = (g_norm / sigma).cbrt().max(f64::MIN_POSITIVE);
        let mut bracket = None;

        for _ in 0..self.max_iterations.max(64) {
            let c = t_lo + 2.0 * width;
            let (value, _, _) = psi(c);
            if value <= 0.0 {
                bracket = Some(c);
                break;
            }
            lower = c;
            width *= 2.0;
        }

        let mut upper = bracket.ok_or(SubproblemFailure::Stall)?;
        let mut t = upper;
        let mut root = None;

        for iter in 0..self.max_iterations {
            let (value, derivative, r) = psi(t);

            trace!("secular iteration {}: t = {}, psi = {}", iter, t, value);

            if !value.is_finite() {
                // Pole in the lower end of the bracket.
                lower = t;
            } else {
                if value.abs() <= self.tolerance * r.max(t) {
                    root = Some(t);
                    break;
                }

                if value > 0.0 {
                    lower = t;
                } else {
                    upper = t;
                }
            }

            if upper - lower <= f64::EPSILON * upper {
                root = Some(upper);
                break;
            }

            let newton = t - value / derivative;
            t = if newton.is_finite() && lower < newton && newton < upper {
                newton
            } else {
                (lower + upper) / 2.0
            };
        }

        let t = root.ok_or_else(|| {
            debug!("secular equation did not converge");
            SubproblemFailure::Stall
        })?;

        let lambda = sigma * t * t;
        let shifted = mu.add_scalar(lambda);
        let s = -(q * gamma.component_div(&shifted));

        Ok((s, lambda))
    }
}

/// Closed-form estimate of the weight from the norms of the derivatives.
///
/// The Levenberg-Marquardt parameter is chosen adaptively as
///
/// ```text
/// lambda = ||g||^d,    d = 1 / ||g|| if ||g|| >= 1 and 1 + 1 / (k + 1) otherwise
/// ```
///
/// and the step length `r` is the positive root of the scalar model
/// `||T|| r^2 / 2 + ||H|| r - ||g|| = 0`. Matching `lambda = sigma r^2`
/// gives the estimate. It is only recorded for comparison with the weight
/// controlled by the policy.
pub fn proxy_weight(d: &Derivatives, k: usize) -> f64 {
    let g = d.gradient.norm();
    if g == 0.0 {
        return 0.0;
    }

    let delta = if g >= 1.0 {
        1.0 / g
    } else {
        1.0 + 1.0 / (k as f64 + 1.0)
    };
    let lambda = g.powf(delta);

    let h = d.hessian.norm();
    let t = d.tensor.norm();

    // Numerically stable form of (-h + sqrt(h^2 + 2 t g)) / t.
    let denom = h + (h * h + 2.0 * t * g).sqrt();
    let r = if denom > 0.0 { 2.0 * g / denom } else { 1.0 };

    lambda / (r * r)
}
