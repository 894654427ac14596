//! Problem domain definition and reference solutions.

use std::iter::FromIterator;

use nalgebra::DVector;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

use super::objective::Objective;

/// Rectangular region of interest of an objective.
///
/// The solver itself is unconstrained; the domain is only used to place
/// starting points when exploring basins of convergence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    lower: DVector<f64>,
    upper: DVector<f64>,
}

impl Domain {
    /// Creates rectangular domain with given bounds.
    pub fn rect(lower: Vec<f64>, upper: Vec<f64>) -> Self {
        assert!(!lower.is_empty(), "empty domain");
        assert!(
            lower.len() == upper.len(),
            "lower and upper have different size"
        );
        assert!(
            lower
                .iter()
                .zip(upper.iter())
                .all(|(l, u)| l.is_finite() && u.is_finite() && l <= u),
            "bounds must be finite and ordered"
        );

        Self {
            lower: DVector::from_vec(lower),
            upper: DVector::from_vec(upper),
        }
    }

    /// Gets the dimension of the domain.
    pub fn dim(&self) -> usize {
        self.lower.nrows()
    }

    /// Lower bounds.
    pub fn lower(&self) -> &DVector<f64> {
        &self.lower
    }

    /// Upper bounds.
    pub fn upper(&self) -> &DVector<f64> {
        &self.upper
    }

    /// Returns the domain grown by `margin` in every direction.
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            lower: self.lower.add_scalar(-margin),
            upper: self.upper.add_scalar(margin),
        }
    }

    /// Determines whether the point lies inside the domain.
    pub fn contains(&self, x: &DVector<f64>) -> bool {
        x.len() == self.dim()
            && x.iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .all(|(xi, (li, ui))| li <= xi && xi <= ui)
    }

    /// Samples a point uniformly in the domain.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> DVector<f64> {
        DVector::from_iterator(
            self.dim(),
            self.lower.iter().zip(self.upper.iter()).map(|(&li, &ui)| {
                if li < ui {
                    Uniform::new_inclusive(li, ui).sample(rng)
                } else {
                    li
                }
            }),
        )
    }
}

impl FromIterator<(f64, f64)> for Domain {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        let (lower, upper): (Vec<_>, Vec<_>) = iter.into_iter().unzip();
        Self::rect(lower, upper)
    }
}

/// Objectives with a known region of interest and a reference minimizer.
pub trait Reference: Objective {
    /// Region in which the interesting behavior takes place.
    fn domain(&self) -> Domain;

    /// A known (global) minimizer.
    fn minimizer(&self) -> DVector<f64>;

    /// Value of the objective in the reference minimizer.
    fn minimum(&self) -> f64 {
        self.eval(&self.minimizer()).value
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::dvector;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn expand_and_contains() {
        let dom: Domain = [(-1.0, 1.0), (0.0, 2.0)].into_iter().collect();
        assert_eq!(dom.dim(), 2);
        assert!(dom.contains(&dvector![0.0, 1.0]));
        assert!(!dom.contains(&dvector![1.5, 1.0]));

        let wide = dom.expand(0.5);
        assert!(wide.contains(&dvector![1.5, -0.5]));
        assert_eq!(wide.lower(), &dvector![-1.5, -0.5]);
        assert_eq!(wide.upper(), &dvector![1.5, 2.5]);
    }

    #[test]
    fn samples_stay_inside() {
        let dom: Domain = [(-3.0, -2.0), (5.0, 5.0)].into_iter().collect();
        let mut rng = SmallRng::seed_from_u64(7);

        for _ in 0..100 {
            let x = dom.sample(&mut rng);
            assert!(dom.contains(&x));
            assert_eq!(x[1], 5.0);
        }
    }

    #[test]
    #[should_panic(expected = "bounds must be finite and ordered")]
    fn reversed_bounds() {
        Domain::rect(vec![1.0], vec![0.0]);
    }
}
