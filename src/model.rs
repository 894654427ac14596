//! Regularized third-order Taylor model.
//!
//! For a point *x* with value *f*, gradient *g*, Hessian *H* and
//! third-derivative tensor *T*, the model of the objective around *x* is
//!
//! ```text
//! m(s) = f + g^T s + 1/2 s^T H s + 1/6 T[s, s, s] + sigma/4 ||s||^4
//! ```
//!
//! The quartic term makes the model bounded below for any positive weight,
//! regardless of the definiteness of *H* and *T*.

use nalgebra::{DMatrix, DVector};

use crate::core::{DataFault, DerivativePart, Derivatives};

/// Third-order Taylor model with quartic regularization.
#[derive(Debug, Clone, Copy)]
pub struct TaylorModel<'a> {
    d: &'a Derivatives,
    sigma: f64,
}

impl<'a> TaylorModel<'a> {
    /// Builds the model from the derivatives in point `x`.
    ///
    /// Returns a [`DataFault`] if the derivative data are not finite or do
    /// not match the dimension of `x`.
    pub fn new(x: &DVector<f64>, d: &'a Derivatives, sigma: f64) -> Result<Self, DataFault> {
        let n = x.len();
        let shapes = [
            (DerivativePart::Gradient, d.gradient.len()),
            (DerivativePart::Hessian, d.hessian.nrows()),
            (DerivativePart::Hessian, d.hessian.ncols()),
            (DerivativePart::Tensor, d.tensor.dim()),
        ];

        if let Some((part, found)) = shapes.into_iter().find(|(_, found)| *found != n) {
            return Err(DataFault::Dimension {
                part,
                expected: n,
                found,
            });
        }

        if !d.tensor.is_square() {
            return Err(DataFault::Dimension {
                part: DerivativePart::Tensor,
                expected: n,
                found: 0,
            });
        }

        let finite = [
            (DerivativePart::Value, d.value.is_finite()),
            (
                DerivativePart::Gradient,
                d.gradient.iter().all(|gi| gi.is_finite()),
            ),
            (
                DerivativePart::Hessian,
                d.hessian.iter().all(|hij| hij.is_finite()),
            ),
            (DerivativePart::Tensor, d.tensor.is_finite()),
        ];

        if let Some((part, _)) = finite.into_iter().find(|(_, ok)| !ok) {
            return Err(DataFault::NonFinite {
                part,
                point: x.iter().copied().collect(),
            });
        }

        Ok(Self { d, sigma })
    }

    /// Derivatives the model is built from.
    pub fn derivatives(&self) -> &'a Derivatives {
        self.d
    }

    /// Regularization weight.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Value of the model for step `s`.
    pub fn value(&self, s: &DVector<f64>) -> f64 {
        let norm2 = s.norm_squared();
        self.d.value - self.predicted_reduction(s) + self.sigma * norm2 * norm2 / 4.0
    }

    /// Decrease of the unregularized Taylor polynomial for step `s`, i.e.,
    /// `-(g^T s + 1/2 s^T H s + 1/6 T[s, s, s])`.
    pub fn predicted_reduction(&self, s: &DVector<f64>) -> f64 {
        let Derivatives {
            gradient,
            hessian,
            tensor,
            ..
        } = self.d;

        -(gradient.dot(s) + (hessian * s).dot(s) / 2.0 + tensor.apply3(s) / 6.0)
    }

    /// Gradient of the model with respect to the step,
    /// `g + H s + 1/2 T[s, s] + sigma ||s||^2 s`.
    pub fn gradient(&self, s: &DVector<f64>) -> DVector<f64> {
        let Derivatives {
            gradient,
            hessian,
            tensor,
            ..
        } = self.d;

        gradient + hessian * s + tensor.apply2(s) / 2.0 + s * (self.sigma * s.norm_squared())
    }

    /// Hessian of the model with respect to the step,
    /// `H + T[s] + sigma (||s||^2 I + 2 s s^T)`.
    pub fn hessian(&self, s: &DVector<f64>) -> DMatrix<f64> {
        let Derivatives {
            hessian, tensor, ..
        } = self.d;

        let n = s.len();
        let regularization =
            DMatrix::identity(n, n) * s.norm_squared() + (s * s.transpose()) * 2.0;

        hessian + tensor.apply(s) + regularization * self.sigma
    }

    /// Matrix `H + 1/2 T[s]`. With it, the stationarity condition of the
    /// model reads `(H + 1/2 T[s] + sigma ||s||^2 I) s = -g`.
    pub fn secant_matrix(&self, s: &DVector<f64>) -> DMatrix<f64> {
        &self.d.hessian + self.d.tensor.apply(s) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{dmatrix, dvector};

    use super::*;
    use crate::core::Tensor3;

    fn bundle() -> Derivatives {
        Derivatives {
            value: 1.5,
            gradient: dvector![0.3, -1.0],
            hessian: dmatrix![2.0, 0.5; 0.5, -1.0],
            tensor: Tensor3::symmetric2([1.0, -0.5, 0.25, 2.0]),
        }
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let d = bundle();
        let x = dvector![0.0, 0.0];
        let model = TaylorModel::new(&x, &d, 0.7).unwrap();

        let s = dvector![0.4, -0.3];
        let h = 1e-6;

        let gradient = model.gradient(&s);
        let hessian = model.hessian(&s);

        for i in 0..2 {
            let mut sp = s.clone();
            let mut sm = s.clone();
            sp[i] += h;
            sm[i] -= h;

            let fd = (model.value(&sp) - model.value(&sm)) / (2.0 * h);
            assert_relative_eq!(gradient[i], fd, epsilon = 1e-6);

            let fd = (model.gradient(&sp) - model.gradient(&sm)) / (2.0 * h);
            for j in 0..2 {
                assert_relative_eq!(hessian[(j, i)], fd[j], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn model_agrees_at_zero_step() {
        let d = bundle();
        let x = dvector![1.0, 2.0];
        let model = TaylorModel::new(&x, &d, 3.0).unwrap();
        let zero = dvector![0.0, 0.0];

        assert_eq!(model.value(&zero), d.value);
        assert_eq!(model.gradient(&zero), d.gradient);
        assert_eq!(model.hessian(&zero), d.hessian);
        assert_eq!(model.predicted_reduction(&zero), 0.0);
    }

    #[test]
    fn regularization_separates_value_and_reduction() {
        let d = bundle();
        let x = dvector![0.0, 0.0];
        let s = dvector![1.0, 1.0];

        let plain = TaylorModel::new(&x, &d, 0.0).unwrap();
        let regularized = TaylorModel::new(&x, &d, 2.0).unwrap();

        assert_eq!(
            plain.predicted_reduction(&s),
            regularized.predicted_reduction(&s)
        );
        // sigma/4 ||s||^4 = 2/4 * 4.
        assert_relative_eq!(regularized.value(&s) - plain.value(&s), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn non_finite_data_is_a_fault() {
        let mut d = bundle();
        d.gradient[1] = f64::NAN;
        let x = dvector![1.0, 2.0];

        assert_eq!(
            TaylorModel::new(&x, &d, 1.0).unwrap_err(),
            DataFault::NonFinite {
                part: DerivativePart::Gradient,
                point: vec![1.0, 2.0],
            }
        );

        let mut d = bundle();
        d.tensor = Tensor3::symmetric2([f64::INFINITY, 0.0, 0.0, 0.0]);
        assert!(matches!(
            TaylorModel::new(&x, &d, 1.0),
            Err(DataFault::NonFinite {
                part: DerivativePart::Tensor,
                ..
            })
        ));
    }

    #[test]
    fn wrong_shape_is_a_fault() {
        let d = bundle();
        let x = dvector![1.0, 2.0, 3.0];

        assert!(matches!(
            TaylorModel::new(&x, &d, 1.0),
            Err(DataFault::Dimension {
                part: DerivativePart::Gradient,
                expected: 3,
                found: 2,
            })
        ));
    }
}
