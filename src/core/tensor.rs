//! Symmetric third-order derivative tensor and its contractions.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Third-derivative tensor `T` of a scalar function of *n* variables.
///
/// The tensor is stored as *n* square slices, slice `i` holding the entries
/// `T[i, j, k]` for all `j, k`. All contractions assume the tensor is
/// symmetric in every pair of indices, which holds for third derivatives of
/// smooth functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor3 {
    slices: Vec<DMatrix<f64>>,
}

impl Tensor3 {
    /// Creates the zero tensor of given dimension.
    pub fn zeros(n: usize) -> Self {
        Self {
            slices: (0..n).map(|_| DMatrix::zeros(n, n)).collect(),
        }
    }

    /// Creates the tensor by evaluating `f(i, j, k)` for every index triple.
    pub fn from_fn<G>(n: usize, mut f: G) -> Self
    where
        G: FnMut(usize, usize, usize) -> f64,
    {
        let slices = (0..n)
            .map(|i| DMatrix::from_fn(n, n, |j, k| f(i, j, k)))
            .collect();
        Self { slices }
    }

    /// Creates a symmetric tensor of two variables from its four distinct
    /// entries `[T_xxx, T_xxy, T_xyy, T_yyy]`.
    pub fn symmetric2(entries: [f64; 4]) -> Self {
        Self::from_fn(2, |i, j, k| entries[i + j + k])
    }

    /// Dimension of the tensor.
    pub fn dim(&self) -> usize {
        self.slices.len()
    }

    /// Returns the entry `T[i, j, k]`.
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.slices[i][(j, k)]
    }

    /// Checks that all entries are finite.
    pub fn is_finite(&self) -> bool {
        self.slices
            .iter()
            .all(|slice| slice.iter().all(|t| t.is_finite()))
    }

    /// Determines whether all slices are square with the tensor dimension.
    pub fn is_square(&self) -> bool {
        let n = self.dim();
        self.slices
            .iter()
            .all(|slice| slice.nrows() == n && slice.ncols() == n)
    }

    /// Frobenius norm over all `n^3` entries.
    pub fn norm(&self) -> f64 {
        self.slices
            .iter()
            .map(|slice| slice.norm_squared())
            .sum::<f64>()
            .sqrt()
    }

    /// Contraction with one vector, the matrix `T[s]` with entries
    /// `sum_i T[i, j, k] s_i`.
    pub fn apply(&self, s: &DVector<f64>) -> DMatrix<f64> {
        let n = self.dim();
        self.slices
            .iter()
            .zip(s.iter())
            .fold(DMatrix::zeros(n, n), |mut acc, (slice, si)| {
                acc += slice * *si;
                acc
            })
    }

    /// Contraction with two vectors, the vector `T[s, s]` with entries
    /// `sum_jk T[i, j, k] s_j s_k`.
    pub fn apply2(&self, s: &DVector<f64>) -> DVector<f64> {
        DVector::from_iterator(
            self.dim(),
            self.slices.iter().map(|slice| (slice * s).dot(s)),
        )
    }

    /// Full contraction, the scalar `T[s, s, s]`.
    pub fn apply3(&self, s: &DVector<f64>) -> f64 {
        self.apply2(s).dot(s)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{dmatrix, dvector};

    use super::*;

    fn sample() -> Tensor3 {
        Tensor3::symmetric2([1.0, 2.0, 3.0, 4.0])
    }

    #[test]
    fn symmetric_entries() {
        let t = sample();
        assert_eq!(t.get(0, 0, 0), 1.0);
        assert_eq!(t.get(0, 1, 0), 2.0);
        assert_eq!(t.get(1, 0, 0), 2.0);
        assert_eq!(t.get(1, 1, 0), 3.0);
        assert_eq!(t.get(0, 1, 1), 3.0);
        assert_eq!(t.get(1, 1, 1), 4.0);
    }

    #[test]
    fn contractions_agree() {
        let t = sample();
        let s = dvector![0.5, -2.0];

        // T[s] = s_x T[0] + s_y T[1].
        let expected = dmatrix![0.5 - 4.0, 1.0 - 6.0; 1.0 - 6.0, 1.5 - 8.0];
        assert_relative_eq!(t.apply(&s), expected, epsilon = 1e-12);

        // T[s, s] = T[s] s.
        assert_relative_eq!(t.apply2(&s), t.apply(&s) * &s, epsilon = 1e-12);

        // Direct expansion of the cubic form.
        let (x, y) = (s[0], s[1]);
        let cubic = x.powi(3) + 3.0 * 2.0 * x * x * y + 3.0 * 3.0 * x * y * y + 4.0 * y.powi(3);
        assert_relative_eq!(t.apply3(&s), cubic, epsilon = 1e-12);
    }

    #[test]
    fn norm_and_finiteness() {
        let t = sample();
        // Entries: 1 once, 2 three times, 3 three times, 4 once.
        assert_relative_eq!(t.norm(), (1.0f64 + 12.0 + 27.0 + 16.0).sqrt());
        assert!(t.is_finite());
        assert!(t.is_square());

        let t = Tensor3::symmetric2([1.0, f64::NAN, 0.0, 0.0]);
        assert!(!t.is_finite());

        assert_eq!(Tensor3::zeros(3).norm(), 0.0);
    }
}
