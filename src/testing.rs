//! Analytic objectives and utilities useful for benchmarking, debugging and
//! smoke testing.
//!
//! [`QuadraticBowl`] is the simplest possible case, the model is exact and
//! every step is accepted. [`DoubleWell`] has an indefinite Hessian between
//! its two wells, [`Rosenbrock`] and [`Himmelblau`] have large third
//! derivatives and rich basins of convergence.
//!
//! # References
//!
//! \[1\] [A Literature Survey of Benchmark Functions For Global Optimization
//! Problems](https://arxiv.org/abs/1308.4008)

use std::sync::atomic::{AtomicUsize, Ordering};

use nalgebra::{dmatrix, dvector, DMatrix, DVector};

use crate::core::{Derivatives, Domain, Objective, Reference, Tensor3};

/// Extension of the [`Reference`] trait that provides additional information
/// that is useful for testing the solvers.
pub trait TestObjective: Reference {
    /// Standard initial values for the problem. Using the same initial values
    /// is essential for fair comparison of methods.
    fn initials(&self) -> Vec<DVector<f64>>;

    /// All local minimizers inside the domain.
    fn minimizers(&self) -> Vec<DVector<f64>> {
        vec![self.minimizer()]
    }

    /// Test if given point is one of the minimizers, given the tolerance
    /// `eps`.
    fn is_optimum(&self, x: &DVector<f64>, eps: f64) -> bool {
        self.minimizers()
            .iter()
            .any(|minimizer| (x - minimizer).norm() <= eps)
    }
}

/// Convex quadratic `1/2 (x - c)^T A (x - c)` with
/// `A = [[2, 1/2], [1/2, 1]]`.
///
/// The Taylor model is exact, the third-derivative tensor is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticBowl {
    center: DVector<f64>,
}

impl QuadraticBowl {
    /// Initializes the bowl with given minimizer.
    pub fn new(center: DVector<f64>) -> Self {
        assert!(center.len() == 2, "center must be two-dimensional");
        Self { center }
    }

    fn matrix() -> DMatrix<f64> {
        dmatrix![2.0, 0.5; 0.5, 1.0]
    }
}

impl Default for QuadraticBowl {
    fn default() -> Self {
        Self::new(dvector![0.0, 0.0])
    }
}

impl Objective for QuadraticBowl {
    fn dim(&self) -> usize {
        2
    }

    fn eval(&self, x: &DVector<f64>) -> Derivatives {
        let a = Self::matrix();
        let e = x - &self.center;
        let gradient = &a * &e;

        Derivatives {
            value: gradient.dot(&e) / 2.0,
            gradient,
            hessian: a,
            tensor: Tensor3::zeros(2),
        }
    }
}

impl Reference for QuadraticBowl {
    fn domain(&self) -> Domain {
        let (x, y) = (self.center[0], self.center[1]);
        [(x - 2.0, x + 2.0), (y - 2.0, y + 2.0)]
            .into_iter()
            .collect()
    }

    fn minimizer(&self) -> DVector<f64> {
        self.center.clone()
    }

    fn minimum(&self) -> f64 {
        0.0
    }
}

impl TestObjective for QuadraticBowl {
    fn initials(&self) -> Vec<DVector<f64>> {
        vec![
            &self.center + dvector![0.1, -0.1],
            &self.center + dvector![1.5, 1.0],
            &self.center + dvector![-2.0, 2.0],
        ]
    }
}

/// Double well `x^4 / 4 - x^2 / 2 + y^2` with minimizers `(+-1, 0)` and a
/// saddle point in the origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleWell;

impl Objective for DoubleWell {
    fn dim(&self) -> usize {
        2
    }

    fn eval(&self, x: &DVector<f64>) -> Derivatives {
        let (x, y) = (x[0], x[1]);

        Derivatives {
            value: x.powi(4) / 4.0 - x * x / 2.0 + y * y,
            gradient: dvector![x.powi(3) - x, 2.0 * y],
            hessian: dmatrix![3.0 * x * x - 1.0, 0.0; 0.0, 2.0],
            tensor: Tensor3::symmetric2([6.0 * x, 0.0, 0.0, 0.0]),
        }
    }
}

impl Reference for DoubleWell {
    fn domain(&self) -> Domain {
        [(-1.5, 1.5), (-1.0, 1.0)].into_iter().collect()
    }

    fn minimizer(&self) -> DVector<f64> {
        dvector![1.0, 0.0]
    }

    fn minimum(&self) -> f64 {
        -0.25
    }
}

impl TestObjective for DoubleWell {
    fn initials(&self) -> Vec<DVector<f64>> {
        vec![dvector![0.0, 1.0], dvector![0.5, 0.5], dvector![-1.4, -0.8]]
    }

    fn minimizers(&self) -> Vec<DVector<f64>> {
        vec![dvector![1.0, 0.0], dvector![-1.0, 0.0]]
    }
}

/// [Rosenbrock function](https://en.wikipedia.org/wiki/Rosenbrock_function)
/// `(a - x)^2 + b (y - x^2)^2` \[1\].
///
/// The global minimum `(a, a^2)` is inside a long, narrow, parabolic shaped
/// flat valley.
#[derive(Debug, Clone, Copy)]
pub struct Rosenbrock {
    a: f64,
    b: f64,
}

impl Rosenbrock {
    /// Initializes the function with given parameters.
    pub fn new(a: f64, b: f64) -> Self {
        assert!(b > 0.0, "b must be greater than zero");
        Self { a, b }
    }
}

impl Default for Rosenbrock {
    fn default() -> Self {
        Self::new(1.0, 100.0)
    }
}

impl Objective for Rosenbrock {
    fn dim(&self) -> usize {
        2
    }

    fn eval(&self, x: &DVector<f64>) -> Derivatives {
        let Self { a, b } = *self;
        let (x, y) = (x[0], x[1]);
        let r = y - x * x;

        Derivatives {
            value: (a - x).powi(2) + b * r * r,
            gradient: dvector![-2.0 * (a - x) - 4.0 * b * x * r, 2.0 * b * r],
            hessian: dmatrix![
                2.0 - 4.0 * b * y + 12.0 * b * x * x, -4.0 * b * x;
                -4.0 * b * x, 2.0 * b
            ],
            tensor: Tensor3::symmetric2([24.0 * b * x, -4.0 * b, 0.0, 0.0]),
        }
    }
}

impl Reference for Rosenbrock {
    fn domain(&self) -> Domain {
        [(-2.0, 2.0), (-1.0, 3.0)].into_iter().collect()
    }

    fn minimizer(&self) -> DVector<f64> {
        dvector![self.a, self.a * self.a]
    }

    fn minimum(&self) -> f64 {
        0.0
    }
}

impl TestObjective for Rosenbrock {
    fn initials(&self) -> Vec<DVector<f64>> {
        vec![dvector![-1.2, 1.0], dvector![0.0, 0.0], dvector![1.5, 2.5]]
    }
}

/// [Himmelblau's function](https://en.wikipedia.org/wiki/Himmelblau%27s_function)
/// `(x^2 + y - 11)^2 + (x + y^2 - 7)^2` with four minimizers of equal value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Himmelblau;

impl Objective for Himmelblau {
    fn dim(&self) -> usize {
        2
    }

    fn eval(&self, x: &DVector<f64>) -> Derivatives {
        let (x, y) = (x[0], x[1]);
        let u = x * x + y - 11.0;
        let v = x + y * y - 7.0;

        Derivatives {
            value: u * u + v * v,
            gradient: dvector![4.0 * x * u + 2.0 * v, 2.0 * u + 4.0 * y * v],
            hessian: dmatrix![
                4.0 * u + 8.0 * x * x + 2.0, 4.0 * (x + y);
                4.0 * (x + y), 4.0 * v + 8.0 * y * y + 2.0
            ],
            tensor: Tensor3::symmetric2([24.0 * x, 4.0, 4.0, 24.0 * y]),
        }
    }
}

impl Reference for Himmelblau {
    fn domain(&self) -> Domain {
        [(-5.0, 5.0), (-5.0, 5.0)].into_iter().collect()
    }

    fn minimizer(&self) -> DVector<f64> {
        dvector![3.0, 2.0]
    }

    fn minimum(&self) -> f64 {
        0.0
    }
}

impl TestObjective for Himmelblau {
    fn initials(&self) -> Vec<DVector<f64>> {
        vec![dvector![3.5, 2.5], dvector![-1.0, 1.0], dvector![0.0, -4.0]]
    }

    fn minimizers(&self) -> Vec<DVector<f64>> {
        vec![
            dvector![3.0, 2.0],
            dvector![-2.805118, 3.131312],
            dvector![-3.779310, -3.283186],
            dvector![3.584428, -1.848126],
        ]
    }
}

/// Wrapper that corrupts the gradient of the wrapped objective from the
/// `n`-th evaluation on (counting from one).
#[derive(Debug)]
pub struct FaultAfter<F> {
    inner: F,
    n: usize,
    calls: AtomicUsize,
}

impl<F> FaultAfter<F> {
    /// Wraps the objective.
    pub fn new(inner: F, n: usize) -> Self {
        Self {
            inner,
            n,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of evaluations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl<F: Objective> Objective for FaultAfter<F> {
    fn dim(&self) -> usize {
        self.inner.dim()
    }

    fn eval(&self, x: &DVector<f64>) -> Derivatives {
        let call = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        let mut d = self.inner.eval(x);

        if call >= self.n {
            d.gradient.fill(f64::NAN);
        }

        d
    }
}
