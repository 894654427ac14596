#![allow(clippy::many_single_char_names)]
#![warn(missing_docs)]

//! # AR3
//!
//! Adaptive regularized third-order Newton minimization of smooth functions
//! and the exploration of its basins of convergence.
//!
//! Higher-order Newton-type methods build a local polynomial model of the
//! objective from its derivatives and take the minimizer of the model as the
//! next step. This library implements the third-order variant with a quartic
//! regularization term whose weight is adapted online from how well the
//! model predicted the actual decrease (the AR3 method), together with the
//! unregularized baseline that uses the same model and acceptance test but
//! no regularization.
//!
//! ## Methods
//!
//! * [AR3](algo::ar3) with the [`Adaptive`] policy -- Robust against
//!   indefinite Hessians and large third derivatives, recommended default.
//! * Third-order Newton with the [`Unregularized`] policy -- Baseline that
//!   isolates the effect of the higher-order model alone.
//!
//! Other weight strategies can be plugged in by implementing the
//! [`RegularizationPolicy`] trait.
//!
//! ## Problem
//!
//! The problem is the unconstrained minimization of a function of *n*
//! variables
//!
//! ```text
//! min f(x),  x in R^n
//! ```
//!
//! The method needs the value, gradient, Hessian and third-derivative tensor
//! of the function, supplied by implementing the [`Objective`] trait.
//!
//! ```rust
//! use ar3::nalgebra as na;
//! use ar3::{Derivatives, Objective, Tensor3};
//!
//! // A problem is represented by a type.
//! struct Rosenbrock {
//!     a: f64,
//!     b: f64,
//! }
//!
//! impl Objective for Rosenbrock {
//!     fn dim(&self) -> usize {
//!         2
//!     }
//!
//!     fn eval(&self, x: &na::DVector<f64>) -> Derivatives {
//!         let Self { a, b } = *self;
//!         let (x, y) = (x[0], x[1]);
//!         let r = y - x * x;
//!
//!         Derivatives {
//!             value: (a - x).powi(2) + b * r * r,
//!             gradient: na::dvector![-2.0 * (a - x) - 4.0 * b * x * r, 2.0 * b * r],
//!             hessian: na::dmatrix![
//!                 2.0 - 4.0 * b * y + 12.0 * b * x * x, -4.0 * b * x;
//!                 -4.0 * b * x, 2.0 * b
//!             ],
//!             // Distinct entries T_xxx, T_xxy, T_xyy, T_yyy.
//!             tensor: Tensor3::symmetric2([24.0 * b * x, -4.0 * b, 0.0, 0.0]),
//!         }
//!     }
//! }
//! ```
//!
//! ## Solving
//!
//! When you have your objective available, you can use the [`SolverDriver`]
//! to run the method. A run never returns an error, the way it ended is
//! described by the [`RunResult`] together with the history of weights,
//! objective values and step outcomes.
//!
//! ```rust
//! use ar3::{RunConfig, SolverDriver};
//! # use ar3::nalgebra as na;
//! # use ar3::{Derivatives, Objective, Tensor3};
//! #
//! # struct Rosenbrock {
//! #     a: f64,
//! #     b: f64,
//! # }
//! #
//! # impl Objective for Rosenbrock {
//! #     fn dim(&self) -> usize {
//! #         2
//! #     }
//! #
//! #     fn eval(&self, x: &na::DVector<f64>) -> Derivatives {
//! #         let Self { a, b } = *self;
//! #         let (x, y) = (x[0], x[1]);
//! #         let r = y - x * x;
//! #
//! #         Derivatives {
//! #             value: (a - x).powi(2) + b * r * r,
//! #             gradient: na::dvector![-2.0 * (a - x) - 4.0 * b * x * r, 2.0 * b * r],
//! #             hessian: na::dmatrix![
//! #                 2.0 - 4.0 * b * y + 12.0 * b * x * x, -4.0 * b * x;
//! #                 -4.0 * b * x, 2.0 * b
//! #             ],
//! #             tensor: Tensor3::symmetric2([24.0 * b * x, -4.0 * b, 0.0, 0.0]),
//! #         }
//! #     }
//! # }
//!
//! let f = Rosenbrock { a: 1.0, b: 1.0 };
//!
//! let mut config = RunConfig::default();
//! config.set_max_iterations(200);
//!
//! let solver = SolverDriver::builder(&f)
//!     .with_initial(vec![-1.2, 1.0])
//!     .with_config(config)
//!     .build()
//!     .expect("valid configuration");
//!
//! let result = solver.run();
//!
//! for (k, outcome) in result.history().outcomes().iter().enumerate() {
//!     println!("iter = {}\tsigma = {}\t{:?}", k, result.history().sigma()[k], outcome);
//! }
//!
//! if result.converged() {
//!     println!("solved in {} iterations", result.iterations());
//! } else {
//!     println!("stopped: {:?}", result.termination());
//! }
//! ```
//!
//! ## Basins of convergence
//!
//! The [`fractal`] module runs a method from every point of a grid and
//! records whether it converged, for both variants at once. See its
//! documentation for the details.
//!
//! ## License
//!
//! Licensed under MIT.

pub mod algo;
pub mod analysis;
mod core;
pub mod driver;
pub mod fractal;
pub mod model;
pub mod options;

#[cfg(feature = "testing")]
pub mod testing;

#[cfg(not(feature = "testing"))]
#[allow(dead_code)]
pub(crate) mod testing;

pub use crate::core::*;
pub use algo::{Adaptive, Ar3, Unregularized};
pub use driver::SolverDriver;
pub use options::{ConfigError, ConvergenceTest, RunConfig};

pub use nalgebra;
