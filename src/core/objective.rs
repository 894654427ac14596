//! Abstractions and types for defining objective functions.
//!
//! # Defining an objective
//!
//! An objective is any type that implements the [`Objective`] trait. It must
//! supply the function value together with all derivatives up to the third
//! order, since the third-order model of the solver is built from them.
//!
//! ```rust
//! use ar3::nalgebra as na;
//! use ar3::{Derivatives, Objective, Tensor3};
//!
//! // A problem is represented by a type.
//! struct Paraboloid;
//!
//! impl Objective for Paraboloid {
//!     fn dim(&self) -> usize {
//!         2
//!     }
//!
//!     fn eval(&self, x: &na::DVector<f64>) -> Derivatives {
//!         Derivatives {
//!             value: x[0].powi(2) + 2.0 * x[1].powi(2),
//!             gradient: na::dvector![2.0 * x[0], 4.0 * x[1]],
//!             hessian: na::dmatrix![2.0, 0.0; 0.0, 4.0],
//!             tensor: Tensor3::zeros(2),
//!         }
//!     }
//! }
//! ```

use std::fmt;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tensor::Tensor3;

/// Value and derivatives of an objective at a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Derivatives {
    /// Function value `f(x)`.
    pub value: f64,
    /// Gradient vector.
    pub gradient: DVector<f64>,
    /// Symmetric Hessian matrix.
    pub hessian: DMatrix<f64>,
    /// Symmetric third-derivative tensor.
    pub tensor: Tensor3,
}

/// Part of the [`Derivatives`] bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DerivativePart {
    /// Function value.
    Value,
    /// Gradient vector.
    Gradient,
    /// Hessian matrix.
    Hessian,
    /// Third-derivative tensor.
    Tensor,
}

impl fmt::Display for DerivativePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DerivativePart::Value => "value",
            DerivativePart::Gradient => "gradient",
            DerivativePart::Hessian => "hessian",
            DerivativePart::Tensor => "third-derivative tensor",
        };
        f.write_str(name)
    }
}

/// Invalid derivative data returned by an objective. Fatal to the run.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum DataFault {
    /// An invalid value (NaN, positive or negative infinity) occurred.
    #[error("non-finite {part} at {point:?}")]
    NonFinite {
        /// Which part of the bundle was invalid.
        part: DerivativePart,
        /// The point at which the objective was evaluated.
        point: Vec<f64>,
    },
    /// The derivatives do not match the dimension of the point.
    #[error("invalid dimensionality of {part}: expected {expected}, found {found}")]
    Dimension {
        /// Which part of the bundle has wrong shape.
        part: DerivativePart,
        /// Dimension of the point.
        expected: usize,
        /// Dimension of the derivative data.
        found: usize,
    },
}

/// The trait for defining objective functions (the function oracle).
///
/// Implementations must be deterministic and free of side effects observable
/// by the solver. Non-finite outputs are not an error of the objective, the
/// solver treats them as a [`DataFault`] and terminates the run.
pub trait Objective {
    /// Number of variables.
    fn dim(&self) -> usize;

    /// Calculate the value, gradient, Hessian and third-derivative tensor in
    /// given point.
    fn eval(&self, x: &DVector<f64>) -> Derivatives;
}

impl<F: Objective + ?Sized> Objective for &F {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn eval(&self, x: &DVector<f64>) -> Derivatives {
        (**self).eval(x)
    }
}
