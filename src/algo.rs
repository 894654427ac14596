//! The building blocks of the AR3 method and the solver loop itself.
//!
//! One iteration builds the [Taylor model](crate::model::TaylorModel) in the
//! current iterate, computes the step by the [subproblem solver](subproblem),
//! evaluates it with the [step evaluator](step) and lets the
//! [regularization policy](regularization) decide the weight for the next
//! iteration. The [`Ar3`] solver loop ties these together.

pub mod ar3;
pub mod regularization;
pub mod step;
pub mod subproblem;

pub use ar3::Ar3;
pub use regularization::{Adaptive, Unregularized};
