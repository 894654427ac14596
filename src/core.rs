//! Core abstractions and types for AR3.
//!
//! *Users* are mainly interested in implementing the [`Objective`] trait,
//! optionally together with [`Reference`] when the objective should be swept
//! by the [fractal sampler](crate::fractal).
//!
//! Algorithm *developers* are interested in the [`RegularizationPolicy`]
//! trait, which is the only seam through which the solver loop decides the
//! regularization weight, and in the run record types ([`RunResult`],
//! [`RunHistory`], [`StepOutcome`]).

mod domain;
mod objective;
mod policy;
mod record;
mod tensor;

pub use domain::*;
pub use objective::*;
pub use policy::*;
pub use record::*;
pub use tensor::*;
