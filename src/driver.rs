//! High-level API for running the solvers.
//!
//! The driver encapsulates the objective, the starting point and the solver
//! with its options. The simplest way of using the driver is to initialize it
//! with the defaults:
//!
//! ```rust
//! use ar3::SolverDriver;
//! use ar3::testing::Rosenbrock;
//!
//! let f = Rosenbrock::default();
//!
//! let solver = SolverDriver::new(&f);
//! ```
//!
//! If you need to specify additional settings, use the builder:
//!
//! ```rust
//! use ar3::{RunConfig, SolverDriver, Unregularized};
//! use ar3::testing::Rosenbrock;
//!
//! let f = Rosenbrock::default();
//!
//! let mut config = RunConfig::default();
//! config.set_max_iterations(50).set_tolerance(1e-10);
//!
//! let solver = SolverDriver::builder(&f)
//!     .with_initial(vec![-1.2, 1.0])
//!     .with_config(config)
//!     .with_policy(Unregularized)
//!     .build()
//!     .expect("valid configuration");
//! ```
//!
//! Once you have the driver, you can run the solver. The run never fails,
//! the way it ended is recorded in the result:
//!
//! ```rust
//! use ar3::SolverDriver;
//! use ar3::testing::QuadraticBowl;
//!
//! let f = QuadraticBowl::default();
//!
//! let solver = SolverDriver::builder(&f)
//!     .with_initial(vec![0.5, -0.5])
//!     .build()
//!     .expect("valid configuration");
//!
//! let result = solver.run();
//! assert!(result.converged());
//! println!("{} found x = {:?}", solver.name(), result.x().as_slice());
//! ```

use nalgebra::DVector;

use crate::algo::{Adaptive, Ar3};
use crate::core::{Objective, RegularizationPolicy, RunResult};
use crate::options::{ConfigError, RunConfig};

/// Builder for the [`SolverDriver`].
pub struct SolverBuilder<'a, F, P> {
    f: &'a F,
    x0: DVector<f64>,
    config: RunConfig,
    policy: P,
}

impl<'a, F: Objective, P: RegularizationPolicy> SolverBuilder<'a, F, P> {
    /// Sets the initial point from which the iterative process starts.
    /// Default: the origin.
    pub fn with_initial(mut self, x0: Vec<f64>) -> Self {
        self.x0 = DVector::from_vec(x0);
        self
    }

    /// Sets the options of the solver.
    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the policy controlling the regularization weight.
    pub fn with_policy<P2: RegularizationPolicy>(self, policy: P2) -> SolverBuilder<'a, F, P2> {
        SolverBuilder {
            f: self.f,
            x0: self.x0,
            config: self.config,
            policy,
        }
    }

    /// Builds the [`SolverDriver`], validating the options and the dimension
    /// of the initial point.
    pub fn build(self) -> Result<SolverDriver<'a, F, P>, ConfigError> {
        let Self {
            f,
            x0,
            config,
            policy,
        } = self;

        if x0.len() != f.dim() {
            return Err(ConfigError::Dimension {
                expected: f.dim(),
                found: x0.len(),
            });
        }

        let algo = Ar3::with_policy(config, policy)?;

        Ok(SolverDriver { f, algo, x0 })
    }
}

/// The driver for the minimization process.
///
/// For default settings, use [`SolverDriver::new`]. For more flexibility, use
/// [`SolverDriver::builder`]. For the usage of the driver, see
/// [module](self) documentation.
pub struct SolverDriver<'a, F, P = Adaptive> {
    f: &'a F,
    algo: Ar3<P>,
    x0: DVector<f64>,
}

impl<'a, F: Objective> SolverDriver<'a, F, Adaptive> {
    /// Returns the builder for specifying additional settings.
    pub fn builder(f: &'a F) -> SolverBuilder<'a, F, Adaptive> {
        SolverBuilder {
            f,
            x0: DVector::zeros(f.dim()),
            config: RunConfig::default(),
            policy: Adaptive,
        }
    }

    /// Initializes the driver with the default settings, starting in the
    /// origin.
    pub fn new(f: &'a F) -> Self {
        Self {
            f,
            algo: Ar3::new(),
            x0: DVector::zeros(f.dim()),
        }
    }
}

impl<'a, F: Objective, P: RegularizationPolicy> SolverDriver<'a, F, P> {
    /// Returns reference to the initial point.
    pub fn x0(&self) -> &[f64] {
        self.x0.as_slice()
    }

    /// Returns reference to the underlying solver.
    pub fn solver(&self) -> &Ar3<P> {
        &self.algo
    }

    /// Runs the solver from the initial point.
    pub fn run(&self) -> RunResult {
        self.algo.run(self.f, &self.x0)
    }

    /// Returns the name of the used method.
    pub fn name(&self) -> &str {
        P::NAME
    }
}
