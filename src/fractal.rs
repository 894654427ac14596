//! Basins of convergence of the solvers.
//!
//! The sampler sweeps a regular grid of starting points covering the domain
//! of a [`Reference`] objective extended by a margin, runs the solver from
//! each of them and keeps only the flag whether the run converged. The
//! resulting picture is the "Newton fractal" of the method.
//!
//! Runs from different starting points share no mutable state, so they are
//! dispatched to a bounded pool of workers. Each run writes into its own
//! cell of the pre-allocated grid.
//!
//! ```rust
//! use ar3::fractal::{FractalOptions, FractalSampler};
//! use ar3::testing::DoubleWell;
//! use ar3::RunConfig;
//!
//! let mut options = FractalOptions::default();
//! options.set_x_points(8).set_y_points(6).set_workers(2);
//!
//! let sampler = FractalSampler::new(options).expect("valid options");
//! let dataset = sampler
//!     .dataset(&DoubleWell, &RunConfig::default())
//!     .expect("two-dimensional objective");
//!
//! assert_eq!(dataset.ar3().shape(), (8, 6));
//! ```

use getset::{CopyGetters, Getters, Setters};
use log::debug;
use nalgebra::{dvector, DVector};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algo::Ar3;
use crate::core::{Domain, Reference, RegularizationPolicy};
use crate::options::{ConfigError, RunConfig};

/// Error returned from the [`FractalSampler`].
#[derive(Debug, Error)]
pub enum FractalError {
    /// The grid has no points.
    #[error("grid must have at least one point per axis, got {x_points}x{y_points}")]
    InvalidResolution {
        /// Number of points along the first axis.
        x_points: usize,
        /// Number of points along the second axis.
        y_points: usize,
    },
    /// The margin is negative or not finite.
    #[error("margin must be non-negative and finite, got {0}")]
    InvalidMargin(f64),
    /// The objective is not two-dimensional.
    #[error("basins can be sampled only for two-dimensional objectives, got {0}")]
    Dimension(usize),
    /// No starting points were requested.
    #[error("number of samples must be positive")]
    NoSamples,
    /// The worker pool could not be created.
    #[error("cannot create worker pool: {0}")]
    Pool(#[from] ThreadPoolBuildError),
    /// The solver configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Options for [`FractalSampler`].
#[derive(Debug, Clone, CopyGetters, Setters, Serialize, Deserialize)]
#[getset(get_copy = "pub", set = "pub")]
#[serde(default)]
pub struct FractalOptions {
    /// Number of grid points along the first axis. Default: `100`.
    x_points: usize,
    /// Number of grid points along the second axis. Default: `100`.
    y_points: usize,
    /// Extension of the domain of the objective on every side. Default:
    /// `2.1`.
    margin: f64,
    /// Number of parallel workers. Zero means one per available core.
    /// Default: `0`.
    workers: usize,
}

impl Default for FractalOptions {
    fn default() -> Self {
        Self {
            x_points: 100,
            y_points: 100,
            margin: 2.1,
            workers: 0,
        }
    }
}

/// Converged flags of runs started in the points of a regular grid.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct ConvergenceGrid {
    /// Coordinates of the grid along the first axis.
    #[getset(get = "pub")]
    xs: Vec<f64>,
    /// Coordinates of the grid along the second axis.
    #[getset(get = "pub")]
    ys: Vec<f64>,
    cells: Vec<bool>,
}

impl ConvergenceGrid {
    /// Number of points along each axis.
    pub fn shape(&self) -> (usize, usize) {
        (self.xs.len(), self.ys.len())
    }

    /// Whether the run started in `(xs[i], ys[j])` converged.
    ///
    /// # Panics
    ///
    /// If the index is out of the grid.
    pub fn cell(&self, i: usize, j: usize) -> bool {
        let (nx, ny) = self.shape();
        assert!(i < nx && j < ny, "index out of grid");
        self.cells[i * ny + j]
    }

    /// Whether the run started in `(xs[i], ys[j])` converged, or `None` if
    /// the index is out of the grid.
    pub fn get(&self, i: usize, j: usize) -> Option<bool> {
        let (nx, ny) = self.shape();
        if i < nx && j < ny {
            Some(self.cells[i * ny + j])
        } else {
            None
        }
    }

    /// Fraction of starting points from which the run converged.
    pub fn converged_fraction(&self) -> f64 {
        let converged = self.cells.iter().filter(|&&cell| cell).count();
        converged as f64 / self.cells.len() as f64
    }
}

/// Basins of both method variants over the same grid.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct FractalDataset {
    /// Options of the sweep.
    options: FractalOptions,
    /// Options of the runs.
    config: RunConfig,
    /// Basins of the unregularized third-order Newton method.
    unregularized: ConvergenceGrid,
    /// Basins of the AR3 method.
    ar3: ConvergenceGrid,
}

/// Sampler of the basins of convergence.
pub struct FractalSampler {
    options: FractalOptions,
    pool: ThreadPool,
}

impl FractalSampler {
    /// Initializes the sampler and its pool of workers.
    pub fn new(options: FractalOptions) -> Result<Self, FractalError> {
        if options.x_points == 0 || options.y_points == 0 {
            return Err(FractalError::InvalidResolution {
                x_points: options.x_points,
                y_points: options.y_points,
            });
        }

        if !(options.margin >= 0.0 && options.margin.is_finite()) {
            return Err(FractalError::InvalidMargin(options.margin));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(options.workers)
            .build()?;

        Ok(Self { options, pool })
    }

    /// Options of the sampler.
    pub fn options(&self) -> &FractalOptions {
        &self.options
    }

    /// Region covered by the grid, the domain of the objective extended by
    /// the margin.
    pub fn region<F: Reference>(&self, f: &F) -> Result<Domain, FractalError> {
        let domain = f.domain();
        if domain.dim() != 2 {
            return Err(FractalError::Dimension(domain.dim()));
        }

        Ok(domain.expand(self.options.margin))
    }

    /// Runs the solver from every grid point and records whether it
    /// converged.
    pub fn sample<F, P>(&self, f: &F, solver: &Ar3<P>) -> Result<ConvergenceGrid, FractalError>
    where
        F: Reference + Sync,
        P: RegularizationPolicy + Sync,
    {
        let region = self.region(f)?;
        let xs = linspace(region.lower()[0], region.upper()[0], self.options.x_points);
        let ys = linspace(region.lower()[1], region.upper()[1], self.options.y_points);
        let ny = ys.len();

        debug!(
            "sampling {} basins on {}x{} grid",
            solver.name(),
            xs.len(),
            ny
        );

        let mut cells = vec![false; xs.len() * ny];

        self.pool.install(|| {
            cells.par_iter_mut().enumerate().for_each(|(index, cell)| {
                let (i, j) = (index / ny, index % ny);
                let x0 = dvector![xs[i], ys[j]];
                *cell = solver.run(f, &x0).converged();
            });
        });

        let grid = ConvergenceGrid { xs, ys, cells };
        debug!(
            "{} converged from {:.1}% of the grid",
            solver.name(),
            100.0 * grid.converged_fraction()
        );

        Ok(grid)
    }

    /// Samples the basins of both the unregularized and AR3 method with the
    /// same run options.
    pub fn dataset<F>(&self, f: &F, config: &RunConfig) -> Result<FractalDataset, FractalError>
    where
        F: Reference + Sync,
    {
        let unregularized = self.sample(f, &Ar3::unregularized(config.clone())?)?;
        let ar3 = self.sample(f, &Ar3::with_config(config.clone())?)?;

        Ok(FractalDataset {
            options: self.options.clone(),
            config: config.clone(),
            unregularized,
            ar3,
        })
    }

    /// Estimates the size of the basin of convergence as the fraction of
    /// converged runs from `samples` starting points drawn uniformly from
    /// the region. The estimate is reproducible for given `seed`.
    pub fn estimate_basin<F, P>(
        &self,
        f: &F,
        solver: &Ar3<P>,
        samples: usize,
        seed: u64,
    ) -> Result<f64, FractalError>
    where
        F: Reference + Sync,
        P: RegularizationPolicy + Sync,
    {
        if samples == 0 {
            return Err(FractalError::NoSamples);
        }

        let region = self.region(f)?;
        let mut rng = SmallRng::seed_from_u64(seed);
        let starts = (0..samples)
            .map(|_| region.sample(&mut rng))
            .collect::<Vec<DVector<f64>>>();

        let converged = self.pool.install(|| {
            starts
                .par_iter()
                .filter(|x0| solver.run(f, x0).converged())
                .count()
        });

        Ok(converged as f64 / samples as f64)
    }
}

/// `n` evenly spaced points from `lo` to `hi`, both included. A single point
/// is placed in the middle.
fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![(lo + hi) / 2.0],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { hi } else { lo + step * i as f64 })
                .collect()
        }
    }
}
