use ar3::analysis::{convergence_profile, StepStatus};
use ar3::fractal::{ConvergenceGrid, FractalOptions, FractalSampler};
use ar3::testing::Himmelblau;
use ar3::{Reference, RunConfig, SolverDriver};

fn draw(name: &str, grid: &ConvergenceGrid) {
    let (nx, ny) = grid.shape();
    println!(
        "{} ({:.1}% converged)",
        name,
        100.0 * grid.converged_fraction()
    );

    // Rows from the top, i.e., the largest y first.
    for j in (0..ny).rev() {
        let row = (0..nx)
            .map(|i| if grid.cell(i, j) { '#' } else { '.' })
            .collect::<String>();
        println!("{row}");
    }
    println!();
}

fn main() -> Result<(), String> {
    let f = Himmelblau;

    let mut options = FractalOptions::default();
    options.set_x_points(60).set_y_points(30);

    let sampler = FractalSampler::new(options).map_err(|error| format!("{error}"))?;
    let dataset = sampler
        .dataset(&f, &RunConfig::default())
        .map_err(|error| format!("{error}"))?;

    draw("Unregularized", dataset.unregularized());
    draw("AR3", dataset.ar3());

    let solver = SolverDriver::builder(&f)
        .with_initial(vec![-1.0, 1.0])
        .build()
        .map_err(|error| format!("{error}"))?;
    let result = solver.run();

    for point in convergence_profile(&result, f.minimum()) {
        let marker = match point.status {
            StepStatus::Accepted => "accepted",
            StepStatus::Rejected => "rejected",
            StepStatus::PreRejected => "pre-rejected",
            StepStatus::Converged => "converged",
        };
        println!(
            "iter = {}\tsigma = {:.3e}\tsigma_LM = {:.3e}\tf - f* = {:.3e}\t{}",
            point.iteration, point.sigma, point.sigma_approx, point.gap, marker
        );
    }

    if result.converged() {
        Ok(())
    } else {
        Err(format!("did not converge: {:?}", result.termination()))
    }
}
