use diffusion_core::{norm_inf, residual, DiffusionResult, Matrix, Scalar};
use diffusion_lu::PivotStatus;
use diffusion_problem::DiffusionProblem;
use diffusion_solvers::{solve as solve_axb, CgParams, CgState, FPSettings, GsState, PcgState, PjState, SorState};
use std::sync::Arc;

/// Which of the six methods in this workspace should solve a
/// [`DiffusionProblem`], and the per-algorithm parameters each one
/// needs. Ported from spec.md §9's "model each solver as a variant",
/// generalized from `diffusion-solvers`'s individual state types to one
/// selector a caller picks at a single call site, the same role
/// `original_source`'s `LUPSolver` plays for the one algorithm it
/// hard-codes.
pub enum Algorithm<T> {
    Lu,
    Pj(FPSettings<T>),
    Gs(FPSettings<T>),
    Sor { settings: FPSettings<T>, omega: T },
    Cg { settings: FPSettings<T>, params: CgParams },
    Pcg { settings: FPSettings<T>, params: CgParams },
}

/// The stable outcome shape every algorithm normalizes to: the scalar
/// flux reshaped to the problem's `(M, N)` grid, the independent
/// infinity-norm residual, and the convergence bookkeeping spec.md §6
/// names. Mirrors `original_source`'s `LUPSolver::Solution`, broadened
/// with `converged`/`diverged`/`iterations` since those only make sense
/// once more than one (direct) algorithm is in scope.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineResult<T> {
    pub flux: Matrix<T>,
    pub residual: T,
    pub converged: bool,
    pub diverged: bool,
    pub iterations: usize,
}

/// Solve `problem` with the selected `algorithm`, returning the common
/// result shape regardless of which one ran.
pub fn solve<T: Scalar>(problem: &DiffusionProblem<T>, algorithm: Algorithm<T>) -> DiffusionResult<EngineResult<T>> {
    match algorithm {
        Algorithm::Lu => solve_lu(problem),
        Algorithm::Pj(settings) => {
            let system = Arc::new(problem.build_system()?);
            let state = PjState::new(system)?;
            Ok(finish(problem, solve_axb(state, &settings)))
        }
        Algorithm::Gs(settings) => {
            let system = Arc::new(problem.build_system()?);
            let state = GsState::new(system)?;
            Ok(finish(problem, solve_axb(state, &settings)))
        }
        Algorithm::Sor { settings, omega } => {
            let system = Arc::new(problem.build_system()?);
            let state = SorState::new(system, omega)?;
            Ok(finish(problem, solve_axb(state, &settings)))
        }
        Algorithm::Cg { settings, params } => {
            let system = Arc::new(problem.build_system()?);
            let state = CgState::new(system, params)?;
            Ok(finish(problem, solve_axb(state, &settings)))
        }
        Algorithm::Pcg { settings, params } => {
            let system = Arc::new(problem.build_system()?);
            let state = PcgState::new(system, params)?;
            Ok(finish(problem, solve_axb(state, &settings)))
        }
    }
}

fn finish<T: Scalar>(problem: &DiffusionProblem<T>, result: diffusion_solvers::IterativeAxbResult<T>) -> EngineResult<T> {
    EngineResult {
        flux: problem.flux_matrix(&result.x),
        residual: result.residual,
        converged: result.converged,
        diverged: result.diverged,
        iterations: result.iterations,
    }
}

fn solve_lu<T: Scalar>(problem: &DiffusionProblem<T>) -> DiffusionResult<EngineResult<T>> {
    let a = problem.build_matrix();
    let b = problem.build_rhs();
    let (x, status) = diffusion_lu::solve(a.clone(), &b);
    if status == PivotStatus::SmallPivot {
        log::warn!("LU factorization of the diffusion operator encountered a small pivot");
    }
    let r = residual(&a, &x, &b);
    Ok(EngineResult {
        flux: problem.flux_matrix(&x),
        residual: norm_inf(&r),
        converged: true,
        diverged: false,
        iterations: 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use diffusion_core::{Diag, Matrix, Symmetry};
    use diffusion_problem::{Grid2D, GridPoints2D, Space2D};

    /// Scenario S2: 1x1 diffusion, a = b = 1, M = N = 3, D = 1,
    /// absorption/scattering 0, source all ones.
    fn s2_problem() -> DiffusionProblem<f64> {
        let grid = Grid2D::new(Space2D::new(1.0, 1.0).unwrap(), GridPoints2D::new(3, 3).unwrap());
        let source = Matrix::ones(3, 3);
        DiffusionProblem::new(grid, 1.0, 0.0, source).unwrap()
    }

    #[test]
    fn scenario_s2_flux_is_symmetric_positive_with_center_maximum() {
        let problem = s2_problem();
        let result = solve(&problem, Algorithm::Lu).unwrap();
        let flux = &result.flux;

        for i in 0..3 {
            for j in 0..3 {
                assert!(flux[(i, j)] > 0.0, "flux must be positive everywhere, got {} at ({i},{j})", flux[(i, j)]);
            }
        }
        for i in 0..3 {
            for j in 0..3 {
                assert!((flux[(i, j)] - flux[(2 - i, 2 - j)]).abs() < 1e-9, "flux must be symmetric about the center");
            }
        }
        let center = flux[(1, 1)];
        for i in 0..3 {
            for j in 0..3 {
                if (i, j) != (1, 1) {
                    assert!(center >= flux[(i, j)], "center must be the maximum");
                }
            }
        }
    }

    /// Scenario S3: LU, PJ, GS, SOR, CG and PCG must all agree on S2
    /// within the iterative solvers' tolerance.
    #[test]
    fn scenario_s3_every_algorithm_agrees_on_the_same_problem() {
        let problem = s2_problem();
        let tau = 1e-8;
        let settings = FPSettings::new(tau, 10_000).unwrap();

        let lu = solve(&problem, Algorithm::Lu).unwrap();
        let pj = solve(&problem, Algorithm::Pj(settings)).unwrap();
        let gs = solve(&problem, Algorithm::Gs(settings)).unwrap();
        let sor = solve(&problem, Algorithm::Sor { settings, omega: 1.2 }).unwrap();
        let cg = solve(&problem, Algorithm::Cg { settings, params: CgParams::default() }).unwrap();
        let pcg = solve(&problem, Algorithm::Pcg { settings, params: CgParams::default() }).unwrap();

        assert!(pj.converged);
        assert!(gs.converged);
        assert!(sor.converged);
        assert!(cg.converged);
        assert!(pcg.converged);

        for other in [&pj, &gs, &sor, &cg, &pcg] {
            for i in 0..3 {
                for j in 0..3 {
                    let diff = (lu.flux[(i, j)] - other.flux[(i, j)]).abs();
                    assert!(diff < tau * 10.0, "mismatch at ({i},{j}): {} vs {}", lu.flux[(i, j)], other.flux[(i, j)]);
                }
            }
        }
    }

    /// Scenario S4: starting from the exact S2 solution, every
    /// iterative solver converges in at most 2 iterations.
    #[test]
    fn scenario_s4_converges_immediately_from_the_exact_solution() {
        let problem = s2_problem();
        let tau = 1e-8;
        let settings = FPSettings::new(tau, 10_000).unwrap();
        let exact = solve(&problem, Algorithm::Lu).unwrap();
        let system = Arc::new(problem.build_system().unwrap());
        let x_star: Vec<f64> = (0..9).map(|idx| exact.flux[(idx / 3, idx % 3)]).collect();

        let mut gs = GsState::with_initial_guess(Arc::clone(&system), x_star.clone()).unwrap();
        let gs_outcome = diffusion_solvers::run(&mut gs, &settings);
        assert!(gs_outcome.converged);
        assert!(gs_outcome.iterations <= 2, "GS: expected convergence within 2 iterations, got {}", gs_outcome.iterations);

        let mut pj = PjState::with_initial_guess(Arc::clone(&system), x_star.clone()).unwrap();
        let pj_outcome = diffusion_solvers::run(&mut pj, &settings);
        assert!(pj_outcome.converged);
        assert!(pj_outcome.iterations <= 2, "PJ: expected convergence within 2 iterations, got {}", pj_outcome.iterations);

        let mut sor = SorState::with_initial_guess(Arc::clone(&system), 1.2, x_star.clone()).unwrap();
        let sor_outcome = diffusion_solvers::run(&mut sor, &settings);
        assert!(sor_outcome.converged);
        assert!(sor_outcome.iterations <= 2, "SOR: expected convergence within 2 iterations, got {}", sor_outcome.iterations);

        let mut cg = CgState::with_initial_guess(Arc::clone(&system), CgParams::default(), x_star.clone()).unwrap();
        let cg_outcome = diffusion_solvers::run(&mut cg, &settings);
        assert!(cg_outcome.converged);
        assert!(cg_outcome.iterations <= 2, "CG: expected convergence within 2 iterations, got {}", cg_outcome.iterations);

        let mut pcg = PcgState::with_initial_guess(Arc::clone(&system), CgParams::default(), x_star).unwrap();
        let pcg_outcome = diffusion_solvers::run(&mut pcg, &settings);
        assert!(pcg_outcome.converged);
        assert!(pcg_outcome.iterations <= 2, "PCG: expected convergence within 2 iterations, got {}", pcg_outcome.iterations);
    }
}
