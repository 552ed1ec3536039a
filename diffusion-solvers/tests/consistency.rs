use diffusion_core::{residual, Diag, LinearSystem, Matrix, Symmetry};
use diffusion_lu::solve as lu_solve;
use diffusion_solvers::{solve, CgParams, CgState, FPSettings, GsState, PcgState, PjState, SorState};
use std::sync::Arc;

/// A small SPD, diagonally dominant tridiagonal system: every algorithm
/// in this crate (PJ, GS, SOR, CG, PCG) should agree with the direct LU
/// baseline to within a modest tolerance.
fn tridiagonal_system(n: usize) -> Arc<LinearSystem<f64>> {
    let a = Matrix::from_func(
        n,
        n,
        |i, j| {
            if i == j {
                4.0
            } else if (i as isize - j as isize).abs() == 1 {
                -1.0
            } else {
                0.0
            }
        },
        Symmetry::Symmetric,
        Diag::NonUnit,
    );
    let b: Vec<f64> = (0..n).map(|i| (i + 1) as f64).collect();
    Arc::new(LinearSystem::new(a, b).unwrap())
}

#[test]
fn all_algorithms_agree_with_direct_lu_baseline() {
    let system = tridiagonal_system(8);
    let (x_direct, _) = lu_solve(system.a.clone(), &system.b);

    let settings = FPSettings::new(1e-12_f64, 500).unwrap();

    let pj = solve(PjState::new(system.clone()).unwrap(), &settings);
    let gs = solve(GsState::new(system.clone()).unwrap(), &settings);
    let sor = solve(SorState::new(system.clone(), 1.1).unwrap(), &settings);
    let cg = solve(CgState::new(system.clone(), CgParams::default()).unwrap(), &settings);
    let pcg = solve(PcgState::new(system.clone(), CgParams::default()).unwrap(), &settings);

    for (name, result) in [("pj", &pj), ("gs", &gs), ("sor", &sor), ("cg", &cg), ("pcg", &pcg)] {
        assert!(result.converged, "{name} failed to converge");
        for (got, want) in result.x.iter().zip(x_direct.iter()) {
            assert!((got - want).abs() < 1e-6, "{name}: {got} != {want}");
        }
        let r = residual(&system.a, &result.x, &system.b);
        let max_r = r.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        assert!(max_r < 1e-6, "{name}: residual too large ({max_r})");
    }
}

#[test]
fn cg_converges_within_rank_iterations_on_spd_system() {
    let system = tridiagonal_system(12);
    let settings = FPSettings::new(1e-10_f64, system.rank()).unwrap();
    let result = solve(CgState::new(system.clone(), CgParams::default()).unwrap(), &settings);
    assert!(result.converged);
    assert!(result.iterations <= system.rank());
}
