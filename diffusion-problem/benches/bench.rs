use criterion::{black_box, criterion_group, criterion_main, Criterion};
use diffusion_core::{Diag, Matrix, Symmetry};
use diffusion_problem::{DiffusionProblem, Grid2D, GridPoints2D, Space2D};

fn problem(n: usize) -> DiffusionProblem<f64> {
    let grid = Grid2D::new(Space2D::new(1.0, 1.0).unwrap(), GridPoints2D::new(n, n).unwrap());
    let source = Matrix::from_func(n, n, |i, j| ((i + j) % 3) as f64 + 1.0, Symmetry::General, Diag::NonUnit);
    DiffusionProblem::new(grid, 1.0, 0.1, source).unwrap()
}

fn bench_build_matrix(c: &mut Criterion) {
    let p = problem(16);
    c.bench_function("build_matrix 16x16", |b| b.iter(|| black_box(p.build_matrix())));
}

fn bench_max_residual(c: &mut Criterion) {
    let p = problem(32);
    let stencil = p.stencil();
    let u = Matrix::<f64>::zeros(stencil.shape.rows(), stencil.shape.cols());
    let f = p.source.clone();
    c.bench_function("max_residual 32x32", |b| b.iter(|| black_box(stencil.max_residual(&u, &f))));
}

criterion_group!(benches, bench_build_matrix, bench_max_residual);
criterion_main!(benches);
