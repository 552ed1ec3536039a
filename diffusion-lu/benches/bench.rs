use criterion::{black_box, criterion_group, criterion_main, Criterion};
use diffusion_core::{Diag, Matrix, Symmetry};
use diffusion_lu::{default_pivot_tolerance, lup_factor_inplace};

fn bench_lup_factor(c: &mut Criterion) {
    for &n in &[32usize, 64, 128] {
        let a0 = Matrix::from_func(n, n, |i, j| ((i + 1) * (j + 2) % 13) as f64 + if i == j { n as f64 } else { 0.0 }, Symmetry::General, Diag::NonUnit);
        c.bench_function(&format!("lup_factor_inplace {n}x{n}"), |b| {
            b.iter(|| {
                let mut a = a0.clone();
                black_box(lup_factor_inplace(&mut a, default_pivot_tolerance()));
            })
        });
    }
}

criterion_group!(benches, bench_lup_factor);
criterion_main!(benches);
