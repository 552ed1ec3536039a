use criterion::{black_box, criterion_group, criterion_main, Criterion};
use diffusion_core::{gemm, gemv_general, Matrix, Symmetry};

fn bench_gemv(c: &mut Criterion) {
    let a = Matrix::from_func(256, 256, |i, j| ((i + j) % 7) as f64, Symmetry::General, diffusion_core::Diag::NonUnit);
    let x = vec![1.0f64; 256];
    let mut y = vec![0.0f64; 256];
    c.bench_function("gemv 256x256", |b| {
        b.iter(|| gemv_general(black_box(&a), black_box(&x), black_box(&mut y), 1.0, 0.0))
    });
}

fn bench_gemm(c: &mut Criterion) {
    let a = Matrix::from_func(96, 96, |i, j| ((i + j) % 5) as f64, Symmetry::General, diffusion_core::Diag::NonUnit);
    let b = Matrix::from_func(96, 96, |i, j| ((2 * i + j) % 5) as f64, Symmetry::General, diffusion_core::Diag::NonUnit);
    let mut c_mat = Matrix::zeros(96, 96);
    c.bench_function("gemm 96x96", |bencher| {
        bencher.iter(|| gemm(black_box(&a), black_box(&b), black_box(&mut c_mat), 1.0, 0.0))
    });
}

criterion_group!(benches, bench_gemv, bench_gemm);
criterion_main!(benches);
