use diffusion_core::{LinearSystem, Scalar};

/// `Σ_{j != i} A[i,j] * x[j]`, the off-diagonal row contribution shared
/// by PJ, GS and SOR (`original_source/include/methods/linalg/Axb/
/// {point_jacobi,sor}.h`'s identical inner loop).
#[must_use]
pub(crate) fn row_dot_off_diagonal<T: Scalar>(system: &LinearSystem<T>, i: usize, x: &[T]) -> T {
    let a = &system.a;
    let mut dot = T::zero();
    for j in 0..i {
        dot = dot + a[(i, j)] * x[j];
    }
    for j in (i + 1)..a.cols() {
        dot = dot + a[(i, j)] * x[j];
    }
    dot
}

/// Relative difference `|next - prev| / |prev|`, with `|0|/|0| = 0` per
/// spec.md §4.4's convention for the PJ/GS/SOR error metric.
#[must_use]
pub(crate) fn relative_diff<T: Scalar>(next: T, prev: T) -> T {
    let diff = (next - prev).abs();
    let denom = prev.abs();
    if denom == T::zero() {
        diff
    } else {
        diff / denom
    }
}

/// `A[i,i] == 0` for some `i`: row relaxation is undefined. Grounded on
/// `original_source/include/methods/linalg/utils/math.h`'s
/// `is_diag_nonzero` precondition, checked by PJ/GS/SOR's constructors.
#[must_use]
pub(crate) fn has_zero_diagonal<T: Scalar>(system: &LinearSystem<T>) -> Option<usize> {
    (0..system.rank()).find(|&i| system.a[(i, i)] == T::zero())
}
