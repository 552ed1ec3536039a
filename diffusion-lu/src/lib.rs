//! In-place LU and LUP factorization with partial pivoting, triangular
//! solves, and a direct-solve baseline.

use assert2::{assert, debug_assert};
use diffusion_core::{gemv, Diag, Matrix, Scalar, Symmetry};

/// Whether a factorization encountered a pivot too close to zero to
/// trust. Reported, not fatal: the factors are still returned and
/// usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotStatus {
    Success,
    SmallPivot,
}

impl PivotStatus {
    #[must_use]
    pub fn is_small_pivot(self) -> bool {
        matches!(self, PivotStatus::SmallPivot)
    }
}

/// Pivot magnitude below which a factorization is flagged, expressed as
/// a fraction of `T`'s machine epsilon rather than a hardcoded `1e-8`
/// (the original's default), so the same tolerance is meaningful for
/// both `f32` and `f64`.
#[must_use]
pub fn default_pivot_tolerance<T: Scalar>() -> T {
    T::epsilon() * T::from(1e4).unwrap()
}

fn eliminate_column<T: Scalar>(a: &mut Matrix<T>, k: usize, tol: T, status: &mut PivotStatus) {
    if a[(k, k)].abs() < tol {
        *status = PivotStatus::SmallPivot;
    }
    let pivot = a[(k, k)];
    for i in (k + 1)..a.rows() {
        let factor = a[(i, k)] / pivot;
        a[(i, k)] = factor;
        for j in (k + 1)..a.cols() {
            let akj = a[(k, j)];
            a[(i, j)] = a[(i, j)] - factor * akj;
        }
    }
}

/// Combined `L\U` in-place factorization with no pivoting: the strict
/// lower triangle becomes the unit-lower multipliers, the upper
/// triangle (including the diagonal) becomes `U`.
pub fn lu_factor_inplace<T: Scalar>(a: &mut Matrix<T>, tol: T) -> PivotStatus {
    let n = a.rows().min(a.cols());
    let mut status = PivotStatus::Success;
    for k in 0..n.saturating_sub(1) {
        eliminate_column(a, k, tol, &mut status);
    }
    if n > 0 && a[(n - 1, n - 1)].abs() < tol {
        status = PivotStatus::SmallPivot;
        log::warn!("small pivot encountered at ({}, {}): |{}| < {}", n - 1, n - 1, a[(n - 1, n - 1)], tol);
    } else if status.is_small_pivot() {
        log::warn!("small pivot encountered during LU factorization");
    }
    status
}

/// Same as [`lu_factor_inplace`] with the default tolerance.
pub fn lu_factor_inplace_default<T: Scalar>(a: &mut Matrix<T>) -> PivotStatus {
    lu_factor_inplace(a, default_pivot_tolerance())
}

/// Partial-pivoting row-permutation LUP factorization. Returns the
/// permutation matrix `P` (`P * A == L * U`) and the pivot status. Ties
/// in the pivot search are resolved by the lowest row index.
pub fn lup_factor_inplace<T: Scalar>(a: &mut Matrix<T>, tol: T) -> (Matrix<T>, PivotStatus) {
    assert!(a.is_square(), "lup_factor_inplace requires a square matrix");
    let n = a.rows();
    let mut status = PivotStatus::Success;
    let mut row_perm: Vec<usize> = (0..n).collect();

    for k in 0..n.saturating_sub(1) {
        let mut pivot_row = k;
        let mut pivot_val = a[(k, k)].abs();
        for i in (k + 1)..n {
            let v = a[(i, k)].abs();
            if v > pivot_val {
                pivot_val = v;
                pivot_row = i;
            }
        }
        if pivot_row != k {
            row_perm.swap(k, pivot_row);
            a.swaprows(k, pivot_row);
        }
        eliminate_column(a, k, tol, &mut status);
    }
    if n > 0 && a[(n - 1, n - 1)].abs() < tol {
        status = PivotStatus::SmallPivot;
    }
    if status.is_small_pivot() {
        log::warn!("small pivot encountered during LUP factorization");
    }

    (Matrix::from_permutation(&row_perm), status)
}

pub fn lup_factor_inplace_default<T: Scalar>(a: &mut Matrix<T>) -> (Matrix<T>, PivotStatus) {
    lup_factor_inplace(a, default_pivot_tolerance())
}

/// Splits a combined `L\U` buffer into a materialized unit-lower `L`,
/// leaving `U` (including the diagonal) in `lu`. Implemented as a swap
/// between `lu`'s strict lower triangle and a freshly built identity,
/// so `lu` becomes pure `U` as a side effect.
pub fn extract_lowerunit_inplace<T: Scalar>(lu: &mut Matrix<T>) -> Matrix<T> {
    assert!(lu.is_square(), "extract_lowerunit_inplace requires a square matrix");
    let n = lu.rows();
    let mut l = Matrix::eye(n, n);
    for i in 0..n {
        for j in 0..i {
            let lij = l[(i, j)];
            l[(i, j)] = lu[(i, j)];
            lu[(i, j)] = lij;
        }
    }
    l
}

/// Factor `a` (consuming it) into separate `(L, U, status)`.
#[must_use]
pub fn lu_factor<T: Scalar>(mut a: Matrix<T>, tol: T) -> (Matrix<T>, Matrix<T>, PivotStatus) {
    let status = lu_factor_inplace(&mut a, tol);
    let l = extract_lowerunit_inplace(&mut a);
    (l, a, status)
}

/// Factor `a` (consuming it) into separate `(L, U, P, status)`.
#[must_use]
pub fn lup_factor<T: Scalar>(mut a: Matrix<T>, tol: T) -> (Matrix<T>, Matrix<T>, Matrix<T>, PivotStatus) {
    let (p, status) = lup_factor_inplace(&mut a, tol);
    let l = extract_lowerunit_inplace(&mut a);
    (l, a, p, status)
}

/// Solve `L * x = b` by forward substitution. `diag == Unit` skips the
/// division by `L[i, i]` (for a combined-buffer unit-lower triangle).
#[must_use]
pub fn forward_substitution<T: Scalar>(l: &Matrix<T>, b: &[T], diag: Diag) -> Vec<T> {
    assert!(l.is_square());
    debug_assert!(l.rows() == b.len());

    let mut x = vec![T::zero(); l.rows()];
    for i in 0..l.rows() {
        let mut xi = b[i];
        for j in 0..i {
            xi = xi - l[(i, j)] * x[j];
        }
        if diag == Diag::NonUnit {
            xi = xi / l[(i, i)];
        }
        x[i] = xi;
    }
    x
}

/// Solve `U * x = b` by back substitution, from the last row upward.
#[must_use]
pub fn backward_substitution<T: Scalar>(u: &Matrix<T>, b: &[T]) -> Vec<T> {
    assert!(u.is_square());
    debug_assert!(u.rows() == b.len());

    let n = u.rows();
    let mut x = vec![T::zero(); n];
    for i in (0..n).rev() {
        let mut xi = b[i];
        for j in (i + 1)..n {
            xi = xi - u[(i, j)] * x[j];
        }
        x[i] = xi / u[(i, i)];
    }
    x
}

/// `lu_solve(L, U, b) = backward_substitution(U, forward_substitution(L, b))`.
#[must_use]
pub fn lu_solve<T: Scalar>(l: &Matrix<T>, u: &Matrix<T>, b: &[T], lower_diag: Diag) -> Vec<T> {
    let y = forward_substitution(l, b, lower_diag);
    backward_substitution(u, &y)
}

/// `lu_solve` over a combined buffer (unit-lower diagonal implied).
#[must_use]
pub fn lu_solve_combined<T: Scalar>(lu: &Matrix<T>, b: &[T]) -> Vec<T> {
    lu_solve(lu, lu, b, Diag::Unit)
}

/// `lup_solve(L, U, P, b) = lu_solve(L, U, P * b)`.
#[must_use]
pub fn lup_solve<T: Scalar>(l: &Matrix<T>, u: &Matrix<T>, p: &Matrix<T>, b: &[T], lower_diag: Diag) -> Vec<T> {
    let z = p * b;
    lu_solve(l, u, &z, lower_diag)
}

/// `lup_solve` over a combined buffer.
#[must_use]
pub fn lup_solve_combined<T: Scalar>(lu: &Matrix<T>, p: &Matrix<T>, b: &[T]) -> Vec<T> {
    lup_solve(lu, lu, p, b, Diag::Unit)
}

/// Residual of a combined-buffer LU solve, computed without
/// materializing `L`/`U` separately: `b - L * (U * x)`, using
/// triangular `gemv`. Mirrors `diffusion_solver.h`'s
/// `LUPSolver::calculate_residual`.
#[must_use]
pub fn lu_residual<T: Scalar>(lu: &Matrix<T>, x: &[T], b: &[T]) -> Vec<T> {
    let mut ux = vec![T::zero(); lu.cols()];
    gemv(lu, x, &mut ux, T::one(), T::zero(), Symmetry::Upper, Diag::NonUnit);

    let mut r = b.to_vec();
    gemv(lu, &ux, &mut r, -T::one(), T::one(), Symmetry::Lower, Diag::Unit);
    r
}

/// Solve `A * x = b` directly via partial-pivoting LU, returning `x`
/// and the pivot status. The baseline used to cross-check the
/// iterative solvers.
pub fn solve<T: Scalar>(a: Matrix<T>, b: &[T]) -> (Vec<T>, PivotStatus) {
    let mut lu = a;
    let (p, status) = lup_factor_inplace_default(&mut lu);
    let x = lup_solve_combined(&lu, &p, b);
    (x, status)
}
