use crate::ordering::{apply_inner, ApplyOrdering};
use assert2::debug_assert;
use diffusion_core::{Diag, Matrix, Scalar, Shape2D, Symmetry};

/// A translation-invariant 5-point operator over a padded field whose
/// boundary layer of zeros is never written by a solver. Ported from
/// `original_source/include/methods/stencil.h`'s `ConstantStencil2D`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantStencil2D<T> {
    /// Shape of the padded field (interior + one-cell boundary layer).
    pub shape: Shape2D,
    pub center: T,
    pub north: T,
    pub south: T,
    pub east: T,
    pub west: T,
}

impl<T: Scalar> ConstantStencil2D<T> {
    #[must_use]
    pub fn new(shape: Shape2D, center: T, north: T, south: T, east: T, west: T) -> Self {
        ConstantStencil2D {
            shape,
            center,
            north,
            south,
            east,
            west,
        }
    }

    #[must_use]
    pub fn inner_rows(&self) -> usize {
        self.shape.rows().saturating_sub(2)
    }

    #[must_use]
    pub fn inner_cols(&self) -> usize {
        self.shape.cols().saturating_sub(2)
    }

    fn is_valid_field(&self, u: &Matrix<T>) -> bool {
        u.shape() == self.shape
    }

    /// `(Au)[i,j] = center*u[i,j] + north*u[i-1,j] + south*u[i+1,j]
    ///             + west*u[i,j-1] + east*u[i,j+1]`, at one interior
    /// cell of the padded field `u`.
    #[must_use]
    pub fn apply_at(&self, i: usize, j: usize, u: &Matrix<T>) -> T {
        debug_assert!(self.is_valid_field(u));
        debug_assert!(i > 0 && i + 1 < self.shape.rows() && j > 0 && j + 1 < self.shape.cols());
        self.center * u[(i, j)] + self.north * u[(i - 1, j)] + self.south * u[(i + 1, j)] + self.west * u[(i, j - 1)] + self.east * u[(i, j + 1)]
    }

    /// Visit every interior cell of the padded field in the given
    /// order, calling `f(i, j, apply_at(i, j, u))`.
    pub fn apply(&self, u: &Matrix<T>, ordering: ApplyOrdering, mut f: impl FnMut(usize, usize, T)) {
        debug_assert!(self.is_valid_field(u));
        apply_inner(self.shape.rows(), self.shape.cols(), ordering, |i, j| {
            f(i, j, self.apply_at(i, j, u));
        });
    }

    /// `max_{i,j} |f[i-1,j-1] - (Au)[i,j]|` over every interior cell;
    /// `f` has the interior (unpadded) shape.
    #[must_use]
    pub fn max_residual(&self, u: &Matrix<T>, f: &Matrix<T>) -> T {
        debug_assert!(self.is_valid_field(u));
        debug_assert!(f.rows() == self.inner_rows() && f.cols() == self.inner_cols());

        let mut max_r = T::zero();
        self.apply(u, ApplyOrdering::Sequential, |i, j, au| {
            let r = (f[(i - 1, j - 1)] - au).abs();
            if r > max_r {
                max_r = r;
            }
        });
        max_r
    }

    /// Dense materialization of the operator over the `inner_rows *
    /// inner_cols` interior unknowns, in row-major `(i, j)` order. Used
    /// by the direct LU solver (spec.md §4.2).
    #[must_use]
    pub fn build_matrix(&self) -> Matrix<T> {
        let inner = Shape2D::new(self.inner_rows(), self.inner_cols()).expect("stencil must have a non-degenerate interior");
        let n = inner.nelems();

        Matrix::from_func(
            n,
            n,
            |row, col| {
                if row == col {
                    return self.center;
                }
                let (i_f, j_f) = inner.unravel(row);
                let (i_u, j_u) = inner.unravel(col);

                if j_u == j_f {
                    if i_f > 0 && i_f - 1 == i_u {
                        return self.north;
                    }
                    if i_f + 1 < inner.rows() && i_f + 1 == i_u {
                        return self.south;
                    }
                } else if i_u == i_f {
                    if j_f > 0 && j_f - 1 == j_u {
                        return self.west;
                    }
                    if j_f + 1 < inner.cols() && j_f + 1 == j_u {
                        return self.east;
                    }
                }
                T::zero()
            },
            Symmetry::General,
            Diag::NonUnit,
        )
    }
}
