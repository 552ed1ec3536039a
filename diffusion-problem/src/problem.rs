use crate::grid::Grid2D;
use crate::stencil::ConstantStencil2D;
use diffusion_core::{Diag, DiffusionError, DiffusionResult, LinearSystem, Matrix, Scalar, Shape2D, Symmetry};

/// Two-dimensional steady-state one-speed neutron diffusion problem on
/// a rectangular, homogeneous, isotropic-scattering medium with
/// zero-Dirichlet boundaries. Ported from `original_source/include/
/// project/diffusion_problem.h`'s `IsotropicSteadyStateDiffusion2D`.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffusionProblem<T> {
    pub grid: Grid2D<T>,
    pub diffusion_coefficient: T,
    pub absorption_scattering: T,
    /// Fixed source, interior shape `(M, N)`; row-major, non-negative.
    pub source: Matrix<T>,
}

impl<T: Scalar> DiffusionProblem<T> {
    pub fn new(grid: Grid2D<T>, diffusion_coefficient: T, absorption_scattering: T, source: Matrix<T>) -> DiffusionResult<Self> {
        if diffusion_coefficient <= T::zero() {
            return Err(DiffusionError::invalid("diffusion_coefficient", diffusion_coefficient, "must be positive"));
        }
        if absorption_scattering < T::zero() {
            return Err(DiffusionError::invalid("absorption_scattering", absorption_scattering, "must be non-negative"));
        }
        if source.rows() != grid.points.nx || source.cols() != grid.points.ny {
            return Err(DiffusionError::invalid(
                "source",
                format!("{}x{}", source.rows(), source.cols()),
                format!("must match the grid's interior shape {}x{}", grid.points.nx, grid.points.ny),
            ));
        }
        if source.data().iter().any(|&v| v < T::zero()) {
            return Err(DiffusionError::invalid("source", "<negative entry>", "every source value must be non-negative"));
        }

        Ok(DiffusionProblem {
            grid,
            diffusion_coefficient,
            absorption_scattering,
            source,
        })
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.grid.points.nx
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.grid.points.ny
    }

    /// `-D / hx^2`, the north/south stencil coefficient.
    #[must_use]
    fn horizontal_coefficient(&self) -> T {
        let hx = self.grid.dx();
        -self.diffusion_coefficient / (hx * hx)
    }

    /// `-D / hy^2`, the east/west stencil coefficient.
    #[must_use]
    fn vertical_coefficient(&self) -> T {
        let hy = self.grid.dy();
        -self.diffusion_coefficient / (hy * hy)
    }

    /// The constant 5-point stencil implementing this problem's
    /// operator, per spec.md §4.3's coefficient formulas.
    #[must_use]
    pub fn stencil(&self) -> ConstantStencil2D<T> {
        let two = T::one() + T::one();
        let north_south = self.horizontal_coefficient();
        let east_west = self.vertical_coefficient();
        let center = -two * (north_south + east_west) + self.absorption_scattering;
        let padded = Shape2D::new(self.rows() + 2, self.cols() + 2).expect("rows/cols already validated positive at construction");

        ConstantStencil2D::new(padded, center, north_south, north_south, east_west, east_west)
    }

    /// Flatten the source into the right-hand side vector, in the same
    /// row-major order as the dense operator from [`Self::build_matrix`].
    #[must_use]
    pub fn build_rhs(&self) -> Vec<T> {
        self.source.data().to_vec()
    }

    /// Dense `(M*N) x (M*N)` operator for the direct LU solve.
    #[must_use]
    pub fn build_matrix(&self) -> Matrix<T> {
        self.stencil().build_matrix()
    }

    /// The dense operator and right-hand side as a single
    /// [`LinearSystem`], ready for any solver in `diffusion-solvers`.
    pub fn build_system(&self) -> DiffusionResult<LinearSystem<T>> {
        LinearSystem::new(self.build_matrix(), self.build_rhs())
    }

    /// Embed an interior-only iterate `x` (row-major, length
    /// `rows*cols`) into a padded field with a zero boundary layer, the
    /// representation [`ConstantStencil2D`] operates on.
    #[must_use]
    pub fn embed_interior(&self, x: &[T]) -> Matrix<T> {
        debug_assert_eq!(x.len(), self.rows() * self.cols());
        let padded_rows = self.rows() + 2;
        let padded_cols = self.cols() + 2;
        Matrix::from_func(
            padded_rows,
            padded_cols,
            |i, j| {
                if i == 0 || j == 0 || i == padded_rows - 1 || j == padded_cols - 1 {
                    T::zero()
                } else {
                    x[(i - 1) * self.cols() + (j - 1)]
                }
            },
            Symmetry::General,
            Diag::NonUnit,
        )
    }

    /// Inverse of [`Self::embed_interior`]: strip the boundary layer
    /// and flatten the interior back into a row-major vector.
    #[must_use]
    pub fn extract_interior(&self, u: &Matrix<T>) -> Vec<T> {
        let mut out = Vec::with_capacity(self.rows() * self.cols());
        for i in 1..=self.rows() {
            for j in 1..=self.cols() {
                out.push(u[(i, j)]);
            }
        }
        out
    }

    /// Reshape an interior-only iterate into the `(M, N)` flux matrix
    /// returned to the caller (spec.md §6).
    #[must_use]
    pub fn flux_matrix(&self, x: &[T]) -> Matrix<T> {
        let rows = self.rows();
        let cols = self.cols();
        Matrix::from_func(rows, cols, |i, j| x[i * cols + j], Symmetry::General, Diag::NonUnit)
    }
}
