use crate::driver::FPState;
use crate::relaxation::{has_zero_diagonal, relative_diff, row_dot_off_diagonal};
use diffusion_core::{residual, norm_inf, DiffusionError, DiffusionResult, LinearSystem, Scalar};
use std::sync::Arc;

/// Gauss-Seidel: identical row update to Point-Jacobi, but reads
/// already-updated entries for `j < i`, so a single `x` vector
/// suffices (spec.md §4.4).
pub struct GsState<T> {
    system: Arc<LinearSystem<T>>,
    x: Vec<T>,
    error: T,
    iter: usize,
}

impl<T: Scalar> GsState<T> {
    pub fn new(system: Arc<LinearSystem<T>>) -> DiffusionResult<Self> {
        let n = system.rank();
        Self::with_initial_guess(system, vec![T::zero(); n])
    }

    /// Same as [`Self::new`], but seeds the iterate with `x0` instead of
    /// the zero vector (spec.md §8's idempotent-convergence scenario:
    /// starting from the exact solution, the first `update()` should
    /// leave `x` essentially unchanged).
    pub fn with_initial_guess(system: Arc<LinearSystem<T>>, x0: Vec<T>) -> DiffusionResult<Self> {
        if let Some(i) = has_zero_diagonal(&system) {
            return Err(DiffusionError::invalid("A", format!("A[{i},{i}] == 0"), "diagonal must be non-zero for Gauss-Seidel"));
        }
        if x0.len() != system.rank() {
            return Err(DiffusionError::invalid("x0", x0.len(), format!("must match A's rank ({})", system.rank())));
        }
        Ok(GsState {
            system,
            x: x0,
            error: T::infinity(),
            iter: 0,
        })
    }

    #[must_use]
    pub fn x(&self) -> &[T] {
        &self.x
    }

    #[must_use]
    pub fn residual(&self) -> T {
        norm_inf(&residual(&self.system.a, &self.x, &self.system.b))
    }
}

impl<T: Scalar> crate::result::AxbState<T> for GsState<T> {
    fn x(&self) -> &[T] {
        self.x()
    }

    fn residual(&self) -> T {
        self.residual()
    }
}

impl<T: Scalar> FPState<T> for GsState<T> {
    fn update(&mut self) {
        let n = self.system.rank();
        let mut max_rel = T::zero();
        for i in 0..n {
            let dot = row_dot_off_diagonal(&self.system, i, &self.x);
            let next = (self.system.b[i] - dot) / self.system.a[(i, i)];
            let rel = relative_diff(next, self.x[i]);
            if rel > max_rel {
                max_rel = rel;
            }
            self.x[i] = next;
        }
        self.error = max_rel;
        self.iter += 1;
    }

    fn error(&self) -> T {
        self.error
    }

    fn iteration(&self) -> usize {
        self.iter
    }
}
