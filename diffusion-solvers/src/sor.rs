use crate::driver::FPState;
use crate::relaxation::{has_zero_diagonal, relative_diff, row_dot_off_diagonal};
use diffusion_core::{residual, norm_inf, DiffusionError, DiffusionResult, LinearSystem, Scalar};
use std::sync::Arc;

/// Successive Over-Relaxation. Ported from `original_source/include/
/// methods/linalg/Axb/sor.h`. The original rejects `omega <= 1`
/// (`omega > 1.0` assertion); this rendition accepts the full
/// mathematically convergent range `(0, 2)` for symmetric positive
/// definite `A`, treating `omega == 1` as an explicit Gauss-Seidel
/// alias rather than an error — see DESIGN.md's Open Question
/// decisions.
pub struct SorState<T> {
    system: Arc<LinearSystem<T>>,
    omega: T,
    x: Vec<T>,
    error: T,
    iter: usize,
}

impl<T: Scalar> SorState<T> {
    pub fn new(system: Arc<LinearSystem<T>>, omega: T) -> DiffusionResult<Self> {
        let n = system.rank();
        Self::with_initial_guess(system, omega, vec![T::zero(); n])
    }

    /// Same as [`Self::new`], seeding the iterate with `x0`.
    pub fn with_initial_guess(system: Arc<LinearSystem<T>>, omega: T, x0: Vec<T>) -> DiffusionResult<Self> {
        if omega <= T::zero() || omega >= T::one() + T::one() {
            return Err(DiffusionError::invalid("relaxation_factor", omega, "must lie in (0, 2)"));
        }
        if let Some(i) = has_zero_diagonal(&system) {
            return Err(DiffusionError::invalid("A", format!("A[{i},{i}] == 0"), "diagonal must be non-zero for SOR"));
        }
        if x0.len() != system.rank() {
            return Err(DiffusionError::invalid("x0", x0.len(), format!("must match A's rank ({})", system.rank())));
        }
        Ok(SorState {
            system,
            omega,
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
    pub fn omega(&self) -> T {
        self.omega
    }

    #[must_use]
    pub fn residual(&self) -> T {
        norm_inf(&residual(&self.system.a, &self.x, &self.system.b))
    }
}

impl<T: Scalar> crate::result::AxbState<T> for SorState<T> {
    fn x(&self) -> &[T] {
        self.x()
    }

    fn residual(&self) -> T {
        self.residual()
    }
}

impl<T: Scalar> FPState<T> for SorState<T> {
    fn update(&mut self) {
        let n = self.system.rank();
        let mut max_rel = T::zero();
        for i in 0..n {
            let dot = row_dot_off_diagonal(&self.system, i, &self.x);
            let gs_value = (self.system.b[i] - dot) / self.system.a[(i, i)];
            let next = (T::one() - self.omega) * self.x[i] + self.omega * gs_value;
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
