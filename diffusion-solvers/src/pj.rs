use crate::driver::FPState;
use crate::relaxation::{has_zero_diagonal, relative_diff, row_dot_off_diagonal};
use diffusion_core::{residual, norm_inf, DiffusionError, DiffusionResult, LinearSystem, Scalar};
use rayon::prelude::*;
use std::sync::Arc;

/// Point-Jacobi: every row uses only the previous iterate, so a
/// scratch buffer is swapped in at the end of each sweep. Ported from
/// `original_source/include/methods/linalg/Axb/point_jacobi.h`.
pub struct PjState<T> {
    system: Arc<LinearSystem<T>>,
    x: Vec<T>,
    scratch: Vec<T>,
    error: T,
    iter: usize,
}

impl<T: Scalar> PjState<T> {
    pub fn new(system: Arc<LinearSystem<T>>) -> DiffusionResult<Self> {
        let n = system.rank();
        Self::with_initial_guess(system, vec![T::zero(); n])
    }

    /// Same as [`Self::new`], seeding the iterate with `x0`.
    pub fn with_initial_guess(system: Arc<LinearSystem<T>>, x0: Vec<T>) -> DiffusionResult<Self> {
        if let Some(i) = has_zero_diagonal(&system) {
            return Err(DiffusionError::invalid("A", format!("A[{i},{i}] == 0"), "diagonal must be non-zero for Point-Jacobi"));
        }
        if x0.len() != system.rank() {
            return Err(DiffusionError::invalid("x0", x0.len(), format!("must match A's rank ({})", system.rank())));
        }
        let n = system.rank();
        Ok(PjState {
            system,
            x: x0,
            scratch: vec![T::zero(); n],
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

impl<T: Scalar> crate::result::AxbState<T> for PjState<T> {
    fn x(&self) -> &[T] {
        self.x()
    }

    fn residual(&self) -> T {
        self.residual()
    }
}

impl<T: Scalar> FPState<T> for PjState<T> {
    fn update(&mut self) {
        // Every row reads only last sweep's `x`, so the sweep is an
        // embarrassingly parallel map rather than the in-place,
        // necessarily-sequential update GS and SOR require.
        let system = &self.system;
        let old_x: &[T] = &self.x;
        self.scratch.par_iter_mut().enumerate().for_each(|(i, slot)| {
            let dot = row_dot_off_diagonal(system, i, old_x);
            *slot = (system.b[i] - dot) / system.a[(i, i)];
        });

        let max_rel = self
            .x
            .par_iter()
            .zip(self.scratch.par_iter())
            .map(|(&prev, &next)| relative_diff(next, prev))
            .reduce(T::zero, |a, b| if a > b { a } else { b });

        std::mem::swap(&mut self.x, &mut self.scratch);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::run;
    use crate::settings::FPSettings;
    use diffusion_core::{Diag, Matrix, Symmetry};

    fn diag_dominant_system() -> Arc<LinearSystem<f64>> {
        let a = Matrix::from_func(3, 3, |i, j| if i == j { 4.0 } else { 1.0 }, Symmetry::General, Diag::NonUnit);
        let b = vec![6.0, 6.0, 6.0];
        Arc::new(LinearSystem::new(a, b).unwrap())
    }

    #[test]
    fn seeded_initial_guess_converges_in_few_iterations_from_the_exact_solution() {
        let system = diag_dominant_system();
        let mut state = PjState::with_initial_guess(system, vec![1.0, 1.0, 1.0]).unwrap();
        let settings = FPSettings::new(1e-10_f64, 1000).unwrap();
        let outcome = run(&mut state, &settings);
        assert!(outcome.converged);
        assert!(outcome.iterations <= 2);
    }

    #[test]
    fn converges_on_diagonally_dominant_system() {
        let system = diag_dominant_system();
        let mut state = PjState::new(system).unwrap();
        let settings = FPSettings::new(1e-10_f64, 1000).unwrap();
        let outcome = run(&mut state, &settings);
        assert!(outcome.converged);
        for v in state.x() {
            assert!((v - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn rejects_zero_diagonal() {
        let a = Matrix::from_func(2, 2, |_, _| 0.0, Symmetry::General, Diag::NonUnit);
        let system = Arc::new(LinearSystem::new(a, vec![0.0, 0.0]).unwrap());
        assert!(PjState::new(system).is_err());
    }
}
