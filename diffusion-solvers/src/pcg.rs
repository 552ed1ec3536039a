use crate::cg::{find_asymmetry, CgParams};
use crate::driver::FPState;
use crate::preconditioner::{JacobiPreconditioner, Preconditioner};
use diffusion_core::{dot, gemv_general, norm_inf, norm_l2, residual, scal, DiffusionError, DiffusionResult, LinearSystem, Scalar};
use std::sync::Arc;

/// Jacobi-preconditioned Conjugate Gradient. Ported from
/// `original_source/submissions/shumilov_inlab11/include/methods/
/// linalg/Axb/pcg.h`'s `PCGState`. Shares [`CgParams`] for the
/// residual-refresh schedule, since the original's `PCGParams` differs
/// only by also naming a preconditioner type, which this crate fixes
/// to Jacobi (the only one the original ever implements).
pub struct PcgState<T> {
    system: Arc<LinearSystem<T>>,
    params: CgParams,
    preconditioner: JacobiPreconditioner<T>,
    x: Vec<T>,
    r: Vec<T>,
    d: Vec<T>,
    error: T,
    iter: usize,
}

impl<T: Scalar> PcgState<T> {
    pub fn new(system: Arc<LinearSystem<T>>, params: CgParams) -> DiffusionResult<Self> {
        let n = system.rank();
        Self::with_initial_guess(system, params, vec![T::zero(); n])
    }

    /// Same as [`Self::new`], seeding the iterate with `x0`.
    pub fn with_initial_guess(system: Arc<LinearSystem<T>>, params: CgParams, x0: Vec<T>) -> DiffusionResult<Self> {
        if let Some((i, j)) = find_asymmetry(&system.a, T::zero(), T::from(1e-12).unwrap()) {
            return Err(DiffusionError::invalid(
                "A",
                format!("A[{i},{j}] != A[{j},{i}]"),
                "A must be symmetric for Preconditioned Conjugate Gradient",
            ));
        }
        if x0.len() != system.rank() {
            return Err(DiffusionError::invalid("x0", x0.len(), format!("must match A's rank ({})", system.rank())));
        }

        let preconditioner = JacobiPreconditioner::new(&system);
        let r = residual(&system.a, &x0, &system.b);
        let d = preconditioner.apply_new(&r);
        let error = norm_l2(&r) / norm_l2(&system.b);

        Ok(PcgState {
            x: x0,
            r,
            d,
            system,
            params,
            preconditioner,
            error,
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

impl<T: Scalar> crate::result::AxbState<T> for PcgState<T> {
    fn x(&self) -> &[T] {
        self.x()
    }

    fn residual(&self) -> T {
        self.residual()
    }
}

impl<T: Scalar> FPState<T> for PcgState<T> {
    fn update(&mut self) {
        let a = &self.system.a;
        let n = a.rows();

        let z = self.preconditioner.apply_new(&self.r);
        let mut ad = vec![T::zero(); n];
        gemv_general(a, &self.d, &mut ad, T::one(), T::zero());

        let r_dot_z_prev = dot(&self.r, &z);
        let alpha = r_dot_z_prev / dot(&self.d, &ad);

        diffusion_core::axpy(&self.d, &mut self.x, alpha);

        if self.params.should_refresh_residual(self.iter) {
            self.r = residual(a, &self.x, &self.system.b);
        } else {
            diffusion_core::axpy(&ad, &mut self.r, -alpha);
        }

        let z_new = self.preconditioner.apply_new(&self.r);
        let r_dot_z = dot(&self.r, &z_new);
        let beta = r_dot_z / r_dot_z_prev;
        scal(&mut self.d, beta);
        diffusion_core::axpy(&z_new, &mut self.d, T::one());

        self.error = norm_l2(&self.r) / norm_l2(&self.system.b);
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

    #[test]
    fn seeded_initial_guess_starts_with_a_near_zero_residual() {
        let a = Matrix::from_func(4, 4, |i, j| if i == j { 6.0 } else { -1.0 }, Symmetry::Symmetric, Diag::NonUnit);
        let b = vec![1.0, 2.0, 3.0, 4.0];
        let system = Arc::new(LinearSystem::new(a, b).unwrap());
        let (x_star, _) = diffusion_lu::solve(system.a.clone(), &system.b);
        let state = PcgState::with_initial_guess(system, CgParams::default(), x_star).unwrap();
        assert!(state.error < 1e-8, "seeded error should already be tiny, got {}", state.error);
    }

    #[test]
    fn converges_on_spd_system() {
        let a = Matrix::from_func(4, 4, |i, j| if i == j { 6.0 } else { -1.0 }, Symmetry::Symmetric, Diag::NonUnit);
        let b = vec![1.0, 2.0, 3.0, 4.0];
        let system = Arc::new(LinearSystem::new(a, b).unwrap());
        let mut state = PcgState::new(system.clone(), CgParams::default()).unwrap();
        let settings = FPSettings::new(1e-10_f64, system.rank()).unwrap();
        let outcome = run(&mut state, &settings);
        assert!(outcome.converged);
        let r = residual(&system.a, state.x(), &system.b);
        assert!(norm_inf(&r) < 1e-6);
    }
}
