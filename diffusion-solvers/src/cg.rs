use crate::driver::FPState;
use diffusion_core::{dot, gemv_general, norm_inf, residual, scal, DiffusionError, DiffusionResult, LinearSystem, Scalar};
use std::sync::Arc;

/// How often CG/PCG recompute the residual exactly (`r = b - A*x`)
/// rather than updating it recurrently (`r -= alpha * A*d`), trading
/// one extra `gemv` for resistance to floating-point drift. Ported
/// from `original_source/include/methods/linalg/Axb/
/// conjugate_gradient.h`'s `CGParams`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CgParams {
    pub residual_update_frequency: usize,
}

impl Default for CgParams {
    fn default() -> Self {
        CgParams { residual_update_frequency: 10 }
    }
}

impl CgParams {
    #[must_use]
    pub fn should_refresh_residual(&self, iter: usize) -> bool {
        iter % self.residual_update_frequency == 0
    }
}

/// Returns the first `(i, j)` with `i < j` where `A` is asymmetric
/// beyond the given tolerance, or `None` if `A` is symmetric. Ported
/// from `original_source/include/methods/linalg/utils/math.h`'s
/// `find_matrix_assymetry`.
pub(crate) fn find_asymmetry<T: Scalar>(a: &diffusion_core::Matrix<T>, atol: T, rtol: T) -> Option<(usize, usize)> {
    for i in 0..a.rows() {
        for j in (i + 1)..a.cols() {
            let diff = (a[(i, j)] - a[(j, i)]).abs();
            let bound = atol + rtol * a[(i, j)].abs().max(a[(j, i)].abs());
            if diff > bound {
                return Some((i, j));
            }
        }
    }
    None
}

/// Conjugate Gradient for symmetric positive-definite `A`. Ported from
/// `original_source/include/methods/linalg/Axb/conjugate_gradient.h`'s
/// `CGState`.
pub struct CgState<T> {
    system: Arc<LinearSystem<T>>,
    params: CgParams,
    x: Vec<T>,
    r: Vec<T>,
    d: Vec<T>,
    error: T,
    iter: usize,
}

impl<T: Scalar> CgState<T> {
    pub fn new(system: Arc<LinearSystem<T>>, params: CgParams) -> DiffusionResult<Self> {
        let n = system.rank();
        Self::with_initial_guess(system, params, vec![T::zero(); n])
    }

    /// Same as [`Self::new`], seeding the iterate with `x0` rather than
    /// the zero vector: the residual and search direction are derived
    /// from `x0` instead of assumed to equal `b`.
    pub fn with_initial_guess(system: Arc<LinearSystem<T>>, params: CgParams, x0: Vec<T>) -> DiffusionResult<Self> {
        Self::validate_symmetric(&system)?;
        if x0.len() != system.rank() {
            return Err(DiffusionError::invalid("x0", x0.len(), format!("must match A's rank ({})", system.rank())));
        }
        let r = residual(&system.a, &x0, &system.b);
        let error = diffusion_core::norm_l2(&r);
        Ok(CgState {
            x: x0,
            d: r.clone(),
            r,
            system,
            params,
            error,
            iter: 0,
        })
    }

    fn validate_symmetric(system: &LinearSystem<T>) -> DiffusionResult<()> {
        if let Some((i, j)) = find_asymmetry(&system.a, T::zero(), T::from(1e-12).unwrap()) {
            return Err(DiffusionError::invalid(
                "A",
                format!("A[{i},{j}] != A[{j},{i}]"),
                "A must be symmetric for Conjugate Gradient",
            ));
        }
        Ok(())
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

impl<T: Scalar> crate::result::AxbState<T> for CgState<T> {
    fn x(&self) -> &[T] {
        self.x()
    }

    fn residual(&self) -> T {
        self.residual()
    }
}

impl<T: Scalar> FPState<T> for CgState<T> {
    fn update(&mut self) {
        let a = &self.system.a;
        let n = a.rows();

        let mut ad = vec![T::zero(); n];
        gemv_general(a, &self.d, &mut ad, T::one(), T::zero());

        let rprev_dot_rprev = self.error * self.error;
        let alpha = rprev_dot_rprev / dot(&self.d, &ad);

        diffusion_core::axpy(&self.d, &mut self.x, alpha);

        if self.params.should_refresh_residual(self.iter) {
            self.r = residual(a, &self.x, &self.system.b);
        } else {
            diffusion_core::axpy(&ad, &mut self.r, -alpha);
        }

        let r_dot_r = dot(&self.r, &self.r);
        let beta = r_dot_r / rprev_dot_rprev;
        scal(&mut self.d, beta);
        diffusion_core::axpy(&self.r, &mut self.d, T::one());

        self.error = r_dot_r.sqrt();
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

    fn spd_system() -> Arc<LinearSystem<f64>> {
        let a = Matrix::from_func(3, 3, |i, j| if i == j { 4.0 } else { -1.0 }, Symmetry::Symmetric, Diag::NonUnit);
        let b = vec![1.0, 2.0, 3.0];
        Arc::new(LinearSystem::new(a, b).unwrap())
    }

    #[test]
    fn rejects_asymmetric_matrix() {
        let a = Matrix::from_func(2, 2, |i, j| (i * 2 + j) as f64, Symmetry::General, Diag::NonUnit);
        let system = Arc::new(LinearSystem::new(a, vec![1.0, 1.0]).unwrap());
        assert!(CgState::new(system, CgParams::default()).is_err());
    }

    #[test]
    fn seeded_initial_guess_starts_with_a_near_zero_residual() {
        let system = spd_system();
        let (x_star, _) = diffusion_lu::solve(system.a.clone(), &system.b);
        let state = CgState::with_initial_guess(system.clone(), CgParams::default(), x_star).unwrap();
        assert!(state.error < 1e-8, "seeded error should already be tiny, got {}", state.error);
    }

    #[test]
    fn converges_on_spd_system() {
        let system = spd_system();
        let mut state = CgState::new(system.clone(), CgParams::default()).unwrap();
        let settings = FPSettings::new(1e-10_f64, system.rank()).unwrap();
        let outcome = run(&mut state, &settings);
        assert!(outcome.converged);
        let r = residual(&system.a, state.x(), &system.b);
        assert!(norm_inf(&r) < 1e-6);
    }
}
