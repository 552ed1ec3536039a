use crate::settings::FPSettings;
use diffusion_core::Scalar;

/// The capability every concrete solver state offers the driver:
/// advance one iteration, and report the current error and iteration
/// count. Ported from `original_source/include/methods/fixed_point/
/// algorithm.h`'s `FPState`/`FixedPoint::solve` split, expressed as a
/// trait instead of a virtual base so the driver below is generic
/// rather than duplicated per algorithm (spec.md §9's design note).
pub trait FPState<T: Scalar> {
    /// Advance one iteration; must update both the error and the
    /// iteration count as a side effect.
    fn update(&mut self);
    fn error(&self) -> T;
    fn iteration(&self) -> usize;
}

/// Outcome of running a [`FPState`] to convergence or exhaustion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPointOutcome<T> {
    pub converged: bool,
    /// Set when the error became `NaN`: the run is treated as
    /// divergence, not ordinary non-convergence (spec.md §7).
    pub diverged: bool,
    pub error: T,
    pub iterations: usize,
}

/// `while iter < max_iter and error >= tolerance: state.update()`,
/// shared by every algorithm in this crate (spec.md §4.4).
pub fn run<T: Scalar, S: FPState<T>>(state: &mut S, settings: &FPSettings<T>) -> FixedPointOutcome<T> {
    loop {
        let error = state.error();
        if error.is_nan() {
            log::warn!("fixed-point iteration diverged (NaN error) at iteration {}", state.iteration());
            return FixedPointOutcome {
                converged: false,
                diverged: true,
                error,
                iterations: state.iteration(),
            };
        }
        if error < settings.tolerance || state.iteration() >= settings.max_iter {
            break;
        }
        state.update();
        log::trace!("iteration {}: error = {}", state.iteration(), state.error());
    }

    let error = state.error();
    let converged = !error.is_nan() && error < settings.tolerance;
    if !converged {
        log::debug!("fixed-point iteration did not converge within {} iterations (error = {})", settings.max_iter, error);
    }
    FixedPointOutcome {
        converged,
        diverged: false,
        error,
        iterations: state.iteration(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        iter: usize,
        error: f64,
    }

    impl FPState<f64> for Counter {
        fn update(&mut self) {
            self.iter += 1;
            self.error *= 0.5;
        }
        fn error(&self) -> f64 {
            self.error
        }
        fn iteration(&self) -> usize {
            self.iter
        }
    }

    #[test]
    fn converges_when_error_drops_below_tolerance() {
        let mut state = Counter { iter: 0, error: 1.0 };
        let settings = FPSettings::new(1e-3_f64, 100).unwrap();
        let outcome = run(&mut state, &settings);
        assert!(outcome.converged);
        assert!(!outcome.diverged);
    }

    #[test]
    fn reports_non_convergence_on_exhaustion() {
        struct Stuck {
            iter: usize,
        }
        impl FPState<f64> for Stuck {
            fn update(&mut self) {
                self.iter += 1;
            }
            fn error(&self) -> f64 {
                1.0
            }
            fn iteration(&self) -> usize {
                self.iter
            }
        }
        let mut state = Stuck { iter: 0 };
        let settings = FPSettings::new(1e-8_f64, 5).unwrap();
        let outcome = run(&mut state, &settings);
        assert!(!outcome.converged);
        assert!(!outcome.diverged);
        assert_eq!(outcome.iterations, 5);
    }

    #[test]
    fn reports_divergence_on_nan() {
        struct Diverging {
            iter: usize,
        }
        impl FPState<f64> for Diverging {
            fn update(&mut self) {
                self.iter += 1;
            }
            fn error(&self) -> f64 {
                f64::NAN
            }
            fn iteration(&self) -> usize {
                self.iter
            }
        }
        let mut state = Diverging { iter: 0 };
        let settings = FPSettings::new(1e-8_f64, 5).unwrap();
        let outcome = run(&mut state, &settings);
        assert!(outcome.diverged);
        assert!(!outcome.converged);
    }
}
