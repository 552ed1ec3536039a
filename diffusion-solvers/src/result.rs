use crate::driver::{run, FPState, FixedPointOutcome};
use crate::settings::FPSettings;
use diffusion_core::Scalar;

/// A solver state that, beyond [`FPState`], can report its current
/// iterate and an independent residual check. Implemented by every
/// concrete state in this crate so [`solve`] can drive any of them
/// without the caller matching on which algorithm it is.
pub trait AxbState<T: Scalar>: FPState<T> {
    fn x(&self) -> &[T];
    fn residual(&self) -> T;
}

/// The stable shape every iterative solver returns, ported from
/// `original_source/include/methods/linalg/Axb/utils.h`'s
/// `IterativeAxbResult`.
#[derive(Debug, Clone, PartialEq)]
pub struct IterativeAxbResult<T> {
    pub x: Vec<T>,
    /// The per-algorithm convergence error (relative difference for
    /// PJ/GS/SOR, `||r||` or `||r||/||b||` for CG/PCG).
    pub error: T,
    /// `||b - A*x||_inf` of the returned iterate, independent of the
    /// algorithm's own error metric.
    pub residual: T,
    pub converged: bool,
    pub diverged: bool,
    pub iterations: usize,
}

impl<T: Scalar> IterativeAxbResult<T> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.converged && !self.diverged
    }
}

/// Run `state` to convergence or exhaustion and package the outcome
/// into the stable [`IterativeAxbResult`] shape.
pub fn solve<T: Scalar, S: AxbState<T>>(mut state: S, settings: &FPSettings<T>) -> IterativeAxbResult<T> {
    let FixedPointOutcome {
        converged,
        diverged,
        error,
        iterations,
    } = run(&mut state, settings);

    IterativeAxbResult {
        residual: state.residual(),
        x: state.x().to_vec(),
        error,
        converged,
        diverged,
        iterations,
    }
}
