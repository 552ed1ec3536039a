use crate::blas::residual;
use crate::error::{DiffusionError, DiffusionResult};
use crate::matrix::Matrix;
use crate::scalar::Scalar;
use std::sync::Arc;

/// An owned `(A, b)` pair, shared by reference between a solver driver
/// and its per-iteration state (spec.md §3). `Arc` gives cheap,
/// logically-immutable sharing without the driver and the state having
/// to agree on a lifetime, which is what the teacher's `faer_core`
/// views do via borrowing where Rust's stricter ownership model would
/// otherwise force a clone.
#[derive(Debug, Clone)]
pub struct LinearSystem<T> {
    pub a: Matrix<T>,
    pub b: Vec<T>,
}

impl<T: Scalar> LinearSystem<T> {
    pub fn new(a: Matrix<T>, b: Vec<T>) -> DiffusionResult<Self> {
        if !a.is_square() {
            return Err(DiffusionError::invalid("A", format!("{}x{}", a.rows(), a.cols()), "must be square"));
        }
        if a.rows() != b.len() {
            return Err(DiffusionError::invalid(
                "b",
                b.len(),
                format!("must match A's rank ({})", a.rows()),
            ));
        }
        Ok(LinearSystem { a, b })
    }

    #[must_use]
    pub fn rank(&self) -> usize {
        self.a.rows()
    }

    /// `b - A * x`.
    #[must_use]
    pub fn residual(&self, x: &[T]) -> Vec<T> {
        residual(&self.a, x, &self.b)
    }

    #[must_use]
    pub fn shared(self) -> Arc<LinearSystem<T>> {
        Arc::new(self)
    }
}
