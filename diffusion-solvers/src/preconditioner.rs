use diffusion_core::{LinearSystem, Matrix, Scalar};

/// A preconditioner's two operations: apply `M^-1` to a vector, and
/// materialize `M^-1` as a dense matrix for diagnostics. Ported from
/// `original_source/submissions/shumilov_inlab11/include/methods/
/// linalg/Axb/pcg.h`'s `Preconditioner` interface.
pub trait Preconditioner<T> {
    fn apply(&self, r: &[T], out: &mut [T]);

    fn apply_new(&self, r: &[T]) -> Vec<T>
    where
        T: Scalar,
    {
        let mut out = vec![T::zero(); r.len()];
        self.apply(r, &mut out);
        out
    }

    fn full_matrix(&self) -> Matrix<T>
    where
        T: Scalar;
}

/// Jacobi preconditioner: `M^-1 = diag(A)^-1`, applied as an
/// elementwise multiply.
pub struct JacobiPreconditioner<T> {
    inv_diag: Vec<T>,
}

impl<T: Scalar> JacobiPreconditioner<T> {
    #[must_use]
    pub fn new(system: &LinearSystem<T>) -> Self {
        let inv_diag = (0..system.rank()).map(|i| T::one() / system.a[(i, i)]).collect();
        JacobiPreconditioner { inv_diag }
    }
}

impl<T: Scalar> Preconditioner<T> for JacobiPreconditioner<T> {
    fn apply(&self, r: &[T], out: &mut [T]) {
        for ((o, &ri), &di) in out.iter_mut().zip(r.iter()).zip(self.inv_diag.iter()) {
            *o = ri * di;
        }
    }

    fn full_matrix(&self) -> Matrix<T> {
        Matrix::diagonal(&self.inv_diag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diffusion_core::{Diag, Symmetry};

    #[test]
    fn jacobi_preconditioner_inverts_the_diagonal() {
        let a = Matrix::from_func(2, 2, |i, j| if i == j { 2.0 } else { 0.5 }, Symmetry::General, Diag::NonUnit);
        let system = LinearSystem::new(a, vec![1.0, 1.0]).unwrap();
        let m = JacobiPreconditioner::new(&system);
        let y = m.apply_new(&[4.0, 4.0]);
        assert_eq!(y, vec![2.0, 2.0]);
    }
}
