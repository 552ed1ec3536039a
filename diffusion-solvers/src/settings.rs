use diffusion_core::{DiffusionError, DiffusionResult, Scalar};

/// Stopping criteria shared by every fixed-point solver. Ported from
/// `original_source/include/methods/fixed_point/settings.h`'s
/// `FPSettings`.
#[derive(Debug, Clone, Copy)]
pub struct FPSettings<T> {
    pub tolerance: T,
    pub max_iter: usize,
}

impl<T: Scalar> FPSettings<T> {
    pub const DEFAULT_MAX_ITER: usize = 100;

    pub fn new(tolerance: T, max_iter: usize) -> DiffusionResult<Self> {
        if tolerance <= T::zero() {
            return Err(DiffusionError::invalid("tolerance", tolerance, "must be positive"));
        }
        if max_iter == 0 {
            return Err(DiffusionError::invalid("max_iter", max_iter, "must be positive"));
        }
        Ok(FPSettings { tolerance, max_iter })
    }
}

/// Field-wise equality. The original's `FPSettings::operator==`
/// mistakenly compares `max_iter` against `other.tolerance`; this
/// rendition deliberately does not reproduce that, per the corrected
/// behavior recorded in DESIGN.md.
impl<T: Scalar> PartialEq for FPSettings<T> {
    fn eq(&self, other: &Self) -> bool {
        self.max_iter == other.max_iter && (self.tolerance - other.tolerance).abs() <= T::epsilon() * (T::one() + T::one())
    }
}
