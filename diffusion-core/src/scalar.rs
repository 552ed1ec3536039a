use num_traits::Float;
use std::iter::Sum;

/// The floating-point scalar type threaded through every crate in this
/// workspace. `f32` and `f64` both satisfy it; nothing in the engine
/// assumes a particular width, matching spec.md's "`T`: single, double
/// or extended precision" data model entry.
pub trait Scalar: Float + Sum + Send + Sync + std::fmt::Debug + std::fmt::Display + 'static {}

impl<T> Scalar for T where T: Float + Sum + Send + Sync + std::fmt::Debug + std::fmt::Display + 'static {}
