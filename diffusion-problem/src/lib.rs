//! Grid geometry, the constant-coefficient 5-point stencil, and the
//! steady-state diffusion problem that assembles a [`diffusion_core::
//! LinearSystem`] or a [`ConstantStencil2D`] from physical inputs.

mod grid;
mod ordering;
mod problem;
mod stencil;

pub use grid::{Grid2D, GridPoints2D, Space2D};
pub use ordering::{apply_inner, ApplyOrdering};
pub use problem::DiffusionProblem;
pub use stencil::ConstantStencil2D;
