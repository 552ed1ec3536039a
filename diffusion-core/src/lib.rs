//! Dense row-major matrix container, allocation-free BLAS-1/2/3
//! kernels, and the shared linear-system/error types used by every
//! other crate in this workspace.

pub mod blas;
mod error;
mod linear_system;
mod matrix;
mod scalar;
mod shape;

pub use blas::{axpy, dot, gemm, gemv, gemv_general, norm_inf, norm_l2, residual, scal};
pub use error::{DiffusionError, DiffusionResult};
pub use linear_system::LinearSystem;
pub use matrix::{ColIter, Diag, Matrix, MatrixView, MatrixViewMut, Symmetry};
pub use scalar::Scalar;
pub use shape::{Direction2D, Padding, Shape2D};
