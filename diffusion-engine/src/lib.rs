//! Entry point tying every other crate in this workspace together: pick
//! an algorithm, hand it a [`DiffusionProblem`] (or, for the
//! distributed path, a per-rank slice of one), and get back the
//! solution shape spec.md §6 names. Grounded on `original_source/
//! include/project/diffusion_solver.h`'s `LUPSolver::solve`, generalized
//! from "always LU" to every algorithm this workspace implements.

mod distributed;
mod single;

pub use distributed::{solve_distributed, DistributedAlgorithm, DistributedDiffusionProblem, DistributedEngineResult};
pub use single::{solve, Algorithm, EngineResult};
