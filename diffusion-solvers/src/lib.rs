//! The shared fixed-point convergence loop and the five solver states
//! (PJ, GS, SOR, CG, PCG) that plug into it.

mod cg;
mod driver;
mod gs;
mod pcg;
mod pj;
mod preconditioner;
mod relaxation;
mod result;
mod settings;
mod sor;

pub use cg::{CgParams, CgState};
pub use driver::{run, FPState, FixedPointOutcome};
pub use gs::GsState;
pub use pcg::PcgState;
pub use pj::PjState;
pub use preconditioner::{JacobiPreconditioner, Preconditioner};
pub use result::{solve, AxbState, IterativeAxbResult};
pub use settings::FPSettings;
pub use sor::SorState;
