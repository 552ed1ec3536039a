//! 2D Cartesian domain decomposition: process-grid topology, a
//! message-passing abstraction with an in-process test double and a
//! real MPI backend, padded-block scatter/gather/halo exchange, and the
//! red/black parallel relaxation sweep built on top of them.

mod block;
mod local_transport;
#[cfg(feature = "mpi")]
mod mpi_transport;
mod redblack;
mod tags;
mod topology;
mod transport;

pub use block::{gather_field, scatter_field, Block2DInfo, Distributed2DBlock};
pub use local_transport::{LocalGroup, LocalTransport};
#[cfg(feature = "mpi")]
pub use mpi_transport::MpiTransport;
pub use redblack::{global_residual, jacobi_sweep, redblack_sweep, sweep_color, Color};
pub use tags::Tag;
pub use topology::MpiDomain2D;
pub use transport::Transport;
