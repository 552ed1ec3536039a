use crate::tags::Tag;
use diffusion_core::{DiffusionResult, Scalar};

/// The message-passing primitives spec.md §4.5/§5 Tier 2 names:
/// tagged point-to-point send/receive between two ranks, and an
/// Allreduce-with-MAX collective for the global convergence check.
/// Resolves the Open Question in SPEC_FULL.md §9 about how a crate
/// tests "process-grid" behavior without a cluster: [`LocalTransport`]
/// implements this trait over in-process threads, [`crate::mpi_transport::MpiTransport`]
/// (behind the `mpi` feature) implements it over a real MPI
/// communicator. `Block2DInfo`/`Distributed2DBlock` and the red/black
/// sweep are written once against this trait, per spec.md §9's
/// "the driver is generic over this capability set" design note.
pub trait Transport<T: Scalar>: Send + Sync {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    /// Send `data` to rank `to`, tagged `tag` so the receiver can
    /// disambiguate which of its four halo directions (or scatter/
    /// gather) this message belongs to.
    fn send(&self, to: usize, tag: Tag, data: Vec<T>) -> DiffusionResult<()>;

    /// Block until a message tagged `tag` has arrived from rank
    /// `from`, and return its payload.
    fn recv(&self, from: usize, tag: Tag) -> DiffusionResult<Vec<T>>;

    /// Collective: every rank contributes `value`; every rank receives
    /// the maximum across the whole group (spec.md §4.5's global error
    /// and residual check).
    fn allreduce_max(&self, value: T) -> DiffusionResult<T>;
}
