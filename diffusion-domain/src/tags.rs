use diffusion_core::Direction2D;

/// Disambiguates concurrent point-to-point messages between the same
/// pair of ranks: one of the four halo directions, or a scatter/gather
/// transfer. Spec.md §5 Tier 2 calls this "tag-based disambiguation of
/// the four directions"; this rendition models the tag as a proper
/// enum rather than a bare integer, since nothing downstream needs to
/// cross an FFI boundary with it except [`crate::mpi_transport::MpiTransport`],
/// which maps it to an `i32` at the point it actually calls into MPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Halo(Direction2D),
    Scatter,
    Gather,
}
