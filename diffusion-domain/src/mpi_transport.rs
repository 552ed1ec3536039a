//! Real-cluster [`Transport`] over the `mpi` crate (`rsmpi`), behind
//! the `mpi` Cargo feature. This is the implementation a production
//! deployment of this engine launches with (`mpirun -n N`), built
//! against the crate's SPMD point-to-point and collective model.

use crate::tags::Tag;
use crate::transport::Transport;
use diffusion_core::{Direction2D, DiffusionResult, Scalar};
use mpi::collective::SystemOperation;
use mpi::point_to_point::{Destination, Source};
use mpi::topology::SimpleCommunicator;
use mpi::traits::{Communicator, Equivalence};

fn tag_to_i32(tag: Tag) -> i32 {
    match tag {
        Tag::Halo(Direction2D::North) => 0,
        Tag::Halo(Direction2D::South) => 1,
        Tag::Halo(Direction2D::East) => 2,
        Tag::Halo(Direction2D::West) => 3,
        Tag::Scatter => 4,
        Tag::Gather => 5,
    }
}

/// Wraps a communicator (ordinarily `mpi::topology::SimpleCommunicator::world()`)
/// as a [`Transport`]. Point-to-point calls below are the crate's
/// blocking send/receive; spec.md §5's "non-blocking sends with a
/// wait-all barrier" describes an overlap optimization across the
/// four halo directions that [`crate::block::Distributed2DBlock::exchange_halo`]
/// does not currently exploit — see its doc comment.
pub struct MpiTransport {
    world: SimpleCommunicator,
}

impl MpiTransport {
    #[must_use]
    pub fn new(world: SimpleCommunicator) -> Self {
        MpiTransport { world }
    }
}

impl<T: Scalar + Equivalence> Transport<T> for MpiTransport {
    fn rank(&self) -> usize {
        self.world.rank() as usize
    }

    fn size(&self) -> usize {
        self.world.size() as usize
    }

    fn send(&self, to: usize, tag: Tag, data: Vec<T>) -> DiffusionResult<()> {
        self.world.process_at_rank(to as i32).send_with_tag(&data[..], tag_to_i32(tag));
        Ok(())
    }

    fn recv(&self, from: usize, tag: Tag) -> DiffusionResult<Vec<T>> {
        let (data, _status) = self.world.process_at_rank(from as i32).receive_vec_with_tag::<T>(tag_to_i32(tag));
        Ok(data)
    }

    fn allreduce_max(&self, value: T) -> DiffusionResult<T> {
        let mut result = value;
        self.world.all_reduce_into(&value, &mut result, &SystemOperation::max());
        Ok(result)
    }
}
