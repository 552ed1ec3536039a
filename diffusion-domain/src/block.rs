use crate::tags::Tag;
use crate::topology::MpiDomain2D;
use crate::transport::Transport;
use diffusion_core::{Diag, DiffusionError, DiffusionResult, Matrix, Padding, Scalar, Shape2D, Symmetry};
use std::sync::Arc;

/// Shape metadata for one process's slice of a globally partitioned
/// 2D array: the global field shape, this block's interior (unpadded)
/// shape, and the halo thickness on each side. Spec.md §3's
/// `Block2DInfo`; every block in a decomposition is built with the
/// same one-cell-thick halo (`Padding::uniform(1)`) regardless of
/// whether a given side borders another process or the true domain
/// boundary — the difference is whether [`MpiDomain2D::neighbor`]
/// returns a rank to exchange with or `None`, in which case that side
/// of the halo simply stays zero (the Dirichlet boundary condition).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block2DInfo {
    pub global_shape: Shape2D,
    pub local_shape: Shape2D,
    pub halo: Padding,
}

impl Block2DInfo {
    pub fn new(domain: &MpiDomain2D, global_shape: Shape2D) -> DiffusionResult<Self> {
        domain.validate_global_shape(global_shape)?;
        let local_shape = Shape2D::new(global_shape.rows() / domain.grid_rows(), global_shape.cols() / domain.grid_cols())?;
        Ok(Block2DInfo {
            global_shape,
            local_shape,
            halo: Padding::uniform(1),
        })
    }

    #[must_use]
    pub fn padded_shape(&self) -> Shape2D {
        self.local_shape.padded(self.halo)
    }
}

/// Scatter a global field (known only to the manager rank) into the
/// `local_shape` block belonging to each rank. `global` must be
/// `Some` on the manager rank and is ignored elsewhere. Used both by
/// [`Distributed2DBlock::scatter`] (for the iterate) and directly by
/// callers that need to distribute a right-hand-side field that
/// itself carries no halo (spec.md §4.5's block scatter).
pub fn scatter_field<T: Scalar, Tr: Transport<T>>(domain: &MpiDomain2D, local_shape: Shape2D, global: Option<&Matrix<T>>, transport: &Tr) -> DiffusionResult<Matrix<T>> {
    let local_rows = local_shape.rows();
    let local_cols = local_shape.cols();

    if domain.is_manager() {
        let global = global.ok_or_else(|| DiffusionError::invalid("global", "<none>", "the manager rank must supply the global field to scatter"))?;
        let mut mine = None;
        for row in 0..domain.grid_rows() {
            for col in 0..domain.grid_cols() {
                let target = domain.rank_of(row, col);
                let chunk = Matrix::from_func(
                    local_rows,
                    local_cols,
                    |i, j| global[(row * local_rows + i, col * local_cols + j)],
                    Symmetry::General,
                    Diag::NonUnit,
                );
                if target == domain.rank() {
                    mine = Some(chunk);
                } else {
                    transport.send(target, Tag::Scatter, chunk.data().to_vec())?;
                }
            }
        }
        Ok(mine.expect("the manager rank is always one of the (row, col) targets"))
    } else {
        let payload = transport.recv(domain.manager_rank(), Tag::Scatter)?;
        Ok(Matrix::from_func(local_rows, local_cols, |i, j| payload[i * local_cols + j], Symmetry::General, Diag::NonUnit))
    }
}

/// Inverse of [`scatter_field`]: every rank sends its `local` block;
/// the manager assembles the global field and returns it (`Some`); all
/// other ranks get `None` (spec.md §4.5's block gather).
pub fn gather_field<T: Scalar, Tr: Transport<T>>(domain: &MpiDomain2D, global_shape: Shape2D, local: &Matrix<T>, transport: &Tr) -> DiffusionResult<Option<Matrix<T>>> {
    let local_rows = local.rows();
    let local_cols = local.cols();

    if domain.is_manager() {
        let mut global = Matrix::<T>::zeros(global_shape.rows(), global_shape.cols());
        for row in 0..domain.grid_rows() {
            for col in 0..domain.grid_cols() {
                let source = domain.rank_of(row, col);
                let chunk = if source == domain.rank() {
                    local.clone()
                } else {
                    let payload = transport.recv(source, Tag::Gather)?;
                    Matrix::from_func(local_rows, local_cols, |i, j| payload[i * local_cols + j], Symmetry::General, Diag::NonUnit)
                };
                for i in 0..local_rows {
                    for j in 0..local_cols {
                        global[(row * local_rows + i, col * local_cols + j)] = chunk[(i, j)];
                    }
                }
            }
        }
        Ok(Some(global))
    } else {
        transport.send(domain.manager_rank(), Tag::Gather, local.data().to_vec())?;
        Ok(None)
    }
}

/// One process's padded local block of a globally partitioned 2D
/// field: spec.md §3's `Distributed2DBlock`. The interior lies at
/// offset `(1, 1)` in the padded buffer (a uniform one-cell halo on
/// every side); the buffer itself is a plain [`Matrix`], so a
/// [`diffusion_problem::ConstantStencil2D`] built over this block's
/// [`Block2DInfo::padded_shape`] can be applied to it exactly as it
/// would to a single-process field.
pub struct Distributed2DBlock<T> {
    domain: Arc<MpiDomain2D>,
    info: Block2DInfo,
    buffer: Matrix<T>,
}

impl<T: Scalar> Distributed2DBlock<T> {
    #[must_use]
    pub fn new(domain: Arc<MpiDomain2D>, info: Block2DInfo) -> Self {
        let padded = info.padded_shape();
        Distributed2DBlock {
            domain,
            buffer: Matrix::zeros(padded.rows(), padded.cols()),
            info,
        }
    }

    #[must_use]
    pub fn domain(&self) -> &MpiDomain2D {
        &self.domain
    }

    #[must_use]
    pub fn info(&self) -> &Block2DInfo {
        &self.info
    }

    #[must_use]
    pub fn buffer(&self) -> &Matrix<T> {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut Matrix<T> {
        &mut self.buffer
    }

    /// Read an interior cell by local `(i, j)` (not counting the halo).
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.buffer[(i + 1, j + 1)]
    }

    pub fn set(&mut self, i: usize, j: usize, value: T) {
        self.buffer[(i + 1, j + 1)] = value;
    }

    /// This block's offset into the global field, in global indices —
    /// parity for the red/black coloring is computed from *these*
    /// coordinates, not local ones (spec.md §9's design note).
    #[must_use]
    pub fn global_offset(&self) -> (usize, usize) {
        let (row, col) = self.domain.coord();
        (row * self.info.local_shape.rows(), col * self.info.local_shape.cols())
    }

    #[must_use]
    fn interior_matrix(&self) -> Matrix<T> {
        Matrix::from_func(self.info.local_shape.rows(), self.info.local_shape.cols(), |i, j| self.get(i, j), Symmetry::General, Diag::NonUnit)
    }

    fn load_interior_matrix(&mut self, local: &Matrix<T>) {
        for i in 0..local.rows() {
            for j in 0..local.cols() {
                self.set(i, j, local[(i, j)]);
            }
        }
    }

    /// Scatter a global field known to the manager rank into a fresh
    /// block for every rank.
    pub fn scatter<Tr: Transport<T>>(domain: Arc<MpiDomain2D>, info: Block2DInfo, global: Option<&Matrix<T>>, transport: &Tr) -> DiffusionResult<Self> {
        let local = scatter_field(&domain, info.local_shape, global, transport)?;
        let mut block = Self::new(domain, info);
        block.load_interior_matrix(&local);
        Ok(block)
    }

    /// Gather this block's interior back to the manager rank.
    pub fn gather<Tr: Transport<T>>(&self, transport: &Tr) -> DiffusionResult<Option<Matrix<T>>> {
        gather_field(&self.domain, self.info.global_shape, &self.interior_matrix(), transport)
    }

    #[must_use]
    fn boundary(&self, direction: diffusion_core::Direction2D) -> Vec<T> {
        use diffusion_core::Direction2D::*;
        let rows = self.info.local_shape.rows();
        let cols = self.info.local_shape.cols();
        match direction {
            North => (0..cols).map(|j| self.get(0, j)).collect(),
            South => (0..cols).map(|j| self.get(rows - 1, j)).collect(),
            West => (0..rows).map(|i| self.get(i, 0)).collect(),
            East => (0..rows).map(|i| self.get(i, cols - 1)).collect(),
        }
    }

    fn write_halo(&mut self, direction: diffusion_core::Direction2D, data: &[T]) {
        use diffusion_core::Direction2D::*;
        let padded = self.info.padded_shape();
        let last_row = padded.rows() - 1;
        let last_col = padded.cols() - 1;
        match direction {
            North => {
                for (j, &v) in data.iter().enumerate() {
                    self.buffer[(0, j + 1)] = v;
                }
            }
            South => {
                for (j, &v) in data.iter().enumerate() {
                    self.buffer[(last_row, j + 1)] = v;
                }
            }
            West => {
                for (i, &v) in data.iter().enumerate() {
                    self.buffer[(i + 1, 0)] = v;
                }
            }
            East => {
                for (i, &v) in data.iter().enumerate() {
                    self.buffer[(i + 1, last_col)] = v;
                }
            }
        }
    }

    /// Exchange boundary rows/columns with every Cartesian neighbor;
    /// sides with no neighbor (a true domain boundary) are left at
    /// zero. Spec.md §5 describes the four directions' sends as
    /// non-blocking, overlapped, and completed by a wait-all barrier;
    /// this rendition issues them as a send pass followed by a receive
    /// pass against the same [`Transport`], which is observably
    /// equivalent for any transport that buffers sends (both
    /// [`crate::local_transport::LocalTransport`] and MPI's eager
    /// protocol do) — see spec.md §5's note that overlap is a
    /// performance concern, not part of the ordering contract (halo
    /// cells are read only after the exchange completes either way).
    pub fn exchange_halo<Tr: Transport<T>>(&mut self, transport: &Tr) -> DiffusionResult<()> {
        for &direction in &diffusion_core::Direction2D::ALL {
            if let Some(neighbor_rank) = self.domain.neighbor(direction) {
                transport.send(neighbor_rank, Tag::Halo(direction), self.boundary(direction))?;
            }
        }
        for &direction in &diffusion_core::Direction2D::ALL {
            if let Some(neighbor_rank) = self.domain.neighbor(direction) {
                let incoming = transport.recv(neighbor_rank, Tag::Halo(direction.opposite()))?;
                self.write_halo(direction, &incoming);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_transport::LocalGroup;
    use diffusion_core::Direction2D;
    use std::thread;

    fn global_field(rows: usize, cols: usize) -> Matrix<f64> {
        Matrix::from_func(rows, cols, |i, j| (i * cols + j) as f64, Symmetry::General, Diag::NonUnit)
    }

    #[test]
    fn block2dinfo_rejects_non_divisible_global_shape() {
        let domain = MpiDomain2D::new(4, 0, 2, 2).unwrap();
        assert!(Block2DInfo::new(&domain, Shape2D::new(7, 8).unwrap()).is_err());
    }

    #[test]
    fn scatter_then_gather_is_identity_across_a_2x2_grid() {
        let grid_rows = 2;
        let grid_cols = 2;
        let size = grid_rows * grid_cols;
        let global_shape = Shape2D::new(4, 4).unwrap();
        let global = global_field(4, 4);
        let group = LocalGroup::<f64>::new(size);

        let handles: Vec<_> = (0..size)
            .map(|rank| {
                let transport = group.transport(rank);
                let global = global.clone();
                thread::spawn(move || {
                    let domain = Arc::new(MpiDomain2D::new(size, rank, grid_rows, grid_cols).unwrap());
                    let info = Block2DInfo::new(&domain, global_shape).unwrap();
                    let global_arg = if domain.is_manager() { Some(&global) } else { None };
                    let block = Distributed2DBlock::scatter(domain, info, global_arg, &transport).unwrap();
                    block.gather(&transport).unwrap()
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let gathered = results.into_iter().find_map(|r| r).expect("exactly one rank gathers the global field");
        assert_eq!(gathered, global);
    }

    #[test]
    fn halo_exchange_mirrors_neighbor_boundaries() {
        let grid_rows = 1;
        let grid_cols = 2;
        let size = 2;
        let global_shape = Shape2D::new(2, 4).unwrap();
        let group = LocalGroup::<f64>::new(size);

        let handles: Vec<_> = (0..size)
            .map(|rank| {
                let transport = group.transport(rank);
                thread::spawn(move || {
                    let domain = Arc::new(MpiDomain2D::new(size, rank, grid_rows, grid_cols).unwrap());
                    let info = Block2DInfo::new(&domain, global_shape).unwrap();
                    let mut block = Distributed2DBlock::<f64>::new(domain, info);
                    for i in 0..2 {
                        for j in 0..2 {
                            block.set(i, j, (rank * 100 + i * 10 + j) as f64);
                        }
                    }
                    block.exchange_halo(&transport).unwrap();
                    block
                })
            })
            .collect();

        let blocks: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // rank 0 is west of rank 1: rank 0's east halo mirrors rank 1's west column.
        assert_eq!(blocks[0].buffer()[(1, 3)], blocks[1].get(0, 0));
        assert_eq!(blocks[0].buffer()[(2, 3)], blocks[1].get(1, 0));
        // rank 1's west halo mirrors rank 0's east column.
        assert_eq!(blocks[1].buffer()[(1, 0)], blocks[0].get(0, 1));
        assert_eq!(blocks[1].buffer()[(2, 0)], blocks[0].get(1, 1));
        // no north/south neighbor exists: those halos stay zero.
        assert_eq!(blocks[0].buffer()[(0, 1)], 0.0);
        assert_eq!(blocks[0].buffer()[(3, 1)], 0.0);
    }

    #[test]
    fn halo_exchange_is_idempotent_without_interior_updates() {
        let grid_rows = 1;
        let grid_cols = 2;
        let size = 2;
        let global_shape = Shape2D::new(2, 4).unwrap();
        let group = LocalGroup::<f64>::new(size);

        let handles: Vec<_> = (0..size)
            .map(|rank| {
                let transport = group.transport(rank);
                thread::spawn(move || {
                    let domain = Arc::new(MpiDomain2D::new(size, rank, grid_rows, grid_cols).unwrap());
                    let info = Block2DInfo::new(&domain, global_shape).unwrap();
                    let mut block = Distributed2DBlock::<f64>::new(domain, info);
                    for i in 0..2 {
                        for j in 0..2 {
                            block.set(i, j, (rank * 10 + i * 2 + j) as f64);
                        }
                    }
                    block.exchange_halo(&transport).unwrap();
                    let after_first = block.buffer().clone();
                    block.exchange_halo(&transport).unwrap();
                    (after_first, block.buffer().clone())
                })
            })
            .collect();

        for handle in handles {
            let (after_first, after_second) = handle.join().unwrap();
            assert_eq!(after_first, after_second);
        }
    }

    #[test]
    fn opposite_directions_are_involutive() {
        assert_eq!(Direction2D::North.opposite().opposite(), Direction2D::North);
    }
}
