use crate::block::Distributed2DBlock;
use crate::transport::Transport;
use diffusion_core::{Matrix, Scalar};
use diffusion_problem::ConstantStencil2D;
use rayon::prelude::*;

/// Which half of the checkerboard a sweep should touch, keyed to
/// *global* cell coordinates (spec.md §4.5: "global row + column index
/// parity", independent of which process owns the cell) rather than
/// each block's own local indices — two blocks with an odd-sized
/// local shape would otherwise disagree about which cells are red.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    #[must_use]
    fn matches(self, global_i: usize, global_j: usize) -> bool {
        let is_red = crate::topology::coordinate_parity_is_red(global_i, global_j);
        matches!((self, is_red), (Color::Red, true) | (Color::Black, false))
    }
}

/// Relative difference `|next - prev| / |prev|`, with `|0|/|0| = 0`.
/// Local restatement of `diffusion_solvers`'s private helper of the
/// same name (spec.md §4.4's convention), since that crate's relaxation
/// module is `pub(crate)` and this sweep operates over a block's own
/// padded buffer rather than a `LinearSystem`.
#[must_use]
fn relative_diff<T: Scalar>(next: T, prev: T) -> T {
    let diff = (next - prev).abs();
    let denom = prev.abs();
    if denom == T::zero() {
        diff
    } else {
        diff / denom
    }
}

/// The off-diagonal neighbor contribution at one interior cell of the
/// padded buffer, i.e. `(Au)[i,j]` with the `center*u[i,j]` term
/// excluded — the piece a relaxation update solves for.
#[must_use]
fn off_diagonal_contribution<T: Scalar>(stencil: &ConstantStencil2D<T>, i: usize, j: usize, u: &Matrix<T>) -> T {
    stencil.north * u[(i - 1, j)] + stencil.south * u[(i + 1, j)] + stencil.west * u[(i, j - 1)] + stencil.east * u[(i, j + 1)]
}

/// Update every cell of `color` in place: `omega == 1` is a pure
/// Gauss-Seidel-style relaxation (reading whatever values the previous
/// color's pass just wrote), any other value in `(0, 2)` is SOR over
/// the same half-sweep. Rows are computed in parallel with `rayon`
/// (spec.md §8), each row independent since same-color cells never sit
/// on the same stencil's 4-neighborhood; the scalar max-relative-diff
/// reduction is then folded serially.
pub fn sweep_color<T: Scalar>(block: &mut Distributed2DBlock<T>, stencil: &ConstantStencil2D<T>, source: &Matrix<T>, color: Color, omega: T) -> T {
    let (global_row_offset, global_col_offset) = block.global_offset();
    let rows = block.info().local_shape.rows();
    let cols = block.info().local_shape.cols();

    let row_updates: Vec<Vec<(usize, T, T)>> = (0..rows)
        .into_par_iter()
        .map(|i| {
            let mut updates = Vec::new();
            for j in 0..cols {
                if !color.matches(global_row_offset + i, global_col_offset + j) {
                    continue;
                }
                let padded_i = i + 1;
                let padded_j = j + 1;
                let dot = off_diagonal_contribution(stencil, padded_i, padded_j, block.buffer());
                let gs_value = (source[(i, j)] - dot) / stencil.center;
                let prev = block.get(i, j);
                let next = (T::one() - omega) * prev + omega * gs_value;
                updates.push((j, next, relative_diff(next, prev)));
            }
            updates
        })
        .collect();

    let mut max_rel = T::zero();
    for (i, row) in row_updates.into_iter().enumerate() {
        for (j, next, rel) in row {
            block.set(i, j, next);
            if rel > max_rel {
                max_rel = rel;
            }
        }
    }
    max_rel
}

/// One full red/black step: update every red cell, exchange halos so
/// neighboring blocks see the fresh red boundary values, update every
/// black cell (which depends on red neighbors on the interior and on
/// the just-refreshed halo at a block edge), exchange halos again, and
/// report the process group's global maximum relative change (spec.md
/// §4.5's "two independent sub-updates in sequence... followed by a
/// halo exchange... Allreduce to determine the global error").
pub fn redblack_sweep<T: Scalar, Tr: Transport<T>>(block: &mut Distributed2DBlock<T>, stencil: &ConstantStencil2D<T>, source: &Matrix<T>, omega: T, transport: &Tr) -> diffusion_core::DiffusionResult<T> {
    let red_rel = sweep_color(block, stencil, source, Color::Red, omega);
    block.exchange_halo(transport)?;
    let black_rel = sweep_color(block, stencil, source, Color::Black, omega);
    block.exchange_halo(transport)?;

    let local_max = if red_rel > black_rel { red_rel } else { black_rel };
    transport.allreduce_max(local_max)
}

/// Point-Jacobi sweep over a block: every interior cell reads only the
/// previous iterate, so the whole interior can be computed in
/// parallel and then written back; halos exchange once per sweep since
/// nothing is read back within the same sweep.
pub fn jacobi_sweep<T: Scalar, Tr: Transport<T>>(block: &mut Distributed2DBlock<T>, stencil: &ConstantStencil2D<T>, source: &Matrix<T>, transport: &Tr) -> diffusion_core::DiffusionResult<T> {
    let rows = block.info().local_shape.rows();
    let cols = block.info().local_shape.cols();

    let next_rows: Vec<Vec<T>> = (0..rows)
        .into_par_iter()
        .map(|i| {
            (0..cols)
                .map(|j| {
                    let dot = off_diagonal_contribution(stencil, i + 1, j + 1, block.buffer());
                    (source[(i, j)] - dot) / stencil.center
                })
                .collect()
        })
        .collect();

    let mut max_rel = T::zero();
    for (i, row) in next_rows.into_iter().enumerate() {
        for (j, next) in row.into_iter().enumerate() {
            let prev = block.get(i, j);
            let rel = relative_diff(next, prev);
            if rel > max_rel {
                max_rel = rel;
            }
            block.set(i, j, next);
        }
    }

    block.exchange_halo(transport)?;
    transport.allreduce_max(max_rel)
}

/// Global (process-group-wide) infinity-norm residual: every rank
/// computes its own block's maximum residual against `source`, the
/// group reduces to the maximum across all blocks (spec.md §4.5's
/// global residual check, generalizing `ConstantStencil2D::max_residual`
/// to a distributed field).
pub fn global_residual<T: Scalar, Tr: Transport<T>>(block: &Distributed2DBlock<T>, stencil: &ConstantStencil2D<T>, source: &Matrix<T>, transport: &Tr) -> diffusion_core::DiffusionResult<T> {
    let local_max = stencil.max_residual(block.buffer(), source);
    transport.allreduce_max(local_max)
}
