/// Traversal order over a stencil's interior cells. `Sequential` is
/// the plain row-major sweep; `Checkerboard` visits every cell of one
/// color first (`(i + j)` even), then the other, which is what lets a
/// parallel GS/SOR sweep update all of one color independently before
/// a halo exchange (spec.md §4.3, §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOrdering {
    Sequential,
    Checkerboard,
}

/// Visit every interior cell `(i, j)` of a padded shape with
/// `rows x cols` (including the boundary layer) in the given order,
/// calling `f(i, j)` for each. Interior means `1 <= i < rows - 1` and
/// `1 <= j < cols - 1`.
pub fn apply_inner(rows: usize, cols: usize, ordering: ApplyOrdering, mut f: impl FnMut(usize, usize)) {
    if rows <= 2 || cols <= 2 {
        return;
    }
    match ordering {
        ApplyOrdering::Sequential => {
            for i in 1..rows - 1 {
                for j in 1..cols - 1 {
                    f(i, j);
                }
            }
        }
        ApplyOrdering::Checkerboard => {
            for i in 1..rows - 1 {
                let mut j = 1 + (i % 2);
                while j < cols - 1 {
                    f(i, j);
                    j += 2;
                }
            }
            for i in 1..rows - 1 {
                let mut j = 1 + ((i + 1) % 2);
                while j < cols - 1 {
                    f(i, j);
                    j += 2;
                }
            }
        }
    }
}
