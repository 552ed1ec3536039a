use crate::error::DiffusionError;

/// The four cardinal directions a halo layer or a Cartesian neighbor
/// can live in. Named after compass points (rather than the original
/// C++'s `Top`/`Bottom`/`Left`/`Right`) because spec.md §4.5 and §3
/// describe the decomposition layer exclusively in terms of
/// north/south/east/west halos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction2D {
    North,
    South,
    East,
    West,
}

impl Direction2D {
    pub const ALL: [Direction2D; 4] = [
        Direction2D::North,
        Direction2D::South,
        Direction2D::East,
        Direction2D::West,
    ];

    /// The direction a neighbor would use to refer back to us.
    #[must_use]
    pub fn opposite(self) -> Direction2D {
        match self {
            Direction2D::North => Direction2D::South,
            Direction2D::South => Direction2D::North,
            Direction2D::East => Direction2D::West,
            Direction2D::West => Direction2D::East,
        }
    }
}

/// Halo thickness on each of the four sides of a grid. Defaults to no
/// padding at all, matching spec.md §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding {
    pub north: usize,
    pub south: usize,
    pub east: usize,
    pub west: usize,
}

impl Padding {
    #[must_use]
    pub fn uniform(thickness: usize) -> Self {
        Padding {
            north: thickness,
            south: thickness,
            east: thickness,
            west: thickness,
        }
    }

    #[must_use]
    pub fn get(&self, direction: Direction2D) -> usize {
        match direction {
            Direction2D::North => self.north,
            Direction2D::South => self.south,
            Direction2D::East => self.east,
            Direction2D::West => self.west,
        }
    }
}

/// An ordered pair `(rows, cols)` with the invariant that both are
/// strictly positive. Row-major `ravel`/`unravel` and Cartesian
/// neighbor resolution live here because both the dense matrix and the
/// domain-decomposition layer need them (see SPEC_FULL.md §10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape2D {
    rows: usize,
    cols: usize,
}

impl Shape2D {
    pub fn new(rows: usize, cols: usize) -> DiffusionResultShape {
        if rows == 0 {
            return Err(DiffusionError::invalid("rows", rows, "must be positive"));
        }
        if cols == 0 {
            return Err(DiffusionError::invalid("cols", cols, "must be positive"));
        }
        Ok(Shape2D { rows, cols })
    }

    /// Construct without validating. Only for call sites that already
    /// know `rows, cols >= 1` (e.g. derived shapes).
    #[must_use]
    pub(crate) fn new_unchecked(rows: usize, cols: usize) -> Self {
        debug_assert!(rows >= 1 && cols >= 1);
        Shape2D { rows, cols }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn nelems(&self) -> usize {
        self.rows * self.cols
    }

    #[must_use]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// The shape obtained by adding a halo layer of the given
    /// thickness on each side.
    #[must_use]
    pub fn padded(&self, padding: Padding) -> Shape2D {
        Shape2D::new_unchecked(
            self.rows + padding.north + padding.south,
            self.cols + padding.east + padding.west,
        )
    }

    #[must_use]
    pub fn in_bounds(&self, i: usize, j: usize) -> bool {
        i < self.rows && j < self.cols
    }

    /// Row-major flat index of `(i, j)`.
    #[must_use]
    pub fn ravel(&self, i: usize, j: usize) -> usize {
        debug_assert!(self.in_bounds(i, j), "index ({i}, {j}) out of bounds for {self:?}");
        i * self.cols + j
    }

    #[must_use]
    pub fn unravel(&self, idx: usize) -> (usize, usize) {
        debug_assert!(idx < self.nelems());
        (idx / self.cols, idx % self.cols)
    }

    /// The neighboring cell of `(i, j)` in `direction`, or `None` at a
    /// true boundary of this shape. Shared between `ConstantStencil2D`
    /// (single process) and `Distributed2DBlock` (halo wiring), per
    /// SPEC_FULL.md §10.
    #[must_use]
    pub fn neighbor(&self, direction: Direction2D, i: usize, j: usize) -> Option<(usize, usize)> {
        debug_assert!(self.in_bounds(i, j));
        match direction {
            Direction2D::North => i.checked_sub(1).map(|i| (i, j)),
            Direction2D::South => {
                if i + 1 < self.rows {
                    Some((i + 1, j))
                } else {
                    None
                }
            }
            Direction2D::West => j.checked_sub(1).map(|j| (i, j)),
            Direction2D::East => {
                if j + 1 < self.cols {
                    Some((i, j + 1))
                } else {
                    None
                }
            }
        }
    }
}

type DiffusionResultShape = Result<Shape2D, DiffusionError>;
