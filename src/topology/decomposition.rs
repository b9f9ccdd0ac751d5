//! One process's view of a [`ProcessGrid`].
//!
//! Holds the shared grid together with the calling process's rank and answers the
//! questions a solver asks before allocating its local arrays: how many processes
//! share an axis, where this process sits along it, who its neighbours are, and which
//! slice of the global grid it owns in a given pencil.

use std::ops::Range;

use super::{Direction, Pencil, ProcessGrid};
use crate::config::DecompOptions;
use crate::error::DecompResult;
use crate::parallel::Comm;

/// Local extent of a pencil, per physical axis (x, y[, z]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PencilShape {
    pub sizes: Vec<usize>,
    pub offsets: Vec<usize>,
}

impl PencilShape {
    /// Number of local points.
    pub fn len(&self) -> usize {
        self.sizes.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Global index range along axis `dir`.
    pub fn range(&self, dir: Direction) -> Range<usize> {
        let d = dir.index();
        self.offsets[d]..self.offsets[d] + self.sizes[d]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposition {
    grid: ProcessGrid,
    rank: usize,
}

impl Decomposition {
    pub fn new(grid: ProcessGrid, rank: usize) -> DecompResult<Self> {
        grid.check_rank(rank)?;
        Ok(Self { grid, rank })
    }

    /// Lay out `comm.size()` processes and take the position of `comm.rank()`.
    pub fn from_comm<C: Comm>(comm: &C, options: &DecompOptions) -> DecompResult<Self> {
        let grid = ProcessGrid::new(comm.size(), options)?;
        Self::new(grid, comm.rank())
    }

    pub fn grid(&self) -> &ProcessGrid {
        &self.grid
    }

    pub fn ndims(&self) -> usize {
        self.grid.ndims()
    }

    pub fn comm_size(&self) -> usize {
        self.grid.size()
    }

    pub fn comm_rank(&self) -> usize {
        self.rank
    }

    /// Cartesian coordinates of this process.
    pub fn coords(&self) -> Vec<usize> {
        // rank was validated in new()
        self.grid.coords_of(self.rank).unwrap_or_default()
    }

    pub fn nprocs(&self, pencil: Pencil, dir: Direction) -> DecompResult<usize> {
        self.grid.nprocs(pencil, dir)
    }

    pub fn myrank(&self, pencil: Pencil, dir: Direction) -> DecompResult<usize> {
        self.grid.coord_along(self.rank, pencil, dir)
    }

    /// `[backward, forward]` neighbour ranks along `dir`.
    pub fn neighbours(&self, pencil: Pencil, dir: Direction) -> DecompResult<[Option<usize>; 2]> {
        self.grid.neighbours_of(self.rank, pencil, dir)
    }

    /// Number of points of `glsize` owned along `dir`.
    pub fn pencil_mysize(&self, pencil: Pencil, dir: Direction, glsize: usize) -> DecompResult<usize> {
        self.grid
            .partitioning(pencil, dir, glsize)?
            .size_of(self.myrank(pencil, dir)?)
    }

    /// First owned global index along `dir`.
    pub fn pencil_offset(&self, pencil: Pencil, dir: Direction, glsize: usize) -> DecompResult<usize> {
        self.grid
            .partitioning(pencil, dir, glsize)?
            .offset_of(self.myrank(pencil, dir)?)
    }

    pub fn pencil_range(
        &self,
        pencil: Pencil,
        dir: Direction,
        glsize: usize,
    ) -> DecompResult<Range<usize>> {
        self.grid
            .partitioning(pencil, dir, glsize)?
            .range_of(self.myrank(pencil, dir)?)
    }

    /// Local sizes and offsets along every axis; `glsizes` is in physical order.
    pub fn pencil_shape(&self, pencil: Pencil, glsizes: &[usize]) -> DecompResult<PencilShape> {
        shape_of(&self.grid, self.rank, pencil, glsizes)
    }
}

pub(crate) fn shape_of(
    grid: &ProcessGrid,
    rank: usize,
    pencil: Pencil,
    glsizes: &[usize],
) -> DecompResult<PencilShape> {
    if glsizes.len() != grid.ndims() {
        return Err(crate::error::DecompError::Topology(format!(
            "{} global sizes given for {} dimensions",
            glsizes.len(),
            grid.ndims()
        )));
    }
    let mut sizes = Vec::with_capacity(glsizes.len());
    let mut offsets = Vec::with_capacity(glsizes.len());
    for (&dir, &glsize) in Direction::valid(grid.ndims()).iter().zip(glsizes) {
        let range = grid
            .partitioning(pencil, dir, glsize)?
            .range_of(grid.coord_along(rank, pencil, dir)?)?;
        offsets.push(range.start);
        sizes.push(range.len());
    }
    Ok(PencilShape { sizes, offsets })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decomposition(nprocs: usize, options: &DecompOptions, rank: usize) -> Decomposition {
        Decomposition::new(ProcessGrid::new(nprocs, options).unwrap(), rank).unwrap()
    }

    #[test]
    fn pencil_extents_2d() {
        // dims [1, 3]: x1 splits y over 3 processes, y1 splits x over 3
        let opts = DecompOptions::new(2);
        let d = decomposition(3, &opts, 1);
        assert_eq!(d.nprocs(Pencil::X1, Direction::X).unwrap(), 1);
        assert_eq!(d.nprocs(Pencil::X1, Direction::Y).unwrap(), 3);
        assert_eq!(d.myrank(Pencil::X1, Direction::Y).unwrap(), 1);
        assert_eq!(d.myrank(Pencil::Y1, Direction::X).unwrap(), 1);
        assert_eq!(d.myrank(Pencil::Y1, Direction::Y).unwrap(), 0);

        assert_eq!(d.pencil_mysize(Pencil::X1, Direction::X, 8).unwrap(), 8);
        assert_eq!(d.pencil_mysize(Pencil::X1, Direction::Y, 10).unwrap(), 3);
        assert_eq!(d.pencil_offset(Pencil::X1, Direction::Y, 10).unwrap(), 4);
        assert_eq!(d.pencil_range(Pencil::Y1, Direction::X, 8).unwrap(), 3..6);

        let shape = d.pencil_shape(Pencil::X1, &[8, 10]).unwrap();
        assert_eq!(shape.sizes, vec![8, 3]);
        assert_eq!(shape.offsets, vec![0, 4]);
        assert_eq!(shape.len(), 24);
        assert_eq!(shape.range(Direction::Y), 4..7);
    }

    #[test]
    fn pencil_extents_3d() {
        let opts = DecompOptions::new(3).with_dims(&[1, 2, 3]);
        // rank 4 sits at (0, 1, 1)
        let d = decomposition(6, &opts, 4);
        assert_eq!(d.coords(), vec![0, 1, 1]);
        // z1 pencil: x along dims[1], y along dims[2], z undivided
        assert_eq!(d.nprocs(Pencil::Z1, Direction::X).unwrap(), 2);
        assert_eq!(d.nprocs(Pencil::Z1, Direction::Y).unwrap(), 3);
        assert_eq!(d.nprocs(Pencil::Z1, Direction::Z).unwrap(), 1);
        // y2 pencil: x along dims[2], z along dims[1]
        assert_eq!(d.nprocs(Pencil::Y2, Direction::X).unwrap(), 3);
        assert_eq!(d.nprocs(Pencil::Y2, Direction::Z).unwrap(), 2);

        let shape = d.pencil_shape(Pencil::Z1, &[5, 7, 4]).unwrap();
        assert_eq!(shape.sizes, vec![2, 2, 4]);
        assert_eq!(shape.offsets, vec![3, 3, 0]);
    }

    #[test]
    fn invalid_queries() {
        let d = decomposition(2, &DecompOptions::new(2), 0);
        assert!(d.nprocs(Pencil::X2, Direction::X).is_err());
        assert!(d.pencil_mysize(Pencil::X1, Direction::Y, 1).is_err());
        assert!(d.pencil_shape(Pencil::X1, &[4, 4, 4]).is_err());
        assert!(Decomposition::new(ProcessGrid::new(2, &DecompOptions::new(2)).unwrap(), 2).is_err());
    }
}
