//! Pencil transposes.
//!
//! A transpose moves a distributed field from one pencil orientation to an adjacent
//! one (`X1 <-> Y1` in 2D, one step along the ring `X1 -> Y1 -> Z1 -> X2 -> Y2 -> Z2`
//! in 3D). Every rank sends the part of its pencil that another rank owns in the new
//! orientation, so the exchange is an all-to-all among the ranks sharing a plane.
//!
//! [`TransposePlan`] validates the rotation once and precomputes the per-rank extents
//! and per-axis owner tables; [`TransposePlan::execute`] performs the exchange for
//! buffers held in the current process (one per rank).
//!
//! Local buffers are stored with the pencil's own axis fastest, see
//! [`Pencil::memory_order`].

use log::{debug, trace};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::error::{DecompError, DecompResult};
use crate::partition::OwnerTable;
use crate::topology::decomposition::shape_of;
use crate::topology::{Direction, Pencil, PencilShape, ProcessGrid, Rotation};

pub struct TransposePlan {
    grid: ProcessGrid,
    from: Pencil,
    to: Pencil,
    rotation: Rotation,
    glsizes: Vec<usize>,
    send_shapes: Vec<PencilShape>,
    recv_shapes: Vec<PencilShape>,
    // owner of each global index in the `from` pencil, per physical axis
    owners: Vec<OwnerTable>,
    // rank stride of each physical axis in the `from` pencil
    rank_strides: Vec<usize>,
}

impl TransposePlan {
    /// Plan the rotation `from -> to` of a field with `glsizes` points (physical order).
    pub fn new(grid: &ProcessGrid, from: Pencil, to: Pencil, glsizes: &[usize]) -> DecompResult<Self> {
        grid.check_pencil(from)?;
        grid.check_pencil(to)?;
        let ndims = grid.ndims();
        let rotation = from.rotation_to(to, ndims).ok_or(DecompError::PencilPair {
            from: from.name(),
            to: to.name(),
        })?;
        let send_shapes = (0..grid.size())
            .map(|rank| shape_of(grid, rank, from, glsizes))
            .collect::<DecompResult<Vec<_>>>()?;
        let recv_shapes = (0..grid.size())
            .map(|rank| shape_of(grid, rank, to, glsizes))
            .collect::<DecompResult<Vec<_>>>()?;

        let cart_strides = cart_strides(grid.dims());
        let mut owners = Vec::with_capacity(ndims);
        let mut rank_strides = Vec::with_capacity(ndims);
        for (&dir, &glsize) in Direction::valid(ndims).iter().zip(glsizes) {
            owners.push(grid.partitioning(from, dir, glsize)?.owner_table());
            rank_strides.push(cart_strides[from.cart_dim(dir, ndims)]);
        }
        debug!(
            "transpose plan {from} -> {to} ({rotation:?}): glsizes={glsizes:?} dims={:?}",
            grid.dims()
        );
        Ok(Self {
            grid: grid.clone(),
            from,
            to,
            rotation,
            glsizes: glsizes.to_vec(),
            send_shapes,
            recv_shapes,
            owners,
            rank_strides,
        })
    }

    /// The plan undoing this one.
    pub fn reversed(&self) -> DecompResult<Self> {
        Self::new(&self.grid, self.to, self.from, &self.glsizes)
    }

    pub fn from(&self) -> Pencil {
        self.from
    }

    pub fn to(&self) -> Pencil {
        self.to
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn glsizes(&self) -> &[usize] {
        &self.glsizes
    }

    /// Extent of `rank`'s buffer before the transpose.
    pub fn send_shape(&self, rank: usize) -> DecompResult<&PencilShape> {
        self.grid.check_rank(rank)?;
        Ok(&self.send_shapes[rank])
    }

    /// Extent of `rank`'s buffer after the transpose.
    pub fn recv_shape(&self, rank: usize) -> DecompResult<&PencilShape> {
        self.grid.check_rank(rank)?;
        Ok(&self.recv_shapes[rank])
    }

    /// Exchange the `from` pencils of all ranks, returning their `to` pencils.
    ///
    /// `sendbufs[rank]` must hold exactly `send_shape(rank).len()` elements.
    pub fn execute<T>(&self, sendbufs: &[Vec<T>]) -> DecompResult<Vec<Vec<T>>>
    where
        T: Clone + Send + Sync,
    {
        if sendbufs.len() != self.grid.size() {
            return Err(DecompError::Topology(format!(
                "{} send buffers given for {} ranks",
                sendbufs.len(),
                self.grid.size()
            )));
        }
        for (rank, (buf, shape)) in sendbufs.iter().zip(&self.send_shapes).enumerate() {
            if buf.len() != shape.len() {
                return Err(DecompError::BufferSize {
                    rank,
                    expected: shape.len(),
                    found: buf.len(),
                });
            }
        }
        #[cfg(feature = "rayon")]
        let recvbufs = self
            .recv_shapes
            .par_iter()
            .enumerate()
            .map(|(rank, shape)| self.gather_into(rank, shape, sendbufs))
            .collect::<DecompResult<Vec<_>>>();
        #[cfg(not(feature = "rayon"))]
        let recvbufs = self
            .recv_shapes
            .iter()
            .enumerate()
            .map(|(rank, shape)| self.gather_into(rank, shape, sendbufs))
            .collect::<DecompResult<Vec<_>>>();
        recvbufs
    }

    // Build one rank's `to` pencil by pulling every point from its `from` owner.
    fn gather_into<T: Clone>(
        &self,
        rank: usize,
        shape: &PencilShape,
        sendbufs: &[Vec<T>],
    ) -> DecompResult<Vec<T>> {
        let ndims = self.grid.ndims();
        let mut recvbuf = Vec::with_capacity(shape.len());
        let mut global = vec![0; ndims];
        for local in LocalPoints::new(shape, self.to.memory_order(ndims)) {
            let mut src_rank = 0;
            for d in 0..ndims {
                global[d] = shape.offsets[d] + local[d];
                src_rank += self.owners[d].owner_of(global[d])? * self.rank_strides[d];
            }
            let src_shape = &self.send_shapes[src_rank];
            let index = linear_index(src_shape, self.from.memory_order(ndims), &global);
            recvbuf.push(sendbufs[src_rank][index].clone());
        }
        trace!("rank {rank}: received {} points into {} pencil", recvbuf.len(), self.to);
        Ok(recvbuf)
    }
}

/// Fill every rank's `pencil` buffer from a function of the global index.
pub fn fill_pencils<T, F>(
    grid: &ProcessGrid,
    pencil: Pencil,
    glsizes: &[usize],
    f: F,
) -> DecompResult<Vec<Vec<T>>>
where
    F: Fn(&[usize]) -> T,
{
    let ndims = grid.ndims();
    let order = pencil.memory_order(ndims);
    (0..grid.size())
        .map(|rank| -> DecompResult<Vec<T>> {
            let shape = shape_of(grid, rank, pencil, glsizes)?;
            let mut global = vec![0; ndims];
            Ok(LocalPoints::new(&shape, order)
                .map(|local| {
                    for d in 0..ndims {
                        global[d] = shape.offsets[d] + local[d];
                    }
                    f(&global)
                })
                .collect())
        })
        .collect()
}

// Row-major strides of the Cartesian process grid.
fn cart_strides(dims: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; dims.len()];
    for d in (0..dims.len().saturating_sub(1)).rev() {
        strides[d] = strides[d + 1] * dims[d + 1];
    }
    strides
}

// Offset of a global point inside a local buffer laid out in `order`.
fn linear_index(shape: &PencilShape, order: &[Direction], global: &[usize]) -> usize {
    let mut index = 0;
    let mut stride = 1;
    for dir in order {
        let d = dir.index();
        index += (global[d] - shape.offsets[d]) * stride;
        stride *= shape.sizes[d];
    }
    index
}

/// Local indices (physical order) of a pencil, visited in memory order.
struct LocalPoints<'a> {
    sizes: &'a [usize],
    order: &'a [Direction],
    next: Option<Vec<usize>>,
}

impl<'a> LocalPoints<'a> {
    fn new(shape: &'a PencilShape, order: &'a [Direction]) -> Self {
        let next = (!shape.is_empty()).then(|| vec![0; shape.sizes.len()]);
        Self { sizes: &shape.sizes, order, next }
    }
}

impl Iterator for LocalPoints<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.next.take()?;
        let mut following = current.clone();
        for dir in self.order {
            let d = dir.index();
            following[d] += 1;
            if following[d] < self.sizes[d] {
                self.next = Some(following);
                return Some(current);
            }
            following[d] = 0;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecompOptions;

    #[test]
    fn local_points_follow_memory_order() {
        let shape = PencilShape { sizes: vec![2, 3], offsets: vec![0, 0] };
        let points: Vec<_> = LocalPoints::new(&shape, Pencil::Y1.memory_order(2)).collect();
        assert_eq!(points.len(), 6);
        assert_eq!(points[0], vec![0, 0]);
        assert_eq!(points[1], vec![0, 1]);
        assert_eq!(points[3], vec![1, 0]);
        for (i, p) in points.iter().enumerate() {
            assert_eq!(linear_index(&shape, Pencil::Y1.memory_order(2), p), i);
        }
    }

    #[test]
    fn cart_strides_are_row_major() {
        assert_eq!(cart_strides(&[1, 2, 3]), vec![6, 3, 1]);
        assert_eq!(cart_strides(&[1, 4]), vec![4, 1]);
    }

    #[test]
    fn rejects_non_adjacent_pencils() {
        let grid = ProcessGrid::new(4, &DecompOptions::new(3)).unwrap();
        assert_eq!(
            TransposePlan::new(&grid, Pencil::X1, Pencil::Z1, &[4, 4, 4]).err(),
            Some(DecompError::PencilPair { from: "x1", to: "z1" })
        );
        let flat = ProcessGrid::new(2, &DecompOptions::new(2)).unwrap();
        assert!(TransposePlan::new(&flat, Pencil::X1, Pencil::Z1, &[4, 4]).is_err());
    }

    #[test]
    fn rejects_wrong_buffers() {
        let grid = ProcessGrid::new(2, &DecompOptions::new(2)).unwrap();
        let plan = TransposePlan::new(&grid, Pencil::X1, Pencil::Y1, &[3, 4]).unwrap();
        assert!(matches!(plan.execute(&[vec![0u8; 6]]), Err(DecompError::Topology(_))));
        assert_eq!(
            plan.execute(&[vec![0u8; 6], vec![0u8; 5]]).err(),
            Some(DecompError::BufferSize { rank: 1, expected: 6, found: 5 })
        );
    }

    #[test]
    fn transpose_2d_small() {
        // 2 ranks, glsizes (3, 4): x1 splits y as [2, 2], y1 splits x as [2, 1]
        let grid = ProcessGrid::new(2, &DecompOptions::new(2)).unwrap();
        let glsizes = [3, 4];
        let value = |g: &[usize]| g[1] * 3 + g[0];
        let send = fill_pencils(&grid, Pencil::X1, &glsizes, value).unwrap();
        assert_eq!(send[0], vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(send[1], vec![6, 7, 8, 9, 10, 11]);

        let plan = TransposePlan::new(&grid, Pencil::X1, Pencil::Y1, &glsizes).unwrap();
        let recv = plan.execute(&send).unwrap();
        // y fastest in y1 pencils
        assert_eq!(recv[0], vec![0, 3, 6, 9, 1, 4, 7, 10]);
        assert_eq!(recv[1], vec![2, 5, 8, 11]);
        assert_eq!(recv, fill_pencils(&grid, Pencil::Y1, &glsizes, value).unwrap());
    }
}
