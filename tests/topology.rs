//! Tests for process grids and per-process pencil queries.
//!
//! Every rank of a grid is built through a communicator, and the pencils of all ranks
//! are checked to tile the global domain exactly once.

use pencil_decomp::parallel::{Comm, SerialComm};
use pencil_decomp::{DecompOptions, Decomposition, Direction, Pencil};

/// Rank `rank` of a `size`-rank world, independent of any backend feature.
struct Rank {
    rank: usize,
    size: usize,
}

impl Comm for Rank {
    fn rank(&self) -> usize { self.rank }
    fn size(&self) -> usize { self.size }
}

/// Build the decomposition of every rank of an `nprocs` world.
fn world(nprocs: usize, options: &DecompOptions) -> Vec<Decomposition> {
    (0..nprocs)
        .map(|rank| Decomposition::from_comm(&Rank { rank, size: nprocs }, options).unwrap())
        .collect()
}

/// Test that the pencils of all ranks cover each global point exactly once.
#[test]
fn pencils_tile_the_domain() {
    for (nprocs, ndims, glsizes) in [
        (3, 2, vec![7, 5]),
        (4, 2, vec![4, 9]),
        (6, 3, vec![5, 6, 7]),
        (8, 3, vec![8, 8, 8]),
        (12, 3, vec![4, 5, 6]),
    ] {
        let decomps = world(nprocs, &DecompOptions::new(ndims));
        for &pencil in Pencil::valid(ndims) {
            let mut hits = vec![0u32; glsizes.iter().product()];
            for d in &decomps {
                let shape = d.pencil_shape(pencil, &glsizes).unwrap();
                assert_eq!(shape.sizes[pencil.axis().index()], glsizes[pencil.axis().index()]);
                if ndims == 2 {
                    for j in shape.range(Direction::Y) {
                        for i in shape.range(Direction::X) {
                            hits[j * glsizes[0] + i] += 1;
                        }
                    }
                } else {
                    for k in shape.range(Direction::Z) {
                        for j in shape.range(Direction::Y) {
                            for i in shape.range(Direction::X) {
                                hits[(k * glsizes[1] + j) * glsizes[0] + i] += 1;
                            }
                        }
                    }
                }
            }
            assert!(hits.iter().all(|&h| h == 1), "nprocs={nprocs} pencil={pencil}");
        }
    }
}

/// Test that neighbours along a split axis are the ranks one pencil away.
#[test]
fn neighbours_match_pencil_positions() {
    let options = DecompOptions::new(3).with_dims(&[1, 2, 3]).with_periods(&[false, true, false]);
    let decomps = world(6, &options);
    for d in &decomps {
        for &pencil in Pencil::valid(3) {
            for &dir in Direction::valid(3) {
                let n = d.nprocs(pencil, dir).unwrap();
                let me = d.myrank(pencil, dir).unwrap();
                let [back, fwd] = d.neighbours(pencil, dir).unwrap();
                if let Some(rank) = fwd {
                    let other = &decomps[rank];
                    assert_eq!(other.myrank(pencil, dir).unwrap(), (me + 1) % n);
                } else {
                    assert_eq!(me + 1, n);
                }
                if let Some(rank) = back {
                    let other = &decomps[rank];
                    assert_eq!(other.myrank(pencil, dir).unwrap(), (me + n - 1) % n);
                } else {
                    assert_eq!(me, 0);
                }
            }
        }
    }
    // dims[1] is periodic: x1 pencil wraps along y
    assert_eq!(decomps[0].neighbours(Pencil::X1, Direction::Y).unwrap(), [Some(3), Some(3)]);
    // dims[2] is not: x1 pencil has a wall along z
    assert_eq!(decomps[0].neighbours(Pencil::X1, Direction::Z).unwrap(), [None, Some(1)]);
}

/// Test that a single process owns every pencil whole.
#[test]
fn serial_world_owns_everything() {
    let d = Decomposition::from_comm(&SerialComm, &DecompOptions::new(3)).unwrap();
    assert_eq!(d.comm_size(), 1);
    assert_eq!(d.comm_rank(), 0);
    assert_eq!(d.ndims(), 3);
    for &pencil in Pencil::valid(3) {
        let shape = d.pencil_shape(pencil, &[3, 4, 5]).unwrap();
        assert_eq!(shape.sizes, vec![3, 4, 5]);
        assert_eq!(shape.offsets, vec![0, 0, 0]);
    }
    assert_eq!(SerialComm.size(), 1);
}

/// Test that a rayon universe lays out one grid per available CPU.
#[cfg(feature = "rayon")]
#[test]
fn rayon_universe_decomposes_local_cpus() {
    use pencil_decomp::parallel::{RayonComm, UniverseComm};

    let comm = UniverseComm::Rayon(RayonComm::local());
    let size = comm.size();
    assert!(size >= 1);
    let d = Decomposition::from_comm(&comm, &DecompOptions::new(2)).unwrap();
    assert_eq!(d.comm_rank(), 0);
    assert_eq!(d.comm_size(), size);
    assert_eq!(d.grid().dims(), &[1, size]);

    let shape = d.pencil_shape(Pencil::X1, &[4, size * 2]).unwrap();
    assert_eq!(shape.sizes, vec![4, 2]);
    assert_eq!(shape.offsets, vec![0, 0]);

    let serial = UniverseComm::Serial(SerialComm);
    let d = Decomposition::from_comm(&serial, &DecompOptions::new(2)).unwrap();
    assert_eq!(d.grid().dims(), &[1, 1]);
}
