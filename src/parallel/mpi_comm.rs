//! MPI-based communicator.
//!
//! This module provides an implementation of the `Comm` trait backed by the MPI world
//! communicator, so that every process of an `mpirun` job can build its own
//! [`Decomposition`](crate::topology::Decomposition). It is only available when the
//! `mpi` feature is enabled.
//!
//! # Example
//! ```no_run
//! # #[cfg(feature = "mpi")]
//! # {
//! use pencil_decomp::parallel::{Comm, MpiComm};
//! let comm = MpiComm::new().unwrap();
//! println!("Rank: {} / {}", comm.rank(), comm.size());
//! # }
//! ```

use mpi::environment::Universe;
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;

use crate::error::{DecompError, DecompResult};

/// MPI world communicator wrapper.
///
/// Holds the MPI universe, which finalizes MPI when dropped.
pub struct MpiComm {
    /// The MPI world communicator (all processes in the job).
    pub world: SimpleCommunicator,
    /// The rank (ID) of this process within the communicator.
    pub rank: usize,
    /// The total number of processes in the communicator.
    pub size: usize,
    _universe: Universe,
}

impl MpiComm {
    /// Initializes MPI; fails if it was initialized before.
    pub fn new() -> DecompResult<Self> {
        let universe = mpi::initialize()
            .ok_or_else(|| DecompError::Topology("MPI is already initialized".into()))?;
        let world = universe.world();
        let rank  = world.rank() as usize;
        let size  = world.size() as usize;
        Ok(MpiComm { world, rank, size, _universe: universe })
    }
}

impl super::Comm for MpiComm {
    fn rank(&self) -> usize { self.rank }
    fn size(&self) -> usize { self.size }
}
