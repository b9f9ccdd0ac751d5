//! pencil-decomp: balanced block partitioning and pencil domain decomposition
//!
//! This crate splits structured 2D/3D grids over a Cartesian grid of processes. The core
//! is a balanced block partitioner (size, offset and owner of contiguous index blocks);
//! on top of it sit process grids, pencil orientations and in-process pencil transposes,
//! with serial, rayon and MPI communicator backends.

pub mod parallel;

pub mod config;
pub mod error;
pub mod partition;
pub mod topology;
pub mod transpose;

// Re-exports for convenience
pub use config::*;
pub use error::*;
pub use partition::{OwnerTable, Partitioning, offset_of, owner_of, size_of};
pub use topology::*;
pub use transpose::{TransposePlan, fill_pencils};
