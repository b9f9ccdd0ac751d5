//! Configuration for building process grids.

pub mod options;
pub use options::DecompOptions;
