//! Command-line or API options for the process grid.
//!
//! This module provides the `DecompOptions` struct, which describes how the
//! processes are laid out: the number of spatial dimensions, the number of
//! processes along each Cartesian dimension, and the periodicity of each
//! dimension. All-zero (or empty) `dims` lets the grid choose a balanced layout.

/// Process-grid layout & boundary parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompOptions {
    /// Number of spatial dimensions (2 or 3)
    pub ndims: usize,

    /// Processes per Cartesian dimension; all zeros for automatic layout
    pub dims: Vec<usize>,

    /// Periodicity per Cartesian dimension; empty means non-periodic
    pub periods: Vec<bool>,
}

impl DecompOptions {
    /// Automatic layout, no periodic boundaries.
    pub fn new(ndims: usize) -> Self {
        Self {
            ndims,
            dims: vec![0; ndims],
            periods: vec![false; ndims],
        }
    }

    pub fn with_dims(mut self, dims: &[usize]) -> Self {
        self.dims = dims.to_vec();
        self
    }

    pub fn with_periods(mut self, periods: &[bool]) -> Self {
        self.periods = periods.to_vec();
        self
    }

    /// True when no dimension is fixed by the user.
    pub fn is_automatic(&self) -> bool {
        self.dims.iter().all(|&d| d == 0)
    }
}

impl Default for DecompOptions {
    fn default() -> Self {
        Self::new(2)
    }
}
