//! Process topology for pencil decompositions.
//!
//! A structured 2D or 3D grid is distributed over a Cartesian grid of processes. Each
//! process holds a *pencil*: a sub-box spanning the whole domain along one physical axis
//! and split along the others. Cartesian dimension 0 is never split, so the X1 pencil
//! maps physical axes straight onto Cartesian dimensions; the other pencils permute them.
//!
//! Modules:
//! - [`grid`]: [`ProcessGrid`], the Cartesian process layout shared by all processes.
//! - [`decomposition`]: [`Decomposition`], one process's view of the grid.

use std::fmt;

pub mod decomposition;
pub mod grid;

pub use decomposition::{Decomposition, PencilShape};
pub use grid::ProcessGrid;

/// Physical axis of the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    X,
    Y,
    Z,
}

impl Direction {
    pub const ALL: [Direction; 3] = [Direction::X, Direction::Y, Direction::Z];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Axes present in a domain of `ndims` dimensions.
    pub fn valid(ndims: usize) -> &'static [Direction] {
        use Direction::*;
        match ndims {
            0 => &[],
            1 => &[X],
            2 => &[X, Y],
            _ => &[X, Y, Z],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::X => "x",
            Direction::Y => "y",
            Direction::Z => "z",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pencil orientation.
///
/// 2D domains use `X1` and `Y1` only. 3D domains use all six, which form the rotation
/// ring `X1 -> Y1 -> Z1 -> X2 -> Y2 -> Z2 -> X1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pencil {
    X1,
    Y1,
    Z1,
    X2,
    Y2,
    Z2,
}

/// Sense of an adjacent pencil rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Forward,
    Backward,
}

// Cartesian dimension decomposing each physical axis (x, y, z), per pencil
const CART_DIM_2D: [[usize; 2]; 2] = [[0, 1], [1, 0]];
const CART_DIM_3D: [[usize; 3]; 6] = [
    [0, 1, 2],
    [1, 0, 2],
    [1, 2, 0],
    [0, 2, 1],
    [2, 0, 1],
    [2, 1, 0],
];

impl Pencil {
    pub const ALL: [Pencil; 6] = [
        Pencil::X1,
        Pencil::Y1,
        Pencil::Z1,
        Pencil::X2,
        Pencil::Y2,
        Pencil::Z2,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Pencil::X1 => "x1",
            Pencil::Y1 => "y1",
            Pencil::Z1 => "z1",
            Pencil::X2 => "x2",
            Pencil::Y2 => "y2",
            Pencil::Z2 => "z2",
        }
    }

    /// Pencils available in a domain of `ndims` dimensions.
    pub fn valid(ndims: usize) -> &'static [Pencil] {
        use Pencil::*;
        match ndims {
            2 => &[X1, Y1],
            3 => &[X1, Y1, Z1, X2, Y2, Z2],
            _ => &[],
        }
    }

    pub fn is_valid_for(self, ndims: usize) -> bool {
        Self::valid(ndims).contains(&self)
    }

    /// The undivided axis.
    pub fn axis(self) -> Direction {
        match self {
            Pencil::X1 | Pencil::X2 => Direction::X,
            Pencil::Y1 | Pencil::Y2 => Direction::Y,
            Pencil::Z1 | Pencil::Z2 => Direction::Z,
        }
    }

    /// Physical axes in local memory order, fastest-varying first.
    pub fn memory_order(self, ndims: usize) -> &'static [Direction] {
        use Direction::*;
        if ndims == 2 {
            return match self {
                Pencil::X1 => &[X, Y],
                _ => &[Y, X],
            };
        }
        match self.axis() {
            X => &[X, Y, Z],
            Y => &[Y, Z, X],
            Z => &[Z, X, Y],
        }
    }

    /// Cartesian dimension that splits physical axis `dir` for this pencil.
    /// Callers validate `self` and `dir` against `ndims` first.
    pub(crate) fn cart_dim(self, dir: Direction, ndims: usize) -> usize {
        if ndims == 2 {
            CART_DIM_2D[self.index()][dir.index()]
        } else {
            CART_DIM_3D[self.index()][dir.index()]
        }
    }

    /// Whether `to` is reachable from `self` with one rotation, and in which sense.
    pub fn rotation_to(self, to: Pencil, ndims: usize) -> Option<Rotation> {
        if !self.is_valid_for(ndims) || !to.is_valid_for(ndims) {
            return None;
        }
        let total = Self::valid(ndims).len();
        let step = (total + to.index() - self.index()) % total;
        match step {
            1 => Some(Rotation::Forward),
            s if s == total - 1 && total > 2 => Some(Rotation::Backward),
            _ => None,
        }
    }
}

impl fmt::Display for Pencil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
