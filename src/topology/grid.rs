//! Cartesian process grid.
//!
//! Ranks are laid out row-major: the last Cartesian dimension varies fastest.
//! Dimension 0 always holds a single process, so the X1 pencil is undivided in x.

use log::debug;

use super::{Direction, Pencil};
use crate::config::DecompOptions;
use crate::error::{DecompError, DecompResult};
use crate::partition::Partitioning;

/// Upper bound (exclusive) on processes along one Cartesian dimension.
pub const MAX_PROCS_PER_DIM: usize = 1 << 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessGrid {
    dims: Vec<usize>,
    periods: Vec<bool>,
}

impl ProcessGrid {
    /// Lay out `nprocs` processes according to `options`.
    pub fn new(nprocs: usize, options: &DecompOptions) -> DecompResult<Self> {
        let ndims = options.ndims;
        if ndims != 2 && ndims != 3 {
            return Err(DecompError::Topology(format!(
                "ndims should be 2 or 3 ({ndims} is given)"
            )));
        }
        if nprocs == 0 {
            return Err(DecompError::Topology("no processes to lay out".into()));
        }
        let periods = match options.periods.len() {
            0 => vec![false; ndims],
            n if n == ndims => options.periods.clone(),
            n => {
                return Err(DecompError::Topology(format!(
                    "{n} periods given for {ndims} dimensions"
                )));
            }
        };
        if !options.dims.is_empty() && options.dims.len() != ndims {
            return Err(DecompError::Topology(format!(
                "{} dims given for {ndims} dimensions",
                options.dims.len()
            )));
        }
        let dims = if options.is_automatic() {
            let mut dims = vec![1];
            dims.extend(balanced_factors(nprocs, ndims - 1));
            dims
        } else {
            check_user_dims(nprocs, ndims, &options.dims)?;
            options.dims.clone()
        };
        debug!("process grid: nprocs={nprocs} dims={dims:?} periods={periods:?}");
        Ok(Self { dims, periods })
    }

    pub fn ndims(&self) -> usize {
        self.dims.len()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn periods(&self) -> &[bool] {
        &self.periods
    }

    /// Total number of processes.
    pub fn size(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn check_rank(&self, rank: usize) -> DecompResult<()> {
        if rank < self.size() {
            Ok(())
        } else {
            Err(DecompError::OutOfRange {
                what: "rank",
                index: rank,
                bound: self.size(),
            })
        }
    }

    pub fn check_pencil(&self, pencil: Pencil) -> DecompResult<()> {
        if pencil.is_valid_for(self.ndims()) {
            Ok(())
        } else {
            Err(DecompError::Topology(format!(
                "pencil {pencil} is invalid in {}D",
                self.ndims()
            )))
        }
    }

    pub fn check_direction(&self, dir: Direction) -> DecompResult<()> {
        if dir.index() < self.ndims() {
            Ok(())
        } else {
            Err(DecompError::Topology(format!(
                "direction {dir} is invalid in {}D",
                self.ndims()
            )))
        }
    }

    /// Cartesian coordinates of `rank`.
    pub fn coords_of(&self, rank: usize) -> DecompResult<Vec<usize>> {
        self.check_rank(rank)?;
        let mut coords = vec![0; self.ndims()];
        let mut rest = rank;
        for (coord, &dim) in coords.iter_mut().zip(&self.dims).rev() {
            *coord = rest % dim;
            rest /= dim;
        }
        Ok(coords)
    }

    /// Rank at Cartesian `coords`.
    pub fn rank_of(&self, coords: &[usize]) -> DecompResult<usize> {
        if coords.len() != self.ndims() {
            return Err(DecompError::Topology(format!(
                "{} coordinates given for {} dimensions",
                coords.len(),
                self.ndims()
            )));
        }
        let mut rank = 0;
        for (&coord, &dim) in coords.iter().zip(&self.dims) {
            if coord >= dim {
                return Err(DecompError::OutOfRange {
                    what: "coordinate",
                    index: coord,
                    bound: dim,
                });
            }
            rank = rank * dim + coord;
        }
        Ok(rank)
    }

    /// Processes along `dir` for `pencil`.
    pub fn nprocs(&self, pencil: Pencil, dir: Direction) -> DecompResult<usize> {
        self.check_pencil(pencil)?;
        self.check_direction(dir)?;
        Ok(self.dims[pencil.cart_dim(dir, self.ndims())])
    }

    /// Coordinate of `rank` along `dir` for `pencil`.
    pub fn coord_along(&self, rank: usize, pencil: Pencil, dir: Direction) -> DecompResult<usize> {
        self.check_pencil(pencil)?;
        self.check_direction(dir)?;
        let coords = self.coords_of(rank)?;
        Ok(coords[pencil.cart_dim(dir, self.ndims())])
    }

    /// Ranks one step backward and forward of `rank` along `dir` for `pencil`.
    /// `None` where a non-periodic dimension ends.
    pub fn neighbours_of(
        &self,
        rank: usize,
        pencil: Pencil,
        dir: Direction,
    ) -> DecompResult<[Option<usize>; 2]> {
        self.check_pencil(pencil)?;
        self.check_direction(dir)?;
        let cart = pencil.cart_dim(dir, self.ndims());
        let coords = self.coords_of(rank)?;
        let dim = self.dims[cart];
        let periodic = self.periods[cart];
        let here = coords[cart];
        let shifted = |target: Option<usize>| -> DecompResult<Option<usize>> {
            match target {
                Some(c) => {
                    let mut moved = coords.clone();
                    moved[cart] = c;
                    self.rank_of(&moved).map(Some)
                }
                None => Ok(None),
            }
        };
        let backward = match here {
            0 if periodic => Some(dim - 1),
            0 => None,
            c => Some(c - 1),
        };
        let forward = match here + 1 {
            c if c < dim => Some(c),
            _ if periodic => Some(0),
            _ => None,
        };
        Ok([shifted(backward)?, shifted(forward)?])
    }

    /// Partitioning of `glsize` points along `dir` for `pencil`.
    ///
    /// Every process must own at least one point, so `glsize` may not be smaller
    /// than the number of processes along that axis.
    pub fn partitioning(
        &self,
        pencil: Pencil,
        dir: Direction,
        glsize: usize,
    ) -> DecompResult<Partitioning> {
        let nprocs = self.nprocs(pencil, dir)?;
        if glsize < nprocs {
            return Err(DecompError::Domain(format!(
                "glsize ({glsize}) along {dir} should be equal to or more than nprocs ({nprocs})"
            )));
        }
        Partitioning::new(glsize, nprocs)
    }
}

fn check_user_dims(nprocs: usize, ndims: usize, dims: &[usize]) -> DecompResult<()> {
    if dims.len() != ndims {
        return Err(DecompError::Topology(format!(
            "{} dims given for {ndims} dimensions",
            dims.len()
        )));
    }
    if dims[0] != 1 {
        return Err(DecompError::Topology(format!(
            "dims[0] should be 1 since x is never decomposed ({} is given)",
            dims[0]
        )));
    }
    if let Some((d, &n)) = dims
        .iter()
        .enumerate()
        .find(|&(_, &n)| n == 0 || n >= MAX_PROCS_PER_DIM)
    {
        return Err(DecompError::Topology(format!(
            "dims[{d}] ({n}) should be in [1, {MAX_PROCS_PER_DIM})"
        )));
    }
    let product = dims
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .ok_or_else(|| DecompError::Topology("product of dims overflows".into()))?;
    if product != nprocs {
        return Err(DecompError::Topology(format!(
            "number of processes ({nprocs}) and the product of dims ({product}) do not match"
        )));
    }
    Ok(())
}

/// Split `n` into `k` factors as close to each other as possible, largest first.
pub fn balanced_factors(n: usize, k: usize) -> Vec<usize> {
    if k == 0 {
        return Vec::new();
    }
    if k == 1 {
        return vec![n];
    }
    // largest divisor f with f^k <= n becomes the smallest factor
    let mut smallest = 1;
    let mut f: usize = 1;
    while f.checked_pow(k as u32).is_some_and(|p| p <= n) {
        if n % f == 0 {
            smallest = f;
        }
        f += 1;
    }
    let mut factors = balanced_factors(n / smallest, k - 1);
    factors.push(smallest);
    factors.sort_unstable_by(|a, b| b.cmp(a));
    factors
}
