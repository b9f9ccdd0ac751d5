//! Balanced block partitioning of a contiguous index range.
//!
//! `total` items are split into `count` contiguous blocks whose sizes differ by at most one.
//! When `total` is not divisible by `count`, the `total % count` larger blocks are the
//! lowest-indexed ones, so block sizes never increase with the partition index.
//!
//! # Example
//! ```
//! use pencil_decomp::partition::{size_of, offset_of, owner_of};
//! assert_eq!(size_of(25, 6, 0).unwrap(), 5);
//! assert_eq!(offset_of(25, 6, 1).unwrap(), 5);
//! assert_eq!(owner_of(25, 6, 5).unwrap(), 1);
//! ```

use std::fmt;
use std::ops::Range;

use crate::error::{DecompError, DecompResult};

pub mod lookup;
pub use lookup::OwnerTable;

/// Number of items assigned to `partition`.
pub fn size_of(total: usize, count: usize, partition: usize) -> DecompResult<usize> {
    Partitioning::new(total, count)?.size_of(partition)
}

/// First item index of `partition`; the sum of the sizes of all earlier partitions.
pub fn offset_of(total: usize, count: usize, partition: usize) -> DecompResult<usize> {
    Partitioning::new(total, count)?.offset_of(partition)
}

/// Partition owning `item`.
pub fn owner_of(total: usize, count: usize, item: usize) -> DecompResult<usize> {
    Partitioning::new(total, count)?.owner_of(item)
}

/// `total` items split into `count` balanced contiguous blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partitioning {
    total: usize,
    count: usize,
}

impl Partitioning {
    /// Fails with [`DecompError::Domain`] when `count` is zero.
    pub fn new(total: usize, count: usize) -> DecompResult<Self> {
        if count == 0 {
            return Err(DecompError::Domain(format!(
                "cannot split {total} items into zero partitions"
            )));
        }
        Ok(Self { total, count })
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn count(&self) -> usize {
        self.count
    }

    // base block size and number of blocks carrying one extra item
    #[inline]
    fn quot_rem(&self) -> (usize, usize) {
        (self.total / self.count, self.total % self.count)
    }

    fn check_partition(&self, partition: usize) -> DecompResult<()> {
        if partition < self.count {
            Ok(())
        } else {
            Err(DecompError::OutOfRange {
                what: "partition index",
                index: partition,
                bound: self.count,
            })
        }
    }

    fn check_item(&self, item: usize) -> DecompResult<()> {
        if item < self.total {
            Ok(())
        } else {
            Err(DecompError::OutOfRange {
                what: "item index",
                index: item,
                bound: self.total,
            })
        }
    }

    /// Number of items in `partition`.
    pub fn size_of(&self, partition: usize) -> DecompResult<usize> {
        self.check_partition(partition)?;
        let (q, r) = self.quot_rem();
        Ok(q + usize::from(partition < r))
    }

    /// First item index of `partition`.
    pub fn offset_of(&self, partition: usize) -> DecompResult<usize> {
        self.check_partition(partition)?;
        let (q, r) = self.quot_rem();
        Ok(partition * q + partition.min(r))
    }

    /// Half-open item range `[offset, offset + size)` of `partition`.
    pub fn range_of(&self, partition: usize) -> DecompResult<Range<usize>> {
        let start = self.offset_of(partition)?;
        let size = self.size_of(partition)?;
        Ok(start..start + size)
    }

    /// Partition owning `item`, in constant time.
    pub fn owner_of(&self, item: usize) -> DecompResult<usize> {
        self.check_item(item)?;
        let (q, r) = self.quot_rem();
        // items covered by the r blocks of size q + 1
        let head = r * (q + 1);
        if item < head {
            Ok(item / (q + 1))
        } else {
            // item < total implies the remaining blocks are non-empty, so q > 0
            Ok(r + (item - head) / q)
        }
    }

    /// Partition owning `item`, found by scanning partitions in increasing order and
    /// returning the first whose upper bound exceeds `item`. O(count); kept as the
    /// reference the faster lookups are checked against.
    pub fn owner_by_scan(&self, item: usize) -> DecompResult<usize> {
        self.check_item(item)?;
        let mut upper = 0;
        for partition in 0..self.count {
            upper += self.size_of(partition)?;
            if item < upper {
                return Ok(partition);
            }
        }
        Err(DecompError::OutOfRange {
            what: "item index",
            index: item,
            bound: upper,
        })
    }

    /// Ranges of all partitions in partition order; they tile `[0, total)`.
    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        let (q, r) = self.quot_rem();
        (0..self.count).map(move |p| {
            let start = p * q + p.min(r);
            start..start + q + usize::from(p < r)
        })
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.ranges().map(|range| range.len()).collect()
    }

    pub fn offsets(&self) -> Vec<usize> {
        self.ranges().map(|range| range.start).collect()
    }

    /// Precompute partition upper bounds for repeated owner lookups.
    pub fn owner_table(&self) -> OwnerTable {
        OwnerTable::new(self)
    }
}

impl fmt::Display for Partitioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Partitioning(total={}, count={})", self.total, self.count)
    }
}
