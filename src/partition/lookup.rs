// Precomputed owner lookup for hot loops over many item indices

use std::ops::Range;

use super::Partitioning;
use crate::error::{DecompError, DecompResult};

/// Upper bounds of every partition, in partition order.
///
/// Bounds are non-decreasing, so the owner of an item is the first partition whose
/// upper bound exceeds it and can be found by binary search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerTable {
    upper: Vec<usize>,
}

impl OwnerTable {
    pub fn new(partitioning: &Partitioning) -> Self {
        let upper = partitioning.ranges().map(|range| range.end).collect();
        Self { upper }
    }

    /// Number of partitions.
    pub fn count(&self) -> usize {
        self.upper.len()
    }

    /// Number of items covered.
    pub fn total(&self) -> usize {
        // count >= 1 is guaranteed by Partitioning::new
        self.upper.last().copied().unwrap_or(0)
    }

    /// Partition owning `item`, in O(log count).
    pub fn owner_of(&self, item: usize) -> DecompResult<usize> {
        let total = self.total();
        if item >= total {
            return Err(DecompError::OutOfRange {
                what: "item index",
                index: item,
                bound: total,
            });
        }
        Ok(self.upper.partition_point(|&ub| ub <= item))
    }

    pub fn range_of(&self, partition: usize) -> DecompResult<Range<usize>> {
        let end = *self.upper.get(partition).ok_or(DecompError::OutOfRange {
            what: "partition index",
            index: partition,
            bound: self.count(),
        })?;
        let start = match partition {
            0 => 0,
            p => self.upper[p - 1],
        };
        Ok(start..end)
    }
}
