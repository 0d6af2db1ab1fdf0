use std::ops::Range;

use crate::error::SimError;

use super::Grid;

/// One quadrant (2D) or octant (3D) of a [`Grid`].
///
/// Bit `d` of `id` selects the upper half along axis `d`. The lower half along
/// an axis of extent `e` is `0..e/2`, the upper half `e/2..e`, so the
/// `2^n_dims` partitions tile the grid without overlap.
///
/// Only [`partitions`] hands these out, so every range is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub(crate) id: usize,
    pub(crate) ranges: Vec<Range<usize>>,
}

impl Partition {
    pub(crate) fn new(grid: &Grid, id: usize) -> Self {
        debug_assert!(id < n_partitions(grid));
        let ranges = grid
            .shape
            .iter()
            .enumerate()
            .map(|(d, &extent)| {
                let half = extent / 2;
                if (id >> d) & 1 == 1 {
                    half..extent
                } else {
                    0..half
                }
            })
            .collect();
        Self { id, ranges }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    pub fn n_sites(&self) -> usize {
        self.ranges.iter().map(|r| r.len()).product()
    }

    pub fn contains(&self, coords: &[usize]) -> bool {
        self.ranges.iter().zip(coords).all(|(r, c)| r.contains(c))
    }
}

pub fn n_partitions(grid: &Grid) -> usize {
    1 << grid.n_dims
}

/// Every partition of `grid`, or an error if some axis is too short to split.
pub fn partitions(grid: &Grid) -> Result<Vec<Partition>, SimError> {
    if let Some(axis) = grid.shape.iter().position(|&e| e < 2) {
        return Err(SimError::PartitionTooSmall {
            axis,
            extent: grid.shape[axis],
        });
    }
    Ok((0..n_partitions(grid))
        .map(|id| Partition::new(grid, id))
        .collect())
}
