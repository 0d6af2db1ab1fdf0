use crate::error::SimError;

/// Periodic hypercubic grid (2D or 3D) with a precomputed neighbour table.
///
/// Sites are indexed in row-major (C) order: for shape `[sx, sy]` site
/// `(x, y)` has index `x * sy + y`.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Extent along each axis (e.g. `[8, 8, 8]`).
    pub shape: Vec<usize>,
    /// Row-major strides: `strides[d] = product of shape[d+1..]`.
    pub strides: Vec<usize>,
    /// Total number of sites.
    pub n_sites: usize,
    /// Number of axes (2 or 3).
    pub n_dims: usize,
    /// Layout: `neighbors[(i * n_dims + d) * 2 + dir]`, `dir = 0` forward
    /// (`+1` along `d`), `dir = 1` backward.
    neighbors: Vec<u32>,
}

impl Grid {
    pub fn new(shape: Vec<usize>) -> Result<Self, SimError> {
        let n_dims = shape.len();
        if !(2..=3).contains(&n_dims) {
            return Err(SimError::UnsupportedDimension(n_dims));
        }
        if let Some(axis) = shape.iter().position(|&s| s == 0) {
            return Err(SimError::EmptyLattice { axis });
        }

        // site indices live in a u32 neighbour table
        let n_sites = shape
            .iter()
            .try_fold(1usize, |acc, &e| acc.checked_mul(e))
            .filter(|&n| n <= u32::MAX as usize)
            .ok_or_else(|| SimError::LatticeTooLarge {
                shape: shape.clone(),
            })?;

        let mut strides = vec![1usize; n_dims];
        for d in (0..n_dims - 1).rev() {
            strides[d] = strides[d + 1] * shape[d + 1];
        }

        let mut neighbors = vec![0u32; n_sites * n_dims * 2];
        for i in 0..n_sites {
            for d in 0..n_dims {
                let c = (i / strides[d]) % shape[d];
                let base = i - c * strides[d];
                let fwd = (c + 1) % shape[d];
                let bwd = (c + shape[d] - 1) % shape[d];
                neighbors[(i * n_dims + d) * 2] = (base + fwd * strides[d]) as u32;
                neighbors[(i * n_dims + d) * 2 + 1] = (base + bwd * strides[d]) as u32;
            }
        }

        Ok(Self {
            shape,
            strides,
            n_sites,
            n_dims,
            neighbors,
        })
    }

    /// Neighbour of `site` along `dim`; `forward = false` is the `-1` side.
    #[inline]
    pub fn neighbor(&self, site: usize, dim: usize, forward: bool) -> usize {
        self.neighbors[(site * self.n_dims + dim) * 2 + (!forward as usize)] as usize
    }

    #[inline]
    pub fn index(&self, coords: &[usize]) -> usize {
        debug_assert_eq!(coords.len(), self.n_dims);
        coords
            .iter()
            .zip(&self.strides)
            .zip(&self.shape)
            .map(|((&c, &s), &e)| {
                debug_assert!(c < e, "coordinate {c} out of range {e}");
                c * s
            })
            .sum()
    }

    /// Coordinates of `site`; only the first `n_dims` entries are meaningful.
    #[inline]
    pub fn coords(&self, site: usize) -> [usize; 3] {
        let mut out = [0usize; 3];
        for d in 0..self.n_dims {
            out[d] = (site / self.strides[d]) % self.shape[d];
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_shapes() {
        assert_eq!(
            Grid::new(vec![4]).unwrap_err(),
            SimError::UnsupportedDimension(1)
        );
        assert_eq!(
            Grid::new(vec![2, 2, 2, 2]).unwrap_err(),
            SimError::UnsupportedDimension(4)
        );
        assert_eq!(
            Grid::new(vec![3, 0]).unwrap_err(),
            SimError::EmptyLattice { axis: 1 }
        );
    }

    #[test]
    fn test_rejects_oversized_shapes() {
        // product overflows usize
        assert_eq!(
            Grid::new(vec![usize::MAX, 2]).unwrap_err(),
            SimError::LatticeTooLarge {
                shape: vec![usize::MAX, 2]
            }
        );
        // 2^33 sites fits usize but not a u32 index
        assert!(matches!(
            Grid::new(vec![1 << 11, 1 << 11, 1 << 11]),
            Err(SimError::LatticeTooLarge { .. })
        ));
    }

    #[test]
    fn test_2d_neighbors() {
        // 3x4 grid
        let grid = Grid::new(vec![3, 4]).unwrap();
        assert_eq!(grid.n_sites, 12);
        assert_eq!(grid.strides, vec![4, 1]);

        // site 0 = (0,0): forward in dim 0 -> (1,0)=4, forward in dim 1 -> (0,1)=1
        assert_eq!(grid.neighbor(0, 0, true), 4);
        assert_eq!(grid.neighbor(0, 1, true), 1);

        // backward wraps: (2,0)=8 and (0,3)=3
        assert_eq!(grid.neighbor(0, 0, false), 8);
        assert_eq!(grid.neighbor(0, 1, false), 3);

        // site 11 = (2,3): forward wraps to (0,3)=3 and (2,0)=8
        assert_eq!(grid.neighbor(11, 0, true), 3);
        assert_eq!(grid.neighbor(11, 1, true), 8);
    }

    #[test]
    fn test_3d_neighbors() {
        let grid = Grid::new(vec![2, 3, 4]).unwrap();
        assert_eq!(grid.n_sites, 24);
        assert_eq!(grid.strides, vec![12, 4, 1]);

        assert_eq!(grid.neighbor(0, 0, true), 12); // (1,0,0)
        assert_eq!(grid.neighbor(0, 1, true), 4); // (0,1,0)
        assert_eq!(grid.neighbor(0, 2, true), 1); // (0,0,1)
        assert_eq!(grid.neighbor(0, 1, false), 8); // (0,2,0)
        // extent 2: forward and backward coincide
        assert_eq!(grid.neighbor(0, 0, false), 12);
    }

    #[test]
    fn test_extent_one_is_self_neighbor() {
        let grid = Grid::new(vec![1, 3]).unwrap();
        for i in 0..grid.n_sites {
            assert_eq!(grid.neighbor(i, 0, true), i);
            assert_eq!(grid.neighbor(i, 0, false), i);
        }
    }

    #[test]
    fn test_index_coords_agree() {
        let grid = Grid::new(vec![3, 5, 2]).unwrap();
        for i in 0..grid.n_sites {
            let c = grid.coords(i);
            assert_eq!(grid.index(&c[..3]), i);
        }
        assert_eq!(grid.index(&[2, 4, 1]), 29);
    }

    #[test]
    fn test_forward_backward_inverse() {
        let grid = Grid::new(vec![4, 3, 5]).unwrap();
        for i in 0..grid.n_sites {
            for d in 0..3 {
                assert_eq!(grid.neighbor(grid.neighbor(i, d, true), d, false), i);
            }
        }
    }
}
