use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use crate::error::SimError;
use crate::orientation::{OrientationTable, SpinState};

/// Initial orientation of each site, called once per site in row-major order.
///
/// Returned indices may exceed the table; the lattice wraps them.
pub trait OrientationInit {
    fn initial_state(&mut self, coords: &[usize], table: &OrientationTable) -> SpinState;
}

impl<F> OrientationInit for F
where
    F: FnMut(&[usize]) -> SpinState,
{
    fn initial_state(&mut self, coords: &[usize], _table: &OrientationTable) -> SpinState {
        self(coords)
    }
}

/// Every site starts in the same state.
#[derive(Debug, Clone, Copy)]
pub struct FixedOrientation(pub SpinState);

impl OrientationInit for FixedOrientation {
    fn initial_state(&mut self, _coords: &[usize], _table: &OrientationTable) -> SpinState {
        self.0
    }
}

/// Independent uniformly random table entry per site.
pub struct RandomOrientation {
    rng: Xoshiro256StarStar,
}

impl RandomOrientation {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Xoshiro256StarStar::seed_from_u64(seed),
        }
    }
}

impl OrientationInit for RandomOrientation {
    fn initial_state(&mut self, _coords: &[usize], table: &OrientationTable) -> SpinState {
        let (nx, ny) = table.dims();
        SpinState::new(
            self.rng.gen_range(0..nx) as u16,
            self.rng.gen_range(0..ny) as u16,
        )
    }
}

/// Forward coupling of the bond from the site at `coords` to its `+1`
/// neighbour along axis `dim`.
///
/// The backward bond of a site is the forward bond of its backward neighbour,
/// so only forward couplings are ever asked for.
pub trait CouplingField {
    fn coupling(&self, coords: &[usize], dim: usize) -> f64;

    /// `Some(c)` if every bond has coupling `c`; lets the lattice skip the
    /// per-edge table.
    fn uniform(&self) -> Option<f64> {
        None
    }

    /// Reject a lattice `shape` this field cannot supply couplings for.
    fn check_shape(&self, _shape: &[usize]) -> Result<(), SimError> {
        Ok(())
    }
}

impl<F> CouplingField for F
where
    F: Fn(&[usize], usize) -> f64,
{
    fn coupling(&self, coords: &[usize], dim: usize) -> f64 {
        self(coords, dim)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformCoupling(pub f64);

impl CouplingField for UniformCoupling {
    fn coupling(&self, _coords: &[usize], _dim: usize) -> f64 {
        self.0
    }

    fn uniform(&self) -> Option<f64> {
        Some(self.0)
    }
}

/// Forward couplings supplied as a flat row-major array of shape
/// `(*lattice_shape, n_dims)`.
#[derive(Debug, Clone)]
pub struct CouplingTable {
    shape: Vec<usize>,
    strides: Vec<usize>,
    n_dims: usize,
    values: Vec<f64>,
}

impl CouplingTable {
    pub fn new(shape: &[usize], values: Vec<f64>) -> Result<Self, SimError> {
        let n_dims = shape.len();
        let expected = shape.iter().product::<usize>() * n_dims;
        if values.len() != expected {
            return Err(SimError::CouplingShape {
                expected,
                actual: values.len(),
            });
        }
        let mut strides = vec![1usize; n_dims];
        for d in (0..n_dims.saturating_sub(1)).rev() {
            strides[d] = strides[d + 1] * shape[d + 1];
        }
        Ok(Self {
            shape: shape.to_vec(),
            strides,
            n_dims,
            values,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
}

impl CouplingField for CouplingTable {
    fn coupling(&self, coords: &[usize], dim: usize) -> f64 {
        let site: usize = coords.iter().zip(&self.strides).map(|(c, s)| c * s).sum();
        self.values[site * self.n_dims + dim]
    }

    fn check_shape(&self, shape: &[usize]) -> Result<(), SimError> {
        if shape == self.shape.as_slice() {
            return Ok(());
        }
        Err(SimError::CouplingShape {
            expected: shape.iter().product::<usize>() * shape.len(),
            actual: self.values.len(),
        })
    }
}

/// Stored couplings of a built lattice.
#[derive(Debug, Clone, PartialEq)]
pub enum Couplings {
    Uniform(f64),
    /// Length `n_sites * n_dims`, element `i * n_dims + d` is the bond from
    /// site `i` to its forward neighbour along `d`.
    PerEdge(Vec<f64>),
}

impl Couplings {
    #[inline]
    pub fn forward(&self, site: usize, dim: usize, n_dims: usize) -> f64 {
        match self {
            Self::Uniform(c) => *c,
            Self::PerEdge(table) => table[site * n_dims + dim],
        }
    }

    pub fn is_uniform(&self) -> bool {
        matches!(self, Self::Uniform(_))
    }
}
