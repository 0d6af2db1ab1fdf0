use std::f64::consts::PI;

use crate::error::SimError;
use crate::vector::Vector;

/// Largest extent of either table axis; a state must fit a 16-bit half word.
pub const MAX_TABLE_EXTENT: usize = u16::MAX as usize;

/// Discrete orientation of one site: a `(x, y)` index pair into an
/// [`OrientationTable`].
///
/// Packs into a single `u32` (`x` in the high half word) so that lattice sites
/// can be stored as one atomic word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpinState {
    pub x: u16,
    pub y: u16,
}

impl SpinState {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn pack(self) -> u32 {
        ((self.x as u32) << 16) | self.y as u32
    }

    #[inline]
    pub const fn unpack(word: u32) -> Self {
        Self {
            x: (word >> 16) as u16,
            y: (word & 0xffff) as u16,
        }
    }
}

/// Quasi-uniform set of unit directions on the sphere, indexed by a 2D
/// `(longitude, latitude)` grid.
///
/// Entry `(ix, iy)` has longitude `2π·ix/nx` and latitude
/// `acos(2·iy/(ny−1) − 1) − π/2`, so `iy = 0` is the north pole (+z) and
/// `iy = ny − 1` the south pole. A `1 × 2` table reduces to Ising spins along
/// ±z.
#[derive(Debug, Clone)]
pub struct OrientationTable {
    nx: usize,
    ny: usize,
    /// Row-major, length `nx * ny`, element `ix * ny + iy`.
    directions: Vec<Vector>,
}

impl OrientationTable {
    pub fn new(nx: usize, ny: usize) -> Result<Self, SimError> {
        if nx == 0 || ny < 2 || nx > MAX_TABLE_EXTENT || ny > MAX_TABLE_EXTENT {
            return Err(SimError::DegenerateOrientationTable { nx, ny });
        }

        let mut directions = Vec::with_capacity(nx * ny);
        for ix in 0..nx {
            let longitude = 2.0 * PI * ix as f64 / nx as f64;
            for iy in 0..ny {
                // clamp guards acos against 1 + ulp at the poles
                let c = (2.0 * iy as f64 / (ny - 1) as f64 - 1.0).clamp(-1.0, 1.0);
                let latitude = c.acos() - PI / 2.0;
                directions.push(Vector::new(
                    latitude.cos() * longitude.cos(),
                    latitude.cos() * longitude.sin(),
                    latitude.sin(),
                ));
            }
        }

        Ok(Self { nx, ny, directions })
    }

    /// Ising table: two states along ±z.
    pub fn ising() -> Self {
        Self::new(1, 2).expect("1x2 orientation table is valid")
    }

    #[inline]
    pub fn get(&self, ix: usize, iy: usize) -> Vector {
        self.directions[ix * self.ny + iy]
    }

    #[inline]
    pub fn get_state(&self, state: SpinState) -> Vector {
        self.get(state.x as usize, state.y as usize)
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn len(&self) -> usize {
        self.directions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    /// Fold arbitrary indices back into the table.
    #[inline]
    pub fn wrap(&self, x: usize, y: usize) -> SpinState {
        SpinState::new((x % self.nx) as u16, (y % self.ny) as u16)
    }
}
