use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use wide::f64x4;

/// Lengths below this are treated as zero by [`Vector::set_length`].
const DEGENERATE_LENGTH: f64 = 10.0 * f64::EPSILON;

/// 3-component real vector held in a 4-lane SIMD register.
///
/// The fourth lane is kept at zero by every constructor and operation, so
/// horizontal sums over all four lanes equal sums over `x, y, z`.
#[derive(Clone, Copy)]
pub struct Vector {
    reg: f64x4,
}

impl Vector {
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            reg: f64x4::from([x, y, z, 0.0]),
        }
    }

    #[inline]
    pub fn zero() -> Self {
        Self {
            reg: f64x4::splat(0.0),
        }
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.reg.to_array()[0]
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.reg.to_array()[1]
    }

    #[inline]
    pub fn z(&self) -> f64 {
        self.reg.to_array()[2]
    }

    #[inline]
    pub fn to_array(&self) -> [f64; 3] {
        let [x, y, z, _] = self.reg.to_array();
        [x, y, z]
    }

    #[inline]
    pub fn add(&self, other: &Self) -> Self {
        *self + *other
    }

    #[inline]
    pub fn subtract(&self, other: &Self) -> Self {
        *self - *other
    }

    #[inline]
    pub fn scale(&self, k: f64) -> Self {
        *self * k
    }

    /// Divide every component by `k`. `k == 0` is not guarded.
    #[inline]
    pub fn divide(&self, k: f64) -> Self {
        *self / k
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        let [a, b, c, _] = (self.reg * other.reg).to_array();
        a + b + c
    }

    #[inline]
    pub fn length_squared(&self) -> f64 {
        self.dot(self)
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Rescale in place to `new_len`. No-op for (near-)zero vectors, which
    /// have no direction to keep.
    pub fn set_length(&mut self, new_len: f64) {
        let cur = self.length();
        if cur.abs() < DEGENERATE_LENGTH {
            return;
        }
        *self *= new_len / cur;
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|c| c.is_finite())
    }
}

impl Default for Vector {
    fn default() -> Self {
        Self::zero()
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        self.to_array() == other.to_array()
    }
}

impl fmt::Debug for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.to_array();
        f.debug_struct("Vector")
            .field("x", &x)
            .field("y", &y)
            .field("z", &z)
            .finish()
    }
}

impl From<[f64; 3]> for Vector {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl Add for Vector {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            reg: self.reg + rhs.reg,
        }
    }
}

impl Sub for Vector {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            reg: self.reg - rhs.reg,
        }
    }
}

impl Mul<f64> for Vector {
    type Output = Self;
    #[inline]
    fn mul(self, k: f64) -> Self {
        Self {
            reg: self.reg * f64x4::splat(k),
        }
    }
}

impl Div<f64> for Vector {
    type Output = Self;
    #[inline]
    fn div(self, k: f64) -> Self {
        self * (1.0 / k)
    }
}

impl Neg for Vector {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        self * -1.0
    }
}

impl AddAssign for Vector {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.reg = self.reg + rhs.reg;
    }
}

impl SubAssign for Vector {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.reg = self.reg - rhs.reg;
    }
}

impl MulAssign<f64> for Vector {
    #[inline]
    fn mul_assign(&mut self, k: f64) {
        self.reg = self.reg * f64x4::splat(k);
    }
}

impl DivAssign<f64> for Vector {
    #[inline]
    fn div_assign(&mut self, k: f64) {
        *self *= 1.0 / k;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_arithmetic() {
        let a = Vector::new(1.0, 2.0, 3.0);
        let b = Vector::new(-0.5, 4.0, 1.5);

        assert_eq!(Vector::add(&a, &b), Vector::new(0.5, 6.0, 4.5));
        assert_eq!(a.subtract(&b), Vector::new(1.5, -2.0, 1.5));
        assert_eq!(a.scale(2.0), Vector::new(2.0, 4.0, 6.0));
        assert_eq!(a.divide(2.0), Vector::new(0.5, 1.0, 1.5));
        assert_eq!(-a, Vector::new(-1.0, -2.0, -3.0));

        // commutative / associative like real vectors
        assert_eq!(a + b, b + a);
        let c = Vector::new(7.0, -1.0, 0.25);
        assert_eq!((a + b) + c, a + (b + c));
    }

    #[test]
    fn test_in_place_ops() {
        let mut v = Vector::new(1.0, 1.0, 1.0);
        v += Vector::new(1.0, 2.0, 3.0);
        assert_eq!(v, Vector::new(2.0, 3.0, 4.0));
        v -= Vector::new(2.0, 2.0, 2.0);
        assert_eq!(v, Vector::new(0.0, 1.0, 2.0));
        v *= 3.0;
        assert_eq!(v, Vector::new(0.0, 3.0, 6.0));
        v /= 3.0;
        assert_relative_eq!(v.y(), 1.0);
        assert_relative_eq!(v.z(), 2.0);
    }

    #[test]
    fn test_dot_and_length() {
        let a = Vector::new(3.0, 4.0, 12.0);
        assert_relative_eq!(a.length_squared(), 169.0);
        assert_relative_eq!(a.length(), 13.0);
        assert_relative_eq!(a.dot(&Vector::new(1.0, 0.0, -1.0)), -9.0);
        // the padding lane never leaks into a dot product
        assert_relative_eq!(Vector::zero().dot(&a), 0.0);
    }

    #[test]
    fn test_set_length() {
        let mut v = Vector::new(0.0, 3.0, 4.0);
        v.set_length(10.0);
        assert_relative_eq!(v.length(), 10.0, epsilon = 1e-12);
        assert_relative_eq!(v.y(), 6.0, epsilon = 1e-12);
        assert_relative_eq!(v.z(), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_set_length_degenerate_is_noop() {
        let mut v = Vector::zero();
        v.set_length(5.0);
        assert_eq!(v, Vector::zero());

        let tiny = Vector::new(f64::EPSILON, 0.0, 0.0);
        let mut w = tiny;
        w.set_length(1.0);
        assert_eq!(w, tiny);
    }
}
