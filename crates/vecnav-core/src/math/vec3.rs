// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use core::fmt;
use core::ops::{Add, AddAssign, Index, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::math::Precision;

/// Three-component vector, generic over the component type.
///
/// * `Vector3<Precision>` (alias [`Vec3`]) holds one point or direction.
/// * `Vector3<B::Float>` holds one lane bundle for an execution backend `B`;
///   lane `i` of each component belongs to the same point.
/// * Whether a value is a point or a direction is decided by the caller:
///   use [`crate::Transform::apply`] for points and
///   [`crate::Transform::apply_rotation`] for directions.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Vector3<T> {
    data: [T; 3],
}

/// Scalar point or direction in `Precision`.
pub type Vec3 = Vector3<Precision>;

impl<T: Copy> Vector3<T> {
    /// Creates a vector from components.
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { data: [x, y, z] }
    }

    /// Broadcasts one value into all three components.
    pub const fn splat(v: T) -> Self {
        Self { data: [v, v, v] }
    }

    /// X component.
    #[inline]
    pub fn x(&self) -> T {
        self.data[0]
    }

    /// Y component.
    #[inline]
    pub fn y(&self) -> T {
        self.data[1]
    }

    /// Z component.
    #[inline]
    pub fn z(&self) -> T {
        self.data[2]
    }

    /// Returns the components as an array.
    pub fn to_array(self) -> [T; 3] {
        self.data
    }

    /// Applies `f` to each component.
    #[inline]
    pub fn map<U: Copy>(self, mut f: impl FnMut(T) -> U) -> Vector3<U> {
        Vector3::new(f(self.data[0]), f(self.data[1]), f(self.data[2]))
    }
}

impl<T> Vector3<T>
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<Output = T>,
{
    /// Dot product.
    #[inline]
    pub fn dot(&self, other: &Self) -> T {
        self.data[0] * other.data[0] + self.data[1] * other.data[1] + self.data[2] * other.data[2]
    }

    /// Cross product.
    pub fn cross(&self, other: &Self) -> Self {
        let [ax, ay, az] = self.data;
        let [bx, by, bz] = other.data;
        Self::new(ay * bz - az * by, az * bx - ax * bz, ax * by - ay * bx)
    }
}

impl Vec3 {
    /// Zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Unit vector pointing along the positive X axis.
    pub const UNIT_X: Self = Self::new(1.0, 0.0, 0.0);

    /// Unit vector pointing along the positive Y axis.
    pub const UNIT_Y: Self = Self::new(0.0, 1.0, 0.0);

    /// Unit vector pointing along the positive Z axis.
    pub const UNIT_Z: Self = Self::new(0.0, 0.0, 1.0);

    /// Vector length (magnitude).
    pub fn length(&self) -> Precision {
        self.dot(self).sqrt()
    }

    /// Squared magnitude of the vector.
    pub fn length_squared(&self) -> Precision {
        self.dot(self)
    }

    /// Normalises the vector; a zero-length vector stays zero.
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len == 0.0 {
            return Self::ZERO;
        }
        *self * (1.0 / len)
    }

    /// Component-wise absolute value.
    pub fn abs(&self) -> Self {
        self.map(Precision::abs)
    }

    /// Returns `true` when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|c| c.is_finite())
    }

    /// Largest absolute component difference to `other`.
    pub fn max_abs_diff(&self, other: &Self) -> Precision {
        let d = (*self - *other).abs();
        d.x().max(d.y()).max(d.z())
    }
}

impl<T> From<[T; 3]> for Vector3<T> {
    fn from(value: [T; 3]) -> Self {
        Self { data: value }
    }
}

impl<T> Index<usize> for Vector3<T> {
    type Output = T;

    fn index(&self, idx: usize) -> &T {
        &self.data[idx]
    }
}

impl<T: Copy + Add<Output = T>> Add for Vector3<T> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.data[0] + rhs.data[0],
            self.data[1] + rhs.data[1],
            self.data[2] + rhs.data[2],
        )
    }
}

impl<T: Copy + Sub<Output = T>> Sub for Vector3<T> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.data[0] - rhs.data[0],
            self.data[1] - rhs.data[1],
            self.data[2] - rhs.data[2],
        )
    }
}

impl<T: Copy + Mul<Output = T>> Mul<T> for Vector3<T> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: T) -> Self {
        Self::new(self.data[0] * rhs, self.data[1] * rhs, self.data[2] * rhs)
    }
}

impl Mul<Vec3> for Precision {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Vec3 {
        rhs * self
    }
}

impl<T: Copy + Neg<Output = T>> Neg for Vector3<T> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.data[0], -self.data[1], -self.data[2])
    }
}

impl<T: Copy + Add<Output = T>> AddAssign for Vector3<T> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<T: Copy + Sub<Output = T>> SubAssign for Vector3<T> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<T: Copy + Mul<Output = T>> MulAssign<T> for Vector3<T> {
    fn mul_assign(&mut self, rhs: T) {
        *self = *self * rhs;
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.data[0], self.data[1], self.data[2])
    }
}
