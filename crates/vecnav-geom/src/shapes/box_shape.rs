// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use vecnav_core::{Backend, Precision, Vec3, Vector3, INFINITY, TINY};

use crate::error::GeometryError;
use crate::shapes::{limit_to_step, ShapeKernel};

/// Axis-aligned box centred on the origin of its frame.
///
/// Invariants:
/// - Half-extents are finite and strictly positive.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoxShape {
    dims: [Precision; 3],
}

impl BoxShape {
    /// Builds a box from its half-extents along x, y and z.
    pub fn new(dx: Precision, dy: Precision, dz: Precision) -> Result<Self, GeometryError> {
        let dims = [dx, dy, dz];
        if dims.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return Err(GeometryError::InvalidDimensions {
                kind: "box",
                reason: format!("half-extents must be positive and finite, got {dims:?}"),
            });
        }
        Ok(Self { dims })
    }

    /// Half-extents.
    pub fn half_extents(&self) -> Vec3 {
        Vec3::from(self.dims)
    }
}

/// The two axes spanning the face perpendicular to `axis`.
const FACE_AXES: [(usize, usize); 3] = [(1, 2), (0, 2), (0, 1)];

impl ShapeKernel for BoxShape {
    #[inline]
    fn contains<B: Backend>(&self, p: &Vector3<B::Float>) -> B::Bool {
        let mut inside = B::mask(true);
        for axis in 0..3 {
            let on_axis = B::lt(B::abs(p[axis]), B::splat(self.dims[axis]));
            if B::EARLY_RETURN && !B::all(on_axis) {
                return B::mask(false);
            }
            inside = inside & on_axis;
        }
        inside
    }

    /// Tests the faces in x, y, z order; the first face whose entry point is
    /// on the face and approached from outside wins.
    fn distance_to_in<B: Backend>(
        &self,
        pos: &Vector3<B::Float>,
        dir: &Vector3<B::Float>,
        step_max: B::Float,
    ) -> B::Float {
        let zero = B::splat(0.0);
        let tiny = B::splat(TINY);
        let dims = self.dims.map(B::splat);
        let safety: [B::Float; 3] = core::array::from_fn(|i| B::abs(pos[i]) - dims[i]);

        let mut distance = B::splat(INFINITY);
        let mut done = B::ge(safety[0], step_max)
            | B::ge(safety[1], step_max)
            | B::ge(safety[2], step_max);
        if B::all(done) {
            return distance;
        }

        for (axis, &(a, b)) in FACE_AXES.iter().enumerate() {
            let next = safety[axis] / B::abs(dir[axis] + tiny);
            let coord1 = pos[a] + next * dir[a];
            let coord2 = pos[b] + next * dir[b];
            let hit = B::gt(safety[axis], zero)
                & B::lt(pos[axis] * dir[axis], zero)
                & B::le(B::abs(coord1), dims[a])
                & B::le(B::abs(coord2), dims[b]);
            B::masked_assign(!done & hit, next, &mut distance);
            done = done | hit;
            if B::all(done) {
                break;
            }
        }
        limit_to_step::<B>(distance, step_max)
    }

    fn distance_to_out<B: Backend>(
        &self,
        pos: &Vector3<B::Float>,
        dir: &Vector3<B::Float>,
        step_max: B::Float,
    ) -> B::Float {
        let zero = B::splat(0.0);
        let tiny = B::splat(TINY);
        let mut distance = B::splat(INFINITY);
        for axis in 0..3 {
            // Distance to the face the direction points at.
            let toward = B::select(B::lt(dir[axis], zero), -pos[axis], pos[axis]);
            let d = (B::splat(self.dims[axis]) - toward) / B::max(B::abs(dir[axis]), tiny);
            distance = B::min(distance, d);
        }
        limit_to_step::<B>(B::max(distance, zero), step_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vecnav_core::Scalar;

    fn unit() -> BoxShape {
        BoxShape::new(2.0, 2.0, 2.0).unwrap_or_else(|e| unreachable!("{e}"))
    }

    #[test]
    fn rejects_non_positive_extents() {
        assert!(BoxShape::new(0.0, 1.0, 1.0).is_err());
        assert!(BoxShape::new(1.0, -1.0, 1.0).is_err());
        assert!(BoxShape::new(1.0, 1.0, Precision::NAN).is_err());
    }

    #[test]
    fn contains_is_strict_on_faces() {
        let b = unit();
        assert!(b.contains::<Scalar>(&Vec3::new(1.9, -1.9, 0.0)));
        assert!(!b.contains::<Scalar>(&Vec3::new(2.0, 0.0, 0.0)));
        assert!(!b.contains::<Scalar>(&Vec3::new(0.0, 0.0, -3.0)));
    }

    #[test]
    fn distance_to_in_along_axis() {
        let b = unit();
        let p = Vec3::new(10.0, 0.0, 0.0);
        let toward = b.distance_to_in::<Scalar>(&p, &Vec3::new(-1.0, 0.0, 0.0), INFINITY);
        assert_eq!(toward, 8.0);
        let away = b.distance_to_in::<Scalar>(&p, &Vec3::new(1.0, 0.0, 0.0), INFINITY);
        assert_eq!(away, INFINITY);
    }

    #[test]
    fn distance_to_in_respects_step_max() {
        let b = unit();
        let p = Vec3::new(10.0, 0.0, 0.0);
        let d = Vec3::new(-1.0, 0.0, 0.0);
        assert_eq!(b.distance_to_in::<Scalar>(&p, &d, 5.0), INFINITY);
        assert_eq!(b.distance_to_in::<Scalar>(&p, &d, 8.5), 8.0);
    }

    #[test]
    fn distance_to_in_misses_beside_face() {
        let b = unit();
        let p = Vec3::new(10.0, 2.5, 0.0);
        assert_eq!(b.distance_to_in::<Scalar>(&p, &Vec3::new(-1.0, 0.0, 0.0), INFINITY), INFINITY);
    }

    #[test]
    fn distance_to_out_from_centre() {
        let b = BoxShape::new(2.0, 3.0, 4.0).unwrap_or_else(|e| unreachable!("{e}"));
        let d = b.distance_to_out::<Scalar>(&Vec3::ZERO, &Vec3::new(-1.0, 0.0, 0.0), INFINITY);
        assert_eq!(d, 2.0);
        let d = b.distance_to_out::<Scalar>(&Vec3::new(0.0, 1.0, 0.0), &Vec3::UNIT_Y, INFINITY);
        assert_eq!(d, 2.0);
    }
}
