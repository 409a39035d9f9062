// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Solids of revolution about the local z axis: tubes and cones.
//!
//! Both shapes are bounded by two planes `z = ±dz` and by up to two conical
//! surfaces `r = slope * z + offset` (a tube is a cone with zero slope), so
//! they share one set of kernels.

use vecnav_core::{Backend, Precision, Vector3, INFINITY, TINY, TOLERANCE};

use crate::error::GeometryError;
use crate::shapes::{limit_to_step, ShapeKernel};

/// Surface `r = slope * z + offset` around the z axis.
#[derive(Debug, Copy, Clone, PartialEq)]
struct ConicalSurface {
    slope: Precision,
    offset: Precision,
}

impl ConicalSurface {
    /// Surface with radius `r_minus` at `z = -dz` and `r_plus` at `z = +dz`.
    fn through(r_minus: Precision, r_plus: Precision, dz: Precision) -> Self {
        Self {
            slope: (r_plus - r_minus) / (2.0 * dz),
            offset: 0.5 * (r_plus + r_minus),
        }
    }

    #[inline]
    fn radius_at<B: Backend>(&self, z: B::Float) -> B::Float {
        B::splat(self.slope) * z + B::splat(self.offset)
    }

    /// Distance to the first crossing of this surface inside `|z| <= dz`.
    ///
    /// With `outward` the ray must go from `r < R` to `r > R`; otherwise the
    /// other way round. Crossings up to [`TOLERANCE`] behind the start count
    /// and are reported as zero.
    fn crossing<B: Backend>(
        &self,
        pos: &Vector3<B::Float>,
        dir: &Vector3<B::Float>,
        dz: Precision,
        outward: bool,
    ) -> B::Float {
        let zero = B::splat(0.0);
        let inf = B::splat(INFINITY);
        let k = B::splat(self.slope);
        let radius = self.radius_at::<B>(pos.z());

        // f(t) = a t^2 + 2 b t + c, where f = x^2 + y^2 - R(z)^2 along the ray.
        let a = dir.x() * dir.x() + dir.y() * dir.y() - k * k * dir.z() * dir.z();
        let b = pos.x() * dir.x() + pos.y() * dir.y() - k * dir.z() * radius;
        let c = pos.x() * pos.x() + pos.y() * pos.y() - radius * radius;
        let disc = b * b - a * c;
        let real = B::ge(disc, zero);
        if B::EARLY_RETURN && !B::all(real) {
            return inf;
        }

        // The root where f' = 2(a t + b) = +2 sqrt(disc) is the outward one.
        // Both roots are taken in cancellation-free form; `a == 0` degrades
        // to the single linear root.
        let s = B::sqrt(B::max(disc, zero));
        let b_non_neg = B::ge(b, zero);
        let q = -(b + B::select(b_non_neg, s, -s));
        let over_a = q / a;
        let over_q = c / q;
        let t = if outward {
            B::select(b_non_neg, over_q, over_a)
        } else {
            B::select(b_non_neg, over_a, over_q)
        };

        let z_hit = pos.z() + t * dir.z();
        let valid = real
            & B::ge(t, B::splat(-TOLERANCE))
            & B::lt(t, inf)
            & B::le(B::abs(z_hit), B::splat(dz))
            & B::ge(self.radius_at::<B>(z_hit), zero);
        B::select(valid, B::max(t, zero), inf)
    }
}

/// Shared geometry of tubes and cones.
///
/// Index 0 of the radius pairs is the `z = -dz` face, index 1 the `+dz` face.
#[derive(Debug, Copy, Clone, PartialEq)]
struct Revolved {
    dz: Precision,
    rmin: [Precision; 2],
    rmax: [Precision; 2],
    outer: ConicalSurface,
    inner: Option<ConicalSurface>,
}

impl Revolved {
    fn new(rmin: [Precision; 2], rmax: [Precision; 2], dz: Precision) -> Self {
        let inner = (rmin[0] > 0.0 || rmin[1] > 0.0)
            .then(|| ConicalSurface::through(rmin[0], rmin[1], dz));
        Self {
            dz,
            rmin,
            rmax,
            outer: ConicalSurface::through(rmax[0], rmax[1], dz),
            inner,
        }
    }

    #[inline]
    fn contains<B: Backend>(&self, p: &Vector3<B::Float>) -> B::Bool {
        let z = p.z();
        let mut inside = B::lt(B::abs(z), B::splat(self.dz));
        if B::EARLY_RETURN && !B::all(inside) {
            return B::mask(false);
        }
        let r2 = p.x() * p.x() + p.y() * p.y();
        let rout = self.outer.radius_at::<B>(z);
        inside = inside & B::lt(r2, rout * rout);
        if B::EARLY_RETURN && !B::all(inside) {
            return B::mask(false);
        }
        if let Some(inner) = &self.inner {
            let rin = inner.radius_at::<B>(z);
            inside = inside & B::gt(r2, rin * rin);
        }
        inside
    }

    /// Entry through one of the end planes.
    fn end_plane_in<B: Backend>(&self, pos: &Vector3<B::Float>, dir: &Vector3<B::Float>) -> B::Float {
        let zero = B::splat(0.0);
        let safety = B::abs(pos.z()) - B::splat(self.dz);
        let t = safety / B::abs(dir.z() + B::splat(TINY));
        let x = pos.x() + t * dir.x();
        let y = pos.y() + t * dir.y();
        let r2 = x * x + y * y;

        let upper = B::gt(pos.z(), zero);
        let rmax = B::select(upper, B::splat(self.rmax[1]), B::splat(self.rmax[0]));
        let mut hit = B::ge(safety, zero) & B::lt(pos.z() * dir.z(), zero) & B::le(r2, rmax * rmax);
        if self.inner.is_some() {
            let rmin = B::select(upper, B::splat(self.rmin[1]), B::splat(self.rmin[0]));
            hit = hit & B::ge(r2, rmin * rmin);
        }
        B::select(hit, t, B::splat(INFINITY))
    }

    /// Exit through the end plane the direction points at.
    fn end_plane_out<B: Backend>(&self, pos: &Vector3<B::Float>, dir: &Vector3<B::Float>) -> B::Float {
        let toward = B::select(B::lt(dir.z(), B::splat(0.0)), -pos.z(), pos.z());
        (B::splat(self.dz) - toward) / B::max(B::abs(dir.z()), B::splat(TINY))
    }

    fn distance_to_in<B: Backend>(
        &self,
        pos: &Vector3<B::Float>,
        dir: &Vector3<B::Float>,
        step_max: B::Float,
    ) -> B::Float {
        let mut distance = self.end_plane_in::<B>(pos, dir);
        distance = B::min(distance, self.outer.crossing::<B>(pos, dir, self.dz, false));
        if let Some(inner) = &self.inner {
            distance = B::min(distance, inner.crossing::<B>(pos, dir, self.dz, true));
        }
        limit_to_step::<B>(distance, step_max)
    }

    fn distance_to_out<B: Backend>(
        &self,
        pos: &Vector3<B::Float>,
        dir: &Vector3<B::Float>,
        step_max: B::Float,
    ) -> B::Float {
        let mut distance = self.end_plane_out::<B>(pos, dir);
        distance = B::min(distance, self.outer.crossing::<B>(pos, dir, self.dz, true));
        if let Some(inner) = &self.inner {
            distance = B::min(distance, inner.crossing::<B>(pos, dir, self.dz, false));
        }
        limit_to_step::<B>(B::max(distance, B::splat(0.0)), step_max)
    }
}

fn check(kind: &'static str, ok: bool, reason: impl FnOnce() -> String) -> Result<(), GeometryError> {
    if ok {
        Ok(())
    } else {
        Err(GeometryError::InvalidDimensions { kind, reason: reason() })
    }
}

/// Hollow cylinder section: `rmin <= r <= rmax`, `|z| <= dz`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TubeShape {
    solid: Revolved,
}

impl TubeShape {
    /// Builds a tube; `rmin` may be zero for a solid cylinder.
    pub fn new(rmin: Precision, rmax: Precision, dz: Precision) -> Result<Self, GeometryError> {
        let finite = rmin.is_finite() && rmax.is_finite() && dz.is_finite();
        check("tube", finite && dz > 0.0, || format!("half-length must be positive and finite, got {dz}"))?;
        check("tube", rmin >= 0.0 && rmin < rmax, || {
            format!("radii must satisfy 0 <= rmin < rmax, got {rmin}, {rmax}")
        })?;
        Ok(Self { solid: Revolved::new([rmin; 2], [rmax; 2], dz) })
    }

    /// Inner radius.
    pub fn rmin(&self) -> Precision {
        self.solid.rmin[0]
    }

    /// Outer radius.
    pub fn rmax(&self) -> Precision {
        self.solid.rmax[0]
    }

    /// Half-length along z.
    pub fn dz(&self) -> Precision {
        self.solid.dz
    }
}

/// Hollow truncated cone: radii `rmin1..rmax1` at `z = -dz` and
/// `rmin2..rmax2` at `z = +dz`, linear in between.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ConeShape {
    solid: Revolved,
}

impl ConeShape {
    /// Builds a cone. A zero outer radius at one end gives a pointed cone.
    pub fn new(
        rmin1: Precision,
        rmax1: Precision,
        rmin2: Precision,
        rmax2: Precision,
        dz: Precision,
    ) -> Result<Self, GeometryError> {
        let all = [rmin1, rmax1, rmin2, rmax2, dz];
        check("cone", all.iter().all(|v| v.is_finite()) && dz > 0.0, || {
            format!("dimensions must be finite with positive half-length, got {all:?}")
        })?;
        check(
            "cone",
            rmin1 >= 0.0 && rmin2 >= 0.0 && rmin1 <= rmax1 && rmin2 <= rmax2,
            || format!("radii must satisfy 0 <= rmin <= rmax at both ends, got {all:?}"),
        )?;
        check("cone", rmax1 > rmin1 || rmax2 > rmin2, || {
            format!("cone has no volume, got {all:?}")
        })?;
        Ok(Self { solid: Revolved::new([rmin1, rmin2], [rmax1, rmax2], dz) })
    }

    /// Inner radius at `z = -dz`.
    pub fn rmin1(&self) -> Precision {
        self.solid.rmin[0]
    }

    /// Outer radius at `z = -dz`.
    pub fn rmax1(&self) -> Precision {
        self.solid.rmax[0]
    }

    /// Inner radius at `z = +dz`.
    pub fn rmin2(&self) -> Precision {
        self.solid.rmin[1]
    }

    /// Outer radius at `z = +dz`.
    pub fn rmax2(&self) -> Precision {
        self.solid.rmax[1]
    }

    /// Half-length along z.
    pub fn dz(&self) -> Precision {
        self.solid.dz
    }
}

macro_rules! revolved_kernel {
    ($ty:ty) => {
        impl ShapeKernel for $ty {
            #[inline]
            fn contains<B: Backend>(&self, p: &Vector3<B::Float>) -> B::Bool {
                self.solid.contains::<B>(p)
            }

            #[inline]
            fn distance_to_in<B: Backend>(
                &self,
                pos: &Vector3<B::Float>,
                dir: &Vector3<B::Float>,
                step_max: B::Float,
            ) -> B::Float {
                self.solid.distance_to_in::<B>(pos, dir, step_max)
            }

            #[inline]
            fn distance_to_out<B: Backend>(
                &self,
                pos: &Vector3<B::Float>,
                dir: &Vector3<B::Float>,
                step_max: B::Float,
            ) -> B::Float {
                self.solid.distance_to_out::<B>(pos, dir, step_max)
            }
        }
    };
}

revolved_kernel!(TubeShape);
revolved_kernel!(ConeShape);

#[cfg(test)]
mod tests {
    use super::*;
    use vecnav_core::{Scalar, Vec3};

    fn tube() -> TubeShape {
        TubeShape::new(1.0, 2.0, 3.0).unwrap_or_else(|e| unreachable!("{e}"))
    }

    #[test]
    fn rejects_bad_radii() {
        assert!(TubeShape::new(2.0, 1.0, 1.0).is_err());
        assert!(TubeShape::new(0.0, 1.0, 0.0).is_err());
        assert!(ConeShape::new(0.0, 0.0, 0.0, 0.0, 1.0).is_err());
        assert!(ConeShape::new(2.0, 1.0, 0.0, 1.0, 1.0).is_err());
        assert!(ConeShape::new(0.0, 0.0, 0.0, 2.0, 1.0).is_ok());
    }

    #[test]
    fn tube_contains_excludes_bore() {
        let t = tube();
        assert!(t.contains::<Scalar>(&Vec3::new(1.5, 0.0, 0.0)));
        assert!(!t.contains::<Scalar>(&Vec3::new(0.5, 0.0, 0.0)));
        assert!(!t.contains::<Scalar>(&Vec3::new(2.5, 0.0, 0.0)));
        assert!(!t.contains::<Scalar>(&Vec3::new(1.5, 0.0, 3.0)));
    }

    #[test]
    fn tube_entry_through_side_and_end() {
        let t = tube();
        let side = t.distance_to_in::<Scalar>(&Vec3::new(5.0, 0.0, 0.0), &Vec3::new(-1.0, 0.0, 0.0), INFINITY);
        assert_eq!(side, 3.0);
        let end = t.distance_to_in::<Scalar>(&Vec3::new(1.5, 0.0, 10.0), &Vec3::new(0.0, 0.0, -1.0), INFINITY);
        assert_eq!(end, 7.0);
        let bore = t.distance_to_in::<Scalar>(&Vec3::new(0.0, 0.0, 10.0), &Vec3::new(0.0, 0.0, -1.0), INFINITY);
        assert_eq!(bore, INFINITY);
    }

    #[test]
    fn tube_entry_from_bore_hits_inner_wall() {
        let t = tube();
        let d = t.distance_to_in::<Scalar>(&Vec3::ZERO, &Vec3::UNIT_X, INFINITY);
        assert!((d - 1.0).abs() < 1e-12, "{d}");
    }

    #[test]
    fn tube_exit_through_either_wall() {
        let t = tube();
        let p = Vec3::new(1.5, 0.0, 0.0);
        assert_eq!(t.distance_to_out::<Scalar>(&p, &Vec3::UNIT_X, INFINITY), 0.5);
        assert_eq!(t.distance_to_out::<Scalar>(&p, &Vec3::new(-1.0, 0.0, 0.0), INFINITY), 0.5);
        assert_eq!(t.distance_to_out::<Scalar>(&p, &Vec3::UNIT_Z, INFINITY), 3.0);
    }

    #[test]
    fn cone_radius_follows_slope() {
        let c = ConeShape::new(0.0, 1.0, 0.0, 3.0, 2.0).unwrap_or_else(|e| unreachable!("{e}"));
        let d = c.distance_to_in::<Scalar>(&Vec3::new(10.0, 0.0, 0.0), &Vec3::new(-1.0, 0.0, 0.0), INFINITY);
        assert_eq!(d, 8.0);
        assert!(c.contains::<Scalar>(&Vec3::new(2.4, 0.0, 1.5)));
        assert!(!c.contains::<Scalar>(&Vec3::new(2.4, 0.0, -1.5)));
        let out = c.distance_to_out::<Scalar>(&Vec3::ZERO, &Vec3::UNIT_Y, INFINITY);
        assert_eq!(out, 2.0);
    }

    #[test]
    fn far_hits_become_no_hit() {
        let t = tube();
        let d = t.distance_to_in::<Scalar>(&Vec3::new(5.0, 0.0, 0.0), &Vec3::new(-1.0, 0.0, 0.0), 2.0);
        assert_eq!(d, INFINITY);
    }
}
