// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Shape kernels in their own (unplaced) frame.
//!
//! Kernel contract, for every shape and every [`Backend`]:
//! - `contains(p)`: `p` lies strictly inside the surface. Scalar builds may
//!   return as soon as one test fails; lane builds evaluate every test and
//!   AND-reduce, and both agree on every point.
//! - `distance_to_in(p, d, step_max)`: distance along `d` at which the ray
//!   first enters the shape, or [`INFINITY`] when no entry happens within
//!   `[0, step_max]`. Meaningful for points outside the shape.
//! - `distance_to_out(p, d, step_max)`: distance along `d` at which the ray
//!   leaves the shape, or [`INFINITY`] beyond `step_max`. Meaningful for
//!   points inside the shape; clamped to zero on the surface.
//!
//! Each kernel is one generic function; the scalar and lane builds are the
//! same formula instantiated at different widths.

use core::fmt;

use vecnav_core::{Backend, Precision, Vector3, INFINITY};

mod box_shape;
mod revolved;

pub use box_shape::BoxShape;
pub use revolved::{ConeShape, TubeShape};

/// Operations every primitive exposes, generic over the execution backend.
pub trait ShapeKernel {
    /// Strict containment of a local point.
    fn contains<B: Backend>(&self, p: &Vector3<B::Float>) -> B::Bool;

    /// Distance to enter the shape from outside.
    fn distance_to_in<B: Backend>(
        &self,
        pos: &Vector3<B::Float>,
        dir: &Vector3<B::Float>,
        step_max: B::Float,
    ) -> B::Float;

    /// Distance to leave the shape from inside.
    fn distance_to_out<B: Backend>(
        &self,
        pos: &Vector3<B::Float>,
        dir: &Vector3<B::Float>,
        step_max: B::Float,
    ) -> B::Float;
}

/// Maps distances beyond `step_max` to the no-hit sentinel.
#[inline]
pub(crate) fn limit_to_step<B: Backend>(distance: B::Float, step_max: B::Float) -> B::Float {
    B::select(B::gt(distance, step_max), B::splat(INFINITY), distance)
}

/// Shape kind tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Axis-aligned box.
    Box,
    /// Hollow cylinder section.
    Tube,
    /// Hollow truncated cone.
    Cone,
}

/// Shape descriptor owned by a volume node: kind plus dimensions.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shape {
    /// Axis-aligned box.
    Box(BoxShape),
    /// Hollow cylinder section.
    Tube(TubeShape),
    /// Hollow truncated cone.
    Cone(ConeShape),
}

impl Shape {
    /// Kind tag.
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Box(_) => ShapeKind::Box,
            Self::Tube(_) => ShapeKind::Tube,
            Self::Cone(_) => ShapeKind::Cone,
        }
    }

    /// Half-extents of a box that encloses the shape.
    pub fn bounding_half_extents(&self) -> Vector3<Precision> {
        match self {
            Self::Box(b) => b.half_extents(),
            Self::Tube(t) => Vector3::new(t.rmax(), t.rmax(), t.dz()),
            Self::Cone(c) => {
                let r = c.rmax1().max(c.rmax2());
                Vector3::new(r, r, c.dz())
            }
        }
    }
}

impl ShapeKernel for Shape {
    #[inline]
    fn contains<B: Backend>(&self, p: &Vector3<B::Float>) -> B::Bool {
        match self {
            Self::Box(s) => s.contains::<B>(p),
            Self::Tube(s) => s.contains::<B>(p),
            Self::Cone(s) => s.contains::<B>(p),
        }
    }

    #[inline]
    fn distance_to_in<B: Backend>(
        &self,
        pos: &Vector3<B::Float>,
        dir: &Vector3<B::Float>,
        step_max: B::Float,
    ) -> B::Float {
        match self {
            Self::Box(s) => s.distance_to_in::<B>(pos, dir, step_max),
            Self::Tube(s) => s.distance_to_in::<B>(pos, dir, step_max),
            Self::Cone(s) => s.distance_to_in::<B>(pos, dir, step_max),
        }
    }

    #[inline]
    fn distance_to_out<B: Backend>(
        &self,
        pos: &Vector3<B::Float>,
        dir: &Vector3<B::Float>,
        step_max: B::Float,
    ) -> B::Float {
        match self {
            Self::Box(s) => s.distance_to_out::<B>(pos, dir, step_max),
            Self::Tube(s) => s.distance_to_out::<B>(pos, dir, step_max),
            Self::Cone(s) => s.distance_to_out::<B>(pos, dir, step_max),
        }
    }
}

impl From<BoxShape> for Shape {
    fn from(s: BoxShape) -> Self {
        Self::Box(s)
    }
}

impl From<TubeShape> for Shape {
    fn from(s: TubeShape) -> Self {
        Self::Tube(s)
    }
}

impl From<ConeShape> for Shape {
    fn from(s: ConeShape) -> Self {
        Self::Cone(s)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Box(b) => write!(f, "Box {}", b.half_extents()),
            Self::Tube(t) => write!(f, "Tube {{{}, {}, {}}}", t.rmin(), t.rmax(), t.dz()),
            Self::Cone(c) => write!(
                f,
                "Cone {{{}, {}, {}, {}, {}}}",
                c.rmin1(),
                c.rmax1(),
                c.rmin2(),
                c.rmax2(),
                c.dz()
            ),
        }
    }
}
