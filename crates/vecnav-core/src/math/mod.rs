// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Numeric helpers shared by transforms and shape kernels.
//!
//! `Precision` is `f64` unless the `float_precision` feature selects `f32`.
//! Every kernel is written against `Precision`, never against a concrete
//! float type, so both builds run the same formulas.

mod soa;
mod vec3;

pub use soa::Soa3;
pub use vec3::{Vec3, Vector3};

/// Floating-point type used for coordinates, distances and matrix entries.
#[cfg(not(feature = "float_precision"))]
pub type Precision = f64;

/// Floating-point type used for coordinates, distances and matrix entries.
#[cfg(feature = "float_precision")]
pub type Precision = f32;

/// Sentinel distance meaning "no boundary reached".
pub const INFINITY: Precision = Precision::INFINITY;

/// Floor added to direction components before dividing by them.
///
/// Small enough that `1.0 + TINY == 1.0` in both precisions.
pub const TINY: Precision = 1e-20;

/// Surface tolerance: roots this far behind the start point still count as
/// hits at distance zero, and steps push this far past a boundary.
pub const TOLERANCE: Precision = 1e-9;

/// Degrees to radians factor.
pub const DEG_TO_RAD: Precision = core::f64::consts::PI as Precision / 180.0;

/// Converts degrees to radians.
pub fn deg_to_rad(value: Precision) -> Precision {
    value * DEG_TO_RAD
}
