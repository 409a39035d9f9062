// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
//! Property tests for transform classification and specialized dispatch.

use proptest::prelude::*;
use vecnav_core::transform::{rotation, translation};
use vecnav_core::{Lanes, Precision, Scalar, Soa3, Transform, TransformKernel, Vec3, Wide};

fn coord() -> impl Strategy<Value = Precision> {
    -1.0e3 as Precision..1.0e3 as Precision
}

fn point() -> impl Strategy<Value = Vec3> {
    (coord(), coord(), coord()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn angle() -> impl Strategy<Value = Precision> {
    -180.0 as Precision..180.0 as Precision
}

/// Euler angles in multiples of 90 degrees hit the permutation codes.
fn right_angle() -> impl Strategy<Value = Precision> {
    (-2i32..=2).prop_map(|k| (k * 90) as Precision)
}

fn transform() -> impl Strategy<Value = Transform> {
    (coord(), coord(), coord(), angle(), angle(), angle())
        .prop_map(|(tx, ty, tz, phi, theta, psi)| Transform::new(tx, ty, tz, phi, theta, psi))
}

/// Rounds tiny matrix entries produced by sin/cos of right angles to zero so
/// the rotation lands on a sparse code.
fn sparse_transform() -> impl Strategy<Value = Transform> {
    (prop::bool::ANY, coord(), right_angle(), right_angle(), right_angle()).prop_map(
        |(translated, t, phi, theta, psi)| {
            let raw = Transform::new(0.0, 0.0, 0.0, phi, theta, psi);
            let rot = raw.rotation().map(|v| if v.abs() < 1e-6 { 0.0 } else { v.round() });
            let offset = if translated { Vec3::new(t, -t, 0.5 * t) } else { Vec3::ZERO };
            Transform::from_matrix(offset, rot)
        },
    )
}

fn tolerance(p: &Vec3) -> Precision {
    let scale = p.abs().x().max(p.abs().y()).max(p.abs().z()).max(1.0);
    scale * 1e4 * Precision::EPSILON
}

proptest! {
    #[test]
    fn apply_inverse_round_trips(t in transform(), p in point()) {
        let back = t.apply(t.apply_inverse(p));
        prop_assert!(back.max_abs_diff(&p) <= tolerance(&p), "{p} -> {back}");
        let back = t.apply_inverse(t.apply(p));
        prop_assert!(back.max_abs_diff(&p) <= tolerance(&p), "{p} -> {back}");
    }

    #[test]
    fn specialized_and_generic_paths_agree(t in sparse_transform(), p in point()) {
        let kernel = TransformKernel::<Scalar>::for_transform(&t);
        prop_assert_eq!(kernel.specialized, rotation::SPECIALIZED.contains(&t.rotation_code()));
        let fast = t.apply(p);
        let slow = t.apply_generic(p);
        prop_assert_eq!(fast, slow);
    }

    #[test]
    fn lane_transforms_match_scalar_bits(t in transform(), pts in prop::collection::vec(point(), 1..40)) {
        let soa = Soa3::from_vectors(&pts);
        let mut lanes = Soa3::new();
        let mut wide = Soa3::new();
        t.apply_soa::<Lanes<8>>(&soa, &mut lanes);
        t.apply_soa::<Wide>(&soa, &mut wide);
        for (i, p) in pts.iter().enumerate() {
            let expect = t.apply(*p).to_array().map(Precision::to_bits);
            prop_assert_eq!(lanes.get(i).to_array().map(Precision::to_bits), expect);
            prop_assert_eq!(wide.get(i).to_array().map(Precision::to_bits), expect);
        }
    }

    #[test]
    fn compose_accumulates_like_nested_application(a in transform(), b in transform(), p in point()) {
        let nested = a.apply(b.apply(p));
        let composed = a.compose(&b).apply(p);
        prop_assert!(nested.max_abs_diff(&composed) <= 10.0 * tolerance(&p) + tolerance(&b.translation()));
    }
}

#[test]
fn zero_translation_identity_basis_is_identity_code() {
    let t = Transform::from_matrix(Vec3::ZERO, [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    assert_eq!(t.rotation_code(), rotation::IDENTITY);
    assert_eq!(t.translation_code(), translation::ORIGIN);
    assert!(!t.has_rotation());
    assert!(!t.has_translation());
}

#[test]
fn directions_ignore_translation() {
    let t = Transform::from_translation(Vec3::new(10.0, -5.0, 3.0));
    assert_eq!(t.apply_rotation(Vec3::UNIT_X), Vec3::UNIT_X);
    assert_eq!(t.apply(Vec3::new(10.0, -5.0, 3.0)), Vec3::ZERO);
}
