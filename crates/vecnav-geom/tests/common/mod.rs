// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(dead_code)]
//! Shared fixtures: a small detector-like world and seeded point samplers.

use rand::rngs::StdRng;
use rand::Rng;
use vecnav_core::{Precision, Transform, Vec3};
use vecnav_geom::{BoxShape, ConeShape, GeometryTree, TubeShape, VolumeId};

pub const WORLD_RMAX: Precision = 100.0;
pub const WORLD_DZ: Precision = 200.0;

/// Tube world with a beam pipe, four tilted plates, a shield tube and two
/// conical end caps (the second one flipped).
pub fn detector() -> (GeometryTree, VolumeId) {
    let mut tree = GeometryTree::new();
    let world = tree.add_volume(
        "world",
        TubeShape::new(0.0, WORLD_RMAX, WORLD_DZ).expect("world"),
        Transform::identity(),
    ).expect("add");
    tree.set_root(world).expect("root");

    let mut place = |name: &str, shape: vecnav_geom::Shape, t: Transform| {
        let id = tree.add_volume(name, shape, t).expect("add");
        tree.place_daughter(world, id).expect("place");
        id
    };

    place(
        "beampipe",
        TubeShape::new(WORLD_RMAX / 40.0, WORLD_RMAX / 20.0, WORLD_DZ).expect("pipe").into(),
        Transform::identity(),
    );
    let plate = BoxShape::new(30.0, 5.0, 2.0 * WORLD_DZ / 3.0).expect("plate");
    place("plate1", plate.into(), Transform::new(50.0, 0.0, 0.0, 35.0, 0.0, 10.0));
    place("plate2", plate.into(), Transform::new(-50.0, 0.0, 0.0, 35.0, 0.0, 10.0));
    place("plate3", plate.into(), Transform::new(0.0, 50.0, 0.0, -35.0, 0.0, 10.0));
    place("plate4", plate.into(), Transform::new(0.0, -50.0, 0.0, -35.0, 0.0, 10.0));
    place(
        "shield",
        TubeShape::new(9.0 * WORLD_RMAX / 11.0, 9.0 * WORLD_RMAX / 10.0, 8.0 * WORLD_DZ / 10.0)
            .expect("shield")
            .into(),
        Transform::identity(),
    );
    let endcap = ConeShape::new(
        WORLD_RMAX / 20.0,
        WORLD_RMAX,
        WORLD_RMAX / 20.0,
        WORLD_RMAX / 10.0,
        WORLD_DZ / 10.0,
    )
    .expect("endcap");
    place("endcap1", endcap.into(), Transform::new(0.0, 0.0, -0.9 * WORLD_DZ, 0.0, 0.0, 0.0));
    place("endcap2", endcap.into(), Transform::new(0.0, 0.0, 0.9 * WORLD_DZ, 0.0, 180.0, 0.0));
    (tree, world)
}

/// Uniform direction on the unit sphere.
pub fn random_dir(rng: &mut StdRng) -> Vec3 {
    let z: Precision = rng.gen_range(-1.0..1.0);
    let phi: Precision = rng.gen_range(0.0..core::f64::consts::TAU as Precision);
    let r = (1.0 - z * z).sqrt();
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// `n` points inside `world` but outside all of its daughters, with
/// directions of which roughly `bias` point at a random daughter's centre.
pub fn sample_world(
    tree: &GeometryTree,
    world: VolumeId,
    n: usize,
    bias: f64,
    rng: &mut StdRng,
) -> (Vec<Vec3>, Vec<Vec3>) {
    let node = &tree[world];
    let extent = node.shape().bounding_half_extents();
    let mut points = Vec::with_capacity(n);
    let mut dirs = Vec::with_capacity(n);
    while points.len() < n {
        let p = Vec3::new(
            rng.gen_range(-extent.x()..extent.x()),
            rng.gen_range(-extent.y()..extent.y()),
            rng.gen_range(-extent.z()..extent.z()),
        );
        if !node.unplaced_contains(p) || node.daughters().iter().any(|&d| tree[d].contains(p).is_some()) {
            continue;
        }
        let daughters = node.daughters();
        let dir = if !daughters.is_empty() && rng.gen_bool(bias) {
            let target = daughters[rng.gen_range(0..daughters.len())];
            let centre = tree[target].transform().apply_inverse(Vec3::ZERO);
            let to = centre - p;
            if to.length() > 0.0 {
                to.normalize()
            } else {
                random_dir(rng)
            }
        } else {
            random_dir(rng)
        };
        points.push(p);
        dirs.push(dir);
    }
    (points, dirs)
}
