// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Affine placement of a volume inside its parent's frame.
//!
//! A [`Transform`] stores a translation `t` and a row-major 3×3 rotation `R`.
//! The placement maps local coordinates to parent coordinates as
//! `parent = R·local + t`; [`Transform::apply`] is the inverse direction
//! (`local = Rᵀ·(parent − t)`), which is what navigation needs.
//!
//! Classification:
//! - `rotation_code` packs "entry `i` is non-zero" into bit `i` for the nine
//!   matrix entries. The exact identity collapses to [`rotation::IDENTITY`].
//! - `translation_code` is [`translation::ORIGIN`] or
//!   [`translation::TRANSLATION`].
//!
//! Codes are recomputed by every constructor and setter. [`TransformKernel`]
//! maps a code pair to routines that skip the zero entries; unlisted pairs
//! use the generic 3×3 routine. Both paths evaluate the same sums in the same
//! order, so they agree to the last bit apart from the sign of exact zeros.

use core::fmt;

use crate::backend::{splat3, Backend, Scalar};
use crate::math::{deg_to_rad, Precision, Soa3, Vec3, Vector3};

/// Bitmask over the zero/non-zero pattern of the rotation matrix.
pub type RotationCode = u16;

/// Origin (0) or translated (1).
pub type TranslationCode = u8;

/// Well-known rotation codes.
pub mod rotation {
    use super::RotationCode;

    /// Only the diagonal entries are non-zero.
    pub const DIAGONAL: RotationCode = 0x111;
    /// Reserved value for the exact identity matrix.
    pub const IDENTITY: RotationCode = 0x200;
    /// Every entry non-zero; also the code of the generic routine.
    pub const GENERIC: RotationCode = 0x1ff;
    /// Codes with a dedicated routine (permutations and single-axis
    /// rotations, plus the identity).
    pub const SPECIALIZED: [RotationCode; 16] = [
        0x1b1, 0x18e, 0x076, 0x16a, 0x155, 0x0ad, 0x0dc, 0x0e3, 0x11b, 0x0a1, 0x10a, 0x046, 0x062,
        0x054, 0x111, 0x200,
    ];
}

/// Translation codes.
pub mod translation {
    use super::TranslationCode;

    /// No translation.
    pub const ORIGIN: TranslationCode = 0;
    /// Non-zero translation.
    pub const TRANSLATION: TranslationCode = 1;
}

/// Rigid placement with cached classification.
///
/// Invariants:
/// - `has_translation`, `has_rotation`, `identity`, `rotation_code` and
///   `translation_code` always describe the current `trans`/`rot` values.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    trans: [Precision; 3],
    rot: [Precision; 9],
    has_translation: bool,
    has_rotation: bool,
    identity: bool,
    rotation_code: RotationCode,
    translation_code: TranslationCode,
}

const IDENTITY_ROT: [Precision; 9] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Identity placement.
    pub fn identity() -> Self {
        Self::from_matrix(Vec3::ZERO, IDENTITY_ROT)
    }

    /// Translation followed by an Euler rotation `(phi, theta, psi)` in
    /// degrees (z-x-z convention).
    pub fn new(
        tx: Precision,
        ty: Precision,
        tz: Precision,
        phi: Precision,
        theta: Precision,
        psi: Precision,
    ) -> Self {
        let mut t = Self::identity();
        t.trans = [tx, ty, tz];
        t.rot = euler_matrix(phi, theta, psi);
        t.set_properties();
        t
    }

    /// Pure translation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self::from_matrix(translation, IDENTITY_ROT)
    }

    /// Translation plus an explicit row-major rotation matrix.
    pub fn from_matrix(translation: Vec3, rot: [Precision; 9]) -> Self {
        let mut t = Self {
            trans: translation.to_array(),
            rot,
            has_translation: false,
            has_rotation: false,
            identity: true,
            rotation_code: rotation::IDENTITY,
            translation_code: translation::ORIGIN,
        };
        t.set_properties();
        t
    }

    /// Replaces the translation.
    pub fn set_translation(&mut self, translation: Vec3) {
        self.trans = translation.to_array();
        self.set_properties();
    }

    /// Replaces the rotation with Euler angles in degrees.
    pub fn set_rotation_euler(&mut self, phi: Precision, theta: Precision, psi: Precision) {
        self.rot = euler_matrix(phi, theta, psi);
        self.set_properties();
    }

    /// Replaces the rotation with an explicit row-major matrix.
    pub fn set_rotation_matrix(&mut self, rot: [Precision; 9]) {
        self.rot = rot;
        self.set_properties();
    }

    fn set_properties(&mut self) {
        self.has_translation = self.trans.iter().any(|&c| c != 0.0);
        self.rotation_code = generate_rotation_code(&self.rot);
        self.has_rotation = self.rotation_code != rotation::IDENTITY;
        self.identity = !self.has_translation && !self.has_rotation;
        self.translation_code = if self.has_translation {
            translation::TRANSLATION
        } else {
            translation::ORIGIN
        };
    }

    /// Translation component.
    pub fn translation(&self) -> Vec3 {
        Vec3::from(self.trans)
    }

    /// Row-major rotation entries.
    pub fn rotation(&self) -> [Precision; 9] {
        self.rot
    }

    /// Whether the translation is non-zero.
    pub fn has_translation(&self) -> bool {
        self.has_translation
    }

    /// Whether the rotation differs from the identity.
    pub fn has_rotation(&self) -> bool {
        self.has_rotation
    }

    /// Whether this is the identity placement.
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// Rotation classification code.
    pub fn rotation_code(&self) -> RotationCode {
        self.rotation_code
    }

    /// Translation classification code.
    pub fn translation_code(&self) -> TranslationCode {
        self.translation_code
    }

    /// Parent-frame point → local point, through the specialized routine.
    pub fn apply(&self, point: Vec3) -> Vec3 {
        let kernel = TransformKernel::<Scalar>::for_transform(self);
        (kernel.apply)(self, &point)
    }

    /// Parent-frame direction → local direction (rotation only).
    pub fn apply_rotation(&self, dir: Vec3) -> Vec3 {
        let kernel = TransformKernel::<Scalar>::for_transform(self);
        (kernel.apply_rotation)(self, &dir)
    }

    /// Parent-frame point → local point through the generic 3×3 routine.
    pub fn apply_generic(&self, point: Vec3) -> Vec3 {
        apply_generic::<Scalar>(self, &point)
    }

    /// Local point → parent-frame point (`R·p + t`).
    pub fn apply_inverse(&self, point: Vec3) -> Vec3 {
        self.apply_rotation_inverse(point) + self.translation()
    }

    /// Local direction → parent-frame direction (`R·d`).
    pub fn apply_rotation_inverse(&self, dir: Vec3) -> Vec3 {
        let r = &self.rot;
        let [x, y, z] = dir.to_array();
        Vec3::new(
            r[0] * x + r[1] * y + r[2] * z,
            r[3] * x + r[4] * y + r[5] * z,
            r[6] * x + r[7] * y + r[8] * z,
        )
    }

    /// Transform equivalent to applying `other` first, then `self`.
    ///
    /// Accumulating `global = node.compose(&global)` down a path yields the
    /// mapping from the top frame into the deepest node's frame.
    pub fn compose(&self, other: &Self) -> Self {
        let a = &self.rot;
        let b = &other.rot;
        let mut rot = [0.0; 9];
        for i in 0..3 {
            for j in 0..3 {
                rot[3 * i + j] = b[3 * i] * a[j] + b[3 * i + 1] * a[3 + j] + b[3 * i + 2] * a[6 + j];
            }
        }
        let t = other.translation() + other.apply_rotation_inverse(self.translation());
        Self::from_matrix(t, rot)
    }

    /// Transform whose `apply` is this transform's `apply_inverse`.
    pub fn inverse(&self) -> Self {
        let r = &self.rot;
        let rt = [r[0], r[3], r[6], r[1], r[4], r[7], r[2], r[5], r[8]];
        let inv = Self::from_matrix(Vec3::ZERO, rt);
        Self::from_matrix(-inv.apply_rotation_inverse(self.translation()), rt)
    }

    /// Applies the transform to every point of `input`, `B::LANES` at a time.
    pub fn apply_soa<B: Backend>(&self, input: &Soa3, output: &mut Soa3) {
        let kernel = TransformKernel::<B>::for_transform(self);
        output.resize(input.len());
        for start in (0..input.len()).step_by(B::LANES) {
            let p = input.gather::<B>(start);
            output.scatter::<B>(start, &(kernel.apply)(self, &p));
        }
    }

    /// Rotates every direction of `input`, `B::LANES` at a time.
    pub fn apply_rotation_soa<B: Backend>(&self, input: &Soa3, output: &mut Soa3) {
        let kernel = TransformKernel::<B>::for_transform(self);
        output.resize(input.len());
        for start in (0..input.len()).step_by(B::LANES) {
            let d = input.gather::<B>(start);
            output.scatter::<B>(start, &(kernel.apply_rotation)(self, &d));
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.rot;
        write!(
            f,
            "Transform {{{}, ({}, {}, {}, {}, {}, {}, {}, {}, {})}}",
            self.translation(),
            r[0],
            r[1],
            r[2],
            r[3],
            r[4],
            r[5],
            r[6],
            r[7],
            r[8]
        )
    }
}

fn euler_matrix(phi: Precision, theta: Precision, psi: Precision) -> [Precision; 9] {
    let (sinphi, cosphi) = deg_to_rad(phi).sin_cos();
    let (sinthe, costhe) = deg_to_rad(theta).sin_cos();
    let (sinpsi, cospsi) = deg_to_rad(psi).sin_cos();
    [
        cospsi * cosphi - costhe * sinphi * sinpsi,
        -sinpsi * cosphi - costhe * sinphi * cospsi,
        sinthe * sinphi,
        cospsi * sinphi + costhe * cosphi * sinpsi,
        -sinpsi * sinphi + costhe * cosphi * cospsi,
        -sinthe * cosphi,
        sinpsi * sinthe,
        cospsi * sinthe,
        costhe,
    ]
}

fn generate_rotation_code(rot: &[Precision; 9]) -> RotationCode {
    let mut code: RotationCode = 0;
    for (i, &entry) in rot.iter().enumerate() {
        if entry != 0.0 {
            code |= 1 << i;
        }
    }
    if code == rotation::DIAGONAL && rot[0] == 1.0 && rot[4] == 1.0 && rot[8] == 1.0 {
        code = rotation::IDENTITY;
    }
    code
}

// ── Specialized routines ─────────────────────────────────────────────

/// Point or direction routine for backend `B`.
pub type ApplyFn<B> =
    fn(&Transform, &Vector3<<B as Backend>::Float>) -> Vector3<<B as Backend>::Float>;

#[inline]
fn accumulate<B: Backend>(acc: Option<B::Float>, term: B::Float) -> Option<B::Float> {
    Some(match acc {
        Some(a) => a + term,
        None => term,
    })
}

/// `Rᵀ·v`, skipping the entries whose bit is clear in `ROT`.
#[inline]
fn rotate_masked<B: Backend, const ROT: RotationCode>(
    rot: &[Precision; 9],
    v: &Vector3<B::Float>,
) -> Vector3<B::Float> {
    let mut out = [B::splat(0.0); 3];
    for (j, slot) in out.iter_mut().enumerate() {
        let mut acc = None;
        for i in 0..3 {
            let k = 3 * i + j;
            if ROT & (1 << k) != 0 {
                acc = accumulate::<B>(acc, v[i] * B::splat(rot[k]));
            }
        }
        if let Some(a) = acc {
            *slot = a;
        }
    }
    Vector3::from(out)
}

fn apply_specialized<B: Backend, const TRANS: TranslationCode, const ROT: RotationCode>(
    t: &Transform,
    p: &Vector3<B::Float>,
) -> Vector3<B::Float> {
    let shifted = if TRANS == translation::ORIGIN {
        *p
    } else {
        *p - splat3::<B>(&t.translation())
    };
    if ROT == rotation::IDENTITY {
        shifted
    } else {
        rotate_masked::<B, ROT>(&t.rot, &shifted)
    }
}

fn rotate_specialized<B: Backend, const ROT: RotationCode>(
    t: &Transform,
    d: &Vector3<B::Float>,
) -> Vector3<B::Float> {
    if ROT == rotation::IDENTITY {
        *d
    } else {
        rotate_masked::<B, ROT>(&t.rot, d)
    }
}

fn apply_generic<B: Backend>(t: &Transform, p: &Vector3<B::Float>) -> Vector3<B::Float> {
    rotate_masked::<B, { rotation::GENERIC }>(&t.rot, &(*p - splat3::<B>(&t.translation())))
}

fn rotate_generic<B: Backend>(t: &Transform, d: &Vector3<B::Float>) -> Vector3<B::Float> {
    rotate_masked::<B, { rotation::GENERIC }>(&t.rot, d)
}

/// Routines selected for one `(translation_code, rotation_code)` pair.
#[derive(Copy, Clone)]
pub struct TransformKernel<B: Backend> {
    /// Point routine (`Rᵀ·(p − t)`).
    pub apply: ApplyFn<B>,
    /// Direction routine (`Rᵀ·d`).
    pub apply_rotation: ApplyFn<B>,
    /// `false` when the generic fallback was selected.
    pub specialized: bool,
}

impl<B: Backend> fmt::Debug for TransformKernel<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformKernel")
            .field("specialized", &self.specialized)
            .finish_non_exhaustive()
    }
}

macro_rules! specialization_table {
    ($tc:expr, $rc:expr; $($rot:literal),* $(,)?) => {
        match ($tc, $rc) {
            $(
                (translation::ORIGIN, $rot) => Self::pair::<{ translation::ORIGIN }, $rot>(),
                (translation::TRANSLATION, $rot) => {
                    Self::pair::<{ translation::TRANSLATION }, $rot>()
                }
            )*
            _ => Self::generic(),
        }
    };
}

impl<B: Backend> TransformKernel<B> {
    fn pair<const TRANS: TranslationCode, const ROT: RotationCode>() -> Self {
        Self {
            apply: apply_specialized::<B, TRANS, ROT>,
            apply_rotation: rotate_specialized::<B, ROT>,
            specialized: true,
        }
    }

    /// The generic 3×3 routines.
    pub fn generic() -> Self {
        Self {
            apply: apply_generic::<B>,
            apply_rotation: rotate_generic::<B>,
            specialized: false,
        }
    }

    /// Looks up the routines for a code pair, falling back to the generic
    /// ones for unlisted pairs.
    pub fn select(trans_code: TranslationCode, rot_code: RotationCode) -> Self {
        specialization_table!(trans_code, rot_code;
            0x1b1, 0x18e, 0x076, 0x16a, 0x155, 0x0ad, 0x0dc, 0x0e3,
            0x11b, 0x0a1, 0x10a, 0x046, 0x062, 0x054, 0x111, 0x200,
        )
    }

    /// Routines for the codes of `t`.
    pub fn for_transform(t: &Transform) -> Self {
        Self::select(t.translation_code(), t.rotation_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_has_reserved_code_and_no_flags() {
        let t = Transform::identity();
        assert_eq!(t.rotation_code(), rotation::IDENTITY);
        assert_eq!(t.translation_code(), translation::ORIGIN);
        assert!(!t.has_rotation());
        assert!(!t.has_translation());
        assert!(t.is_identity());
    }

    #[test]
    fn setters_recompute_codes() {
        let mut t = Transform::identity();
        t.set_translation(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(t.translation_code(), translation::TRANSLATION);
        assert!(!t.is_identity());
        t.set_rotation_euler(90.0, 0.0, 0.0);
        assert!(t.has_rotation());
        assert_ne!(t.rotation_code(), rotation::IDENTITY);
        t.set_rotation_matrix(IDENTITY_ROT);
        t.set_translation(Vec3::ZERO);
        assert!(t.is_identity());
    }

    #[test]
    fn scaled_diagonal_is_not_identity() {
        let t = Transform::from_matrix(Vec3::ZERO, [2.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(t.rotation_code(), rotation::DIAGONAL);
        assert!(t.has_rotation());
    }

    #[test]
    fn listed_codes_select_specialized_routines() {
        for &code in &rotation::SPECIALIZED {
            assert!(TransformKernel::<Scalar>::select(0, code).specialized);
            assert!(TransformKernel::<Scalar>::select(1, code).specialized);
        }
        assert!(!TransformKernel::<Scalar>::select(1, rotation::GENERIC).specialized);
    }

    #[test]
    fn quarter_turn_about_z_uses_permutation_code() {
        // phi = 90 gives rows (0,-1,0), (1,0,0), (0,0,1).
        let t = Transform::new(0.0, 0.0, 0.0, 90.0, 0.0, 0.0);
        let r = t.rotation();
        let cleaned: [Precision; 9] = r.map(|v| if v.abs() < 1e-12 { 0.0 } else { v });
        let t = Transform::from_matrix(Vec3::ZERO, cleaned);
        assert_eq!(t.rotation_code(), 0x10a);
        let local = t.apply(Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(local, t.apply_generic(Vec3::new(0.0, 1.0, 0.0)));
        assert!((local.x() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn compose_matches_sequential_application() {
        let a = Transform::new(1.0, 2.0, 3.0, 30.0, 40.0, 50.0);
        let b = Transform::new(-4.0, 0.5, 2.0, 10.0, 0.0, 70.0);
        let p = Vec3::new(0.3, -1.2, 7.5);
        let sequential = a.apply(b.apply(p));
        let composed = a.compose(&b).apply(p);
        assert!(sequential.max_abs_diff(&composed) < 1e-12);
    }

    #[test]
    fn inverse_undoes_apply() {
        let t = Transform::new(5.0, -3.0, 2.0, 35.0, 20.0, 10.0);
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!(t.inverse().apply(t.apply(p)).max_abs_diff(&p) < 1e-12);
    }

    #[test]
    fn display_lists_translation_and_matrix() {
        let t = Transform::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.to_string(), "Transform {(1, 2, 3), (1, 0, 0, 0, 1, 0, 0, 0, 1)}");
    }
}
