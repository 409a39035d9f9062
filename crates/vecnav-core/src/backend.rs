// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Execution backends for shape and transform kernels.
//!
//! A kernel is written once against [`Backend`] and instantiated per backend:
//! - [`Scalar`]: one point per call, `bool` masks, early return allowed.
//! - [`Lanes<N>`]: `N` points per call on plain arrays (portable).
//! - [`Wide`]: hardware SIMD lanes from the `wide` crate.
//!
//! Conformance contract: for identical inputs every backend yields
//! bit-identical per-lane results. Backends therefore only expose IEEE
//! operations that round identically lane by lane (`+ - * /`, `sqrt`, `abs`,
//! ordered comparisons and blends). `min`/`max` are derived from `lt`/`select`
//! so NaN handling cannot differ between backends.

use core::fmt::Debug;
use core::ops::{Add, BitAnd, BitOr, Div, Mul, Neg, Not, Sub};

use wide::{CmpEq, CmpGe, CmpGt, CmpLe, CmpLt};

use crate::math::{Precision, Vector3};

/// Lane-parallel numeric capability used by every kernel.
pub trait Backend: Copy + Debug + Send + Sync + 'static {
    /// One float per lane.
    type Float: Copy
        + Debug
        + Add<Output = Self::Float>
        + Sub<Output = Self::Float>
        + Mul<Output = Self::Float>
        + Div<Output = Self::Float>
        + Neg<Output = Self::Float>;

    /// One boolean per lane.
    type Bool: Copy
        + Debug
        + BitAnd<Output = Self::Bool>
        + BitOr<Output = Self::Bool>
        + Not<Output = Self::Bool>;

    /// Number of points processed per call.
    const LANES: usize;

    /// Whether kernels may stop as soon as the outcome is certain.
    ///
    /// Only sound when there is a single lane; lane backends evaluate every
    /// test and reduce the masks instead.
    const EARLY_RETURN: bool;

    /// Broadcasts a scalar into every lane.
    fn splat(v: Precision) -> Self::Float;

    /// Loads exactly `LANES` values.
    fn load(src: &[Precision]) -> Self::Float;

    /// Stores exactly `LANES` values.
    fn store(v: Self::Float, dst: &mut [Precision]);

    /// Stores exactly `LANES` mask values.
    fn store_mask(m: Self::Bool, dst: &mut [bool]);

    /// Broadcasts a boolean into every lane.
    fn mask(b: bool) -> Self::Bool;

    /// Absolute value.
    fn abs(v: Self::Float) -> Self::Float;

    /// Square root.
    fn sqrt(v: Self::Float) -> Self::Float;

    /// `a < b`
    fn lt(a: Self::Float, b: Self::Float) -> Self::Bool;

    /// `a <= b`
    fn le(a: Self::Float, b: Self::Float) -> Self::Bool;

    /// `a > b`
    fn gt(a: Self::Float, b: Self::Float) -> Self::Bool;

    /// `a >= b`
    fn ge(a: Self::Float, b: Self::Float) -> Self::Bool;

    /// Per-lane `if mask { t } else { f }`.
    fn select(mask: Self::Bool, t: Self::Float, f: Self::Float) -> Self::Float;

    /// True when every lane is set.
    fn all(m: Self::Bool) -> bool;

    /// True when any lane is set.
    fn any(m: Self::Bool) -> bool;

    /// Lane-wise minimum; `b` wins ties and unordered pairs.
    #[inline]
    fn min(a: Self::Float, b: Self::Float) -> Self::Float {
        Self::select(Self::lt(a, b), a, b)
    }

    /// Lane-wise maximum; `b` wins ties and unordered pairs.
    #[inline]
    fn max(a: Self::Float, b: Self::Float) -> Self::Float {
        Self::select(Self::gt(a, b), a, b)
    }

    /// Overwrites `dst` with `src` on the lanes selected by `mask`.
    #[inline]
    fn masked_assign(mask: Self::Bool, src: Self::Float, dst: &mut Self::Float) {
        *dst = Self::select(mask, src, *dst);
    }
}

/// Loads `LANES` values starting at `start`, repeating the last value of
/// `src` to pad a short tail.
pub fn load_padded<B: Backend>(src: &[Precision], start: usize) -> B::Float {
    let end = start + B::LANES;
    if end <= src.len() {
        return B::load(&src[start..end]);
    }
    let pad = src.last().copied().unwrap_or(0.0);
    let mut buf = vec![pad; B::LANES];
    let avail = src.len().saturating_sub(start);
    buf[..avail].copy_from_slice(&src[start..]);
    B::load(&buf)
}

/// Stores the lanes of `v` that fit in `dst` starting at `start`.
pub fn store_partial<B: Backend>(v: B::Float, dst: &mut [Precision], start: usize) {
    let end = start + B::LANES;
    if end <= dst.len() {
        B::store(v, &mut dst[start..end]);
        return;
    }
    let mut buf = vec![0.0; B::LANES];
    B::store(v, &mut buf);
    let avail = dst.len().saturating_sub(start);
    dst[start..].copy_from_slice(&buf[..avail]);
}

/// Extracts the lanes of `m` that fit in `dst` starting at `start`.
pub fn store_mask_partial<B: Backend>(m: B::Bool, dst: &mut [bool], start: usize) {
    let end = start + B::LANES;
    if end <= dst.len() {
        B::store_mask(m, &mut dst[start..end]);
        return;
    }
    let mut buf = vec![false; B::LANES];
    B::store_mask(m, &mut buf);
    let avail = dst.len().saturating_sub(start);
    dst[start..].copy_from_slice(&buf[..avail]);
}

/// Broadcasts a scalar vector into every lane.
pub fn splat3<B: Backend>(v: &Vector3<Precision>) -> Vector3<B::Float> {
    v.map(B::splat)
}

// ── Scalar ───────────────────────────────────────────────────────────

/// Single-lane backend with early return.
#[derive(Debug, Copy, Clone, Default)]
pub struct Scalar;

impl Backend for Scalar {
    type Float = Precision;
    type Bool = bool;

    const LANES: usize = 1;
    const EARLY_RETURN: bool = true;

    #[inline]
    fn splat(v: Precision) -> Precision {
        v
    }

    #[inline]
    fn load(src: &[Precision]) -> Precision {
        src[0]
    }

    #[inline]
    fn store(v: Precision, dst: &mut [Precision]) {
        dst[0] = v;
    }

    #[inline]
    fn store_mask(m: bool, dst: &mut [bool]) {
        dst[0] = m;
    }

    #[inline]
    fn mask(b: bool) -> bool {
        b
    }

    #[inline]
    fn abs(v: Precision) -> Precision {
        v.abs()
    }

    #[inline]
    fn sqrt(v: Precision) -> Precision {
        v.sqrt()
    }

    #[inline]
    fn lt(a: Precision, b: Precision) -> bool {
        a < b
    }

    #[inline]
    fn le(a: Precision, b: Precision) -> bool {
        a <= b
    }

    #[inline]
    fn gt(a: Precision, b: Precision) -> bool {
        a > b
    }

    #[inline]
    fn ge(a: Precision, b: Precision) -> bool {
        a >= b
    }

    #[inline]
    fn select(mask: bool, t: Precision, f: Precision) -> Precision {
        if mask {
            t
        } else {
            f
        }
    }

    #[inline]
    fn all(m: bool) -> bool {
        m
    }

    #[inline]
    fn any(m: bool) -> bool {
        m
    }
}

// ── Portable lanes ───────────────────────────────────────────────────

/// Portable `N`-wide backend over plain arrays.
#[derive(Debug, Copy, Clone, Default)]
pub struct Lanes<const N: usize>;

/// `N` floats, one per lane.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LaneFloat<const N: usize>(pub [Precision; N]);

/// `N` booleans, one per lane.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LaneMask<const N: usize>(pub [bool; N]);

macro_rules! lane_binop {
    ($ty:ident, $trait:ident, $method:ident, $op:tt) => {
        impl<const N: usize> $trait for $ty<N> {
            type Output = Self;

            #[inline]
            fn $method(self, rhs: Self) -> Self {
                Self(core::array::from_fn(|i| self.0[i] $op rhs.0[i]))
            }
        }
    };
}

lane_binop!(LaneFloat, Add, add, +);
lane_binop!(LaneFloat, Sub, sub, -);
lane_binop!(LaneFloat, Mul, mul, *);
lane_binop!(LaneFloat, Div, div, /);
lane_binop!(LaneMask, BitAnd, bitand, &);
lane_binop!(LaneMask, BitOr, bitor, |);

impl<const N: usize> Neg for LaneFloat<N> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(self.0.map(|v| -v))
    }
}

impl<const N: usize> Not for LaneMask<N> {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        Self(self.0.map(|v| !v))
    }
}

#[inline]
fn lane_cmp<const N: usize>(
    a: LaneFloat<N>,
    b: LaneFloat<N>,
    f: impl Fn(Precision, Precision) -> bool,
) -> LaneMask<N> {
    LaneMask(core::array::from_fn(|i| f(a.0[i], b.0[i])))
}

impl<const N: usize> Backend for Lanes<N> {
    type Float = LaneFloat<N>;
    type Bool = LaneMask<N>;

    const LANES: usize = N;
    const EARLY_RETURN: bool = false;

    #[inline]
    fn splat(v: Precision) -> LaneFloat<N> {
        LaneFloat([v; N])
    }

    #[inline]
    fn load(src: &[Precision]) -> LaneFloat<N> {
        LaneFloat(core::array::from_fn(|i| src[i]))
    }

    #[inline]
    fn store(v: LaneFloat<N>, dst: &mut [Precision]) {
        dst[..N].copy_from_slice(&v.0);
    }

    #[inline]
    fn store_mask(m: LaneMask<N>, dst: &mut [bool]) {
        dst[..N].copy_from_slice(&m.0);
    }

    #[inline]
    fn mask(b: bool) -> LaneMask<N> {
        LaneMask([b; N])
    }

    #[inline]
    fn abs(v: LaneFloat<N>) -> LaneFloat<N> {
        LaneFloat(v.0.map(Precision::abs))
    }

    #[inline]
    fn sqrt(v: LaneFloat<N>) -> LaneFloat<N> {
        LaneFloat(v.0.map(Precision::sqrt))
    }

    #[inline]
    fn lt(a: LaneFloat<N>, b: LaneFloat<N>) -> LaneMask<N> {
        lane_cmp(a, b, |x, y| x < y)
    }

    #[inline]
    fn le(a: LaneFloat<N>, b: LaneFloat<N>) -> LaneMask<N> {
        lane_cmp(a, b, |x, y| x <= y)
    }

    #[inline]
    fn gt(a: LaneFloat<N>, b: LaneFloat<N>) -> LaneMask<N> {
        lane_cmp(a, b, |x, y| x > y)
    }

    #[inline]
    fn ge(a: LaneFloat<N>, b: LaneFloat<N>) -> LaneMask<N> {
        lane_cmp(a, b, |x, y| x >= y)
    }

    #[inline]
    fn select(mask: LaneMask<N>, t: LaneFloat<N>, f: LaneFloat<N>) -> LaneFloat<N> {
        LaneFloat(core::array::from_fn(|i| if mask.0[i] { t.0[i] } else { f.0[i] }))
    }

    #[inline]
    fn all(m: LaneMask<N>) -> bool {
        m.0.iter().all(|&b| b)
    }

    #[inline]
    fn any(m: LaneMask<N>) -> bool {
        m.0.iter().any(|&b| b)
    }
}

// ── Hardware SIMD ────────────────────────────────────────────────────

/// SIMD register type used by [`Wide`].
#[cfg(not(feature = "float_precision"))]
pub type WideFloat = wide::f64x4;

/// SIMD register type used by [`Wide`].
#[cfg(feature = "float_precision")]
pub type WideFloat = wide::f32x4;

/// Four-lane hardware SIMD backend.
///
/// Masks are carried in the float register (all-ones lanes are true), as the
/// `wide` comparison operations produce them.
#[derive(Debug, Copy, Clone, Default)]
pub struct Wide;

const WIDE_LANES: usize = 4;

impl Backend for Wide {
    type Float = WideFloat;
    type Bool = WideFloat;

    const LANES: usize = WIDE_LANES;
    const EARLY_RETURN: bool = false;

    #[inline]
    fn splat(v: Precision) -> WideFloat {
        WideFloat::splat(v)
    }

    #[inline]
    fn load(src: &[Precision]) -> WideFloat {
        let mut lanes = [0.0; WIDE_LANES];
        lanes.copy_from_slice(&src[..WIDE_LANES]);
        WideFloat::from(lanes)
    }

    #[inline]
    fn store(v: WideFloat, dst: &mut [Precision]) {
        dst[..WIDE_LANES].copy_from_slice(&v.to_array());
    }

    #[inline]
    fn store_mask(m: WideFloat, dst: &mut [bool]) {
        for (out, lane) in dst[..WIDE_LANES].iter_mut().zip(m.to_array()) {
            *out = lane.to_bits() != 0;
        }
    }

    #[inline]
    fn mask(b: bool) -> WideFloat {
        if b {
            WideFloat::ZERO.cmp_eq(WideFloat::ZERO)
        } else {
            WideFloat::ZERO
        }
    }

    #[inline]
    fn abs(v: WideFloat) -> WideFloat {
        v.abs()
    }

    #[inline]
    fn sqrt(v: WideFloat) -> WideFloat {
        v.sqrt()
    }

    #[inline]
    fn lt(a: WideFloat, b: WideFloat) -> WideFloat {
        a.cmp_lt(b)
    }

    #[inline]
    fn le(a: WideFloat, b: WideFloat) -> WideFloat {
        a.cmp_le(b)
    }

    #[inline]
    fn gt(a: WideFloat, b: WideFloat) -> WideFloat {
        a.cmp_gt(b)
    }

    #[inline]
    fn ge(a: WideFloat, b: WideFloat) -> WideFloat {
        a.cmp_ge(b)
    }

    #[inline]
    fn select(mask: WideFloat, t: WideFloat, f: WideFloat) -> WideFloat {
        mask.blend(t, f)
    }

    #[inline]
    fn all(m: WideFloat) -> bool {
        m.all()
    }

    #[inline]
    fn any(m: WideFloat) -> bool {
        m.any()
    }
}
