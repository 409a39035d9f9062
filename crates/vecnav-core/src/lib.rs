// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! vecnav-core: numeric foundation for the vecnav navigation engine.
//!
//! This crate provides:
//! - `Precision` and the numeric sentinels shared by every kernel.
//! - `Vector3<T>` (scalar `Vec3` or lane bundles) and the `Soa3` batch layout.
//! - Execution backends (`Scalar`, `Lanes<N>`, `Wide`) behind one `Backend`
//!   trait so every shape kernel is written once.
//! - `Transform` with its rotation/translation classification codes and the
//!   table that maps a code pair to a specialized routine.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::many_single_char_names,
    clippy::module_name_repetitions
)]

/// Execution backends (scalar, portable lanes, hardware SIMD).
pub mod backend;
/// Precision, sentinels, vectors and structure-of-arrays buffers.
pub mod math;
/// Affine placements with classification codes and specialized dispatch.
pub mod transform;

pub use backend::{Backend, Lanes, Scalar, Wide};
pub use math::{Precision, Soa3, Vec3, Vector3, INFINITY, TINY, TOLERANCE};
pub use transform::{RotationCode, Transform, TransformKernel, TranslationCode};
