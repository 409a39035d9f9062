// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! vecnav-geom: shapes, volume hierarchy and navigation.
//!
//! This crate provides:
//! - Shape kernels (`BoxShape`, `TubeShape`, `ConeShape`) implementing the
//!   backend-generic `ShapeKernel` contract.
//! - `GeometryTree`, an arena of placed volumes addressed by `VolumeId`.
//! - `VolumePath`, the fixed-capacity cursor recording containing volumes.
//! - `Navigator`: point location, relocation and next-boundary distances,
//!   single-point and batched.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

/// Navigator configuration.
pub mod config;
/// Error types.
pub mod error;
/// Point location and boundary queries.
pub mod navigator;
/// Volume path cursor.
pub mod path;
/// Shape descriptors and kernels.
pub mod shapes;
/// Geometry tree and volume nodes.
pub mod volume;

pub use config::NavigatorConfig;
pub use error::{ConfigError, GeometryError, NavError, PathError};
pub use navigator::{Location, Navigator, Step};
pub use path::VolumePath;
pub use shapes::{BoxShape, ConeShape, Shape, ShapeKernel, ShapeKind, TubeShape};
pub use volume::{GeometryTree, VolumeId, VolumeNode};
