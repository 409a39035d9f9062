// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error types for geometry construction, path handling and navigation.
//!
//! Only precondition faults are errors. A ray that hits nothing or a point
//! outside the world is a normal outcome and is reported as a value
//! (`INFINITY` or `None`).

use thiserror::Error;

use crate::volume::VolumeId;

/// Failures while building or querying the geometry tree.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    /// The id does not refer to a volume of this tree.
    #[error("unknown volume {0}")]
    UnknownVolume(VolumeId),
    /// Shape dimensions are out of range.
    #[error("invalid {kind} dimensions: {reason}")]
    InvalidDimensions {
        /// Shape kind being constructed.
        kind: &'static str,
        /// What was wrong.
        reason: String,
    },
    /// The child is already placed inside a parent.
    #[error("volume {child} is already placed in {parent}")]
    AlreadyPlaced {
        /// Volume being placed again.
        child: VolumeId,
        /// Its existing parent.
        parent: VolumeId,
    },
    /// Placing the child would make a volume its own ancestor.
    #[error("placing {child} in {parent} would create a cycle")]
    Cycle {
        /// Prospective parent.
        parent: VolumeId,
        /// Prospective child.
        child: VolumeId,
    },
    /// The tree has no root volume.
    #[error("geometry tree has no root volume")]
    NoRoot,
    /// The arena already holds one volume per `u32` id.
    #[error("geometry tree is full ({len} volumes)")]
    TooManyVolumes {
        /// Volumes already in the tree.
        len: usize,
    },
}

/// Failures of [`crate::VolumePath`] operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    /// A push would exceed the fixed capacity.
    #[error("path capacity {max_level} exceeded")]
    CapacityExceeded {
        /// Capacity of the path.
        max_level: usize,
    },
    /// The level is at or above the current depth.
    #[error("level {index} out of range for path of depth {level}")]
    IndexOutOfRange {
        /// Requested level.
        index: usize,
        /// Current depth.
        level: usize,
    },
}

/// Failures of navigator queries.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NavError {
    /// Geometry precondition violated.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    /// Path precondition violated.
    #[error(transparent)]
    Path(#[from] PathError),
    /// Parallel input/output arrays differ in length.
    #[error("array length mismatch: expected {expected}, found {found}")]
    LengthMismatch {
        /// Length of the point batch.
        expected: usize,
        /// Length of the offending array.
        found: usize,
    },
    /// A step query started from an empty path.
    #[error("path is empty")]
    EmptyPath,
}

/// Failures while loading a navigator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed JSON or wrong field types.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// A value parsed but is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}
