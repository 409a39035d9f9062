// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fixed-capacity cursor recording the chain of volumes that contain a point.

use core::fmt;
use core::hash::{Hash, Hasher};

use vecnav_core::Transform;

use crate::error::{GeometryError, PathError};
use crate::volume::{GeometryTree, VolumeId};

/// Stack of volume ids from the outermost volume (level 0) down to the
/// deepest containing volume (the top).
///
/// Invariants:
/// - `level() <= max_level()`.
/// - Slots at or above `level()` are empty; `pop` clears the slot it frees,
///   so a push followed by a pop restores the exact prior state.
///
/// Equality compares depth and live entries only; capacity is ignored.
///
/// A path is a per-particle cursor. Share the tree between threads, not the
/// path.
#[derive(Debug, Clone)]
pub struct VolumePath {
    slots: Vec<Option<VolumeId>>,
    level: usize,
}

impl VolumePath {
    /// Creates an empty path able to hold `max_level` volumes.
    pub fn new(max_level: usize) -> Self {
        Self { slots: vec![None; max_level], level: 0 }
    }

    /// Pushes `id` as the new top.
    pub fn push(&mut self, id: VolumeId) -> Result<(), PathError> {
        if self.level >= self.slots.len() {
            return Err(PathError::CapacityExceeded { max_level: self.max_level() });
        }
        self.slots[self.level] = Some(id);
        self.level += 1;
        Ok(())
    }

    /// Removes and returns the top, clearing its slot.
    pub fn pop(&mut self) -> Option<VolumeId> {
        if self.level == 0 {
            return None;
        }
        self.level -= 1;
        self.slots[self.level].take()
    }

    /// Deepest volume on the path.
    pub fn top(&self) -> Option<VolumeId> {
        self.level.checked_sub(1).and_then(|i| self.slots[i])
    }

    /// Volume at `index` (0 is the outermost).
    pub fn at(&self, index: usize) -> Result<VolumeId, PathError> {
        self.live()
            .get(index)
            .copied()
            .flatten()
            .ok_or(PathError::IndexOutOfRange { index, level: self.level })
    }

    /// Replaces the volume at a live `index`.
    pub fn set_at(&mut self, index: usize, id: VolumeId) -> Result<(), PathError> {
        if index >= self.level {
            return Err(PathError::IndexOutOfRange { index, level: self.level });
        }
        self.slots[index] = Some(id);
        Ok(())
    }

    /// Current depth.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Capacity.
    pub fn max_level(&self) -> usize {
        self.slots.len()
    }

    /// Pops everything.
    pub fn clear(&mut self) {
        self.slots[..self.level].fill(None);
        self.level = 0;
    }

    /// Whether the path is empty.
    pub fn is_empty(&self) -> bool {
        self.level == 0
    }

    /// Live volumes from the outermost inward.
    pub fn iter(&self) -> impl Iterator<Item = VolumeId> + '_ {
        self.live().iter().flatten().copied()
    }

    fn live(&self) -> &[Option<VolumeId>] {
        &self.slots[..self.level]
    }

    /// Number of pops plus pushes that turn `self` into `other`.
    pub fn distance(&self, other: &Self) -> usize {
        let common = self.iter().zip(other.iter()).take_while(|(a, b)| a == b).count();
        (self.level - common) + (other.level - common)
    }

    /// Transform from the frame of the outermost volume on the path into the
    /// frame of the top volume.
    ///
    /// The outermost volume's own placement is not part of it: its frame is
    /// the frame the path was located in.
    pub fn global_transform(&self, tree: &GeometryTree) -> Result<Transform, GeometryError> {
        let mut global = Transform::identity();
        for id in self.iter().skip(1) {
            global = tree.node(id)?.transform().compose(&global);
        }
        Ok(global)
    }

    /// Formats the path with volume names, `/world/daughter` style.
    pub fn display<'a>(&'a self, tree: &'a GeometryTree) -> NamedPath<'a> {
        NamedPath { path: self, tree }
    }
}

impl PartialEq for VolumePath {
    fn eq(&self, other: &Self) -> bool {
        self.live() == other.live()
    }
}

impl Eq for VolumePath {}

impl Hash for VolumePath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.live().hash(state);
    }
}

impl fmt::Display for VolumePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("/");
        }
        for id in self.iter() {
            write!(f, "/{id}")?;
        }
        Ok(())
    }
}

/// [`VolumePath`] formatter that resolves names through a tree.
#[derive(Debug, Clone, Copy)]
pub struct NamedPath<'a> {
    path: &'a VolumePath,
    tree: &'a GeometryTree,
}

impl fmt::Display for NamedPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return f.write_str("/");
        }
        for id in self.path.iter() {
            match self.tree.node(id) {
                Ok(node) => write!(f, "/{}", node.name())?,
                Err(_) => write!(f, "/{id}")?,
            }
        }
        Ok(())
    }
}
