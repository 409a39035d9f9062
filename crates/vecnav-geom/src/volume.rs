// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Arena-backed tree of placed volumes.
//!
//! The [`GeometryTree`] owns every [`VolumeNode`]. Nodes refer to their
//! daughters and parent by [`VolumeId`], so paths and navigators only ever
//! hold indices into the arena. Placements are fixed once built; the tree is
//! read-only during navigation and can be shared across threads freely.

use core::fmt;
use core::ops::Index;

use tracing::debug;
use vecnav_core::{Precision, Scalar, Transform, Vec3};

use crate::error::GeometryError;
use crate::shapes::{Shape, ShapeKernel};

/// Index of a volume inside its [`GeometryTree`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VolumeId(u32);

impl VolumeId {
    /// Arena slot of this id.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    fn for_slot(slot: usize) -> Result<Self, GeometryError> {
        u32::try_from(slot).map(Self).map_err(|_| GeometryError::TooManyVolumes { len: slot })
    }
}

impl fmt::Display for VolumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A shape placed in its parent's frame, plus its ordered daughters.
///
/// Daughter order is traversal priority: when daughters overlap (invalid
/// geometry) the first one in order wins.
#[derive(Debug, Clone)]
pub struct VolumeNode {
    id: VolumeId,
    name: String,
    shape: Shape,
    transform: Transform,
    daughters: Vec<VolumeId>,
    parent: Option<VolumeId>,
}

impl VolumeNode {
    /// Id of this node.
    pub fn id(&self) -> VolumeId {
        self.id
    }

    /// Human-readable label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shape in the node's own frame.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Placement: maps parent-frame coordinates into this node's frame.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Daughters in traversal order.
    pub fn daughters(&self) -> &[VolumeId] {
        &self.daughters
    }

    /// Enclosing volume, if placed.
    pub fn parent(&self) -> Option<VolumeId> {
        self.parent
    }

    /// Whether the node has no daughters.
    pub fn is_leaf(&self) -> bool {
        self.daughters.is_empty()
    }

    /// Containment of a point already in this node's frame.
    pub fn unplaced_contains(&self, local: Vec3) -> bool {
        self.shape.contains::<Scalar>(&local)
    }

    /// Containment of a parent-frame point; returns the local point on success.
    pub fn contains(&self, point: Vec3) -> Option<Vec3> {
        let local = self.transform.apply(point);
        self.unplaced_contains(local).then_some(local)
    }

    /// Distance to enter this node along a parent-frame ray.
    pub fn distance_to_in(&self, point: Vec3, dir: Vec3, step_max: Precision) -> Precision {
        let local = self.transform.apply(point);
        let local_dir = self.transform.apply_rotation(dir);
        self.shape.distance_to_in::<Scalar>(&local, &local_dir, step_max)
    }

    /// Distance to leave this node along a ray in its own frame.
    pub fn distance_to_out(&self, local: Vec3, local_dir: Vec3, step_max: Precision) -> Precision {
        self.shape.distance_to_out::<Scalar>(&local, &local_dir, step_max)
    }
}

/// Owner of every volume node.
#[derive(Debug, Clone, Default)]
pub struct GeometryTree {
    nodes: Vec<VolumeNode>,
    root: Option<VolumeId>,
}

impl GeometryTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an unplaced volume and returns its id.
    ///
    /// Fails with [`GeometryError::TooManyVolumes`] once every `u32` id is in
    /// use.
    pub fn add_volume(
        &mut self,
        name: impl Into<String>,
        shape: impl Into<Shape>,
        transform: Transform,
    ) -> Result<VolumeId, GeometryError> {
        let id = VolumeId::for_slot(self.nodes.len())?;
        let node = VolumeNode {
            id,
            name: name.into(),
            shape: shape.into(),
            transform,
            daughters: Vec::new(),
            parent: None,
        };
        debug!(%id, name = %node.name, shape = %node.shape, "add volume");
        self.nodes.push(node);
        Ok(id)
    }

    /// Appends `child` to the daughters of `parent`.
    ///
    /// Rejects unknown ids, placing a volume inside itself or one of its
    /// descendants, and placing a volume that already has a parent.
    pub fn place_daughter(&mut self, parent: VolumeId, child: VolumeId) -> Result<(), GeometryError> {
        self.node(parent)?;
        if let Some(existing) = self.node(child)?.parent {
            return Err(GeometryError::AlreadyPlaced { child, parent: existing });
        }
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(GeometryError::Cycle { parent, child });
            }
            cursor = self.nodes[id.index()].parent;
        }
        self.nodes[parent.index()].daughters.push(child);
        self.nodes[child.index()].parent = Some(parent);
        debug!(%parent, %child, "place daughter");
        Ok(())
    }

    /// Marks `id` as the world volume.
    pub fn set_root(&mut self, id: VolumeId) -> Result<(), GeometryError> {
        self.node(id)?;
        self.root = Some(id);
        Ok(())
    }

    /// World volume, if set.
    pub fn root(&self) -> Option<VolumeId> {
        self.root
    }

    /// World volume, or [`GeometryError::NoRoot`].
    pub fn require_root(&self) -> Result<VolumeId, GeometryError> {
        self.root.ok_or(GeometryError::NoRoot)
    }

    /// Node for `id`.
    pub fn node(&self, id: VolumeId) -> Result<&VolumeNode, GeometryError> {
        self.nodes.get(id.index()).ok_or(GeometryError::UnknownVolume(id))
    }

    /// Daughters of `id` in traversal order.
    pub fn daughters(&self, id: VolumeId) -> Result<&[VolumeId], GeometryError> {
        Ok(self.node(id)?.daughters())
    }

    /// Parent of `id`, if placed.
    pub fn parent(&self, id: VolumeId) -> Result<Option<VolumeId>, GeometryError> {
        Ok(self.node(id)?.parent())
    }

    /// Number of volumes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no volumes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &VolumeNode> {
        self.nodes.iter()
    }

    /// First volume named `name`.
    pub fn find_by_name(&self, name: &str) -> Option<VolumeId> {
        self.nodes.iter().find(|n| n.name == name).map(|n| n.id)
    }

    /// Number of levels from the root to its deepest leaf; the path
    /// capacity needed to locate any point.
    pub fn max_depth(&self) -> Result<usize, GeometryError> {
        let root = self.require_root()?;
        let mut deepest = 0;
        let mut stack = vec![(root, 1_usize)];
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(self.nodes[id.index()].daughters.iter().map(|&d| (d, depth + 1)));
        }
        Ok(deepest)
    }
}

/// Panics on ids that do not belong to this tree; use
/// [`GeometryTree::node`] for ids from outside.
impl Index<VolumeId> for GeometryTree {
    type Output = VolumeNode;

    fn index(&self, id: VolumeId) -> &VolumeNode {
        &self.nodes[id.index()]
    }
}
