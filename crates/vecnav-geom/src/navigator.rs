// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Point location and next-boundary queries over a [`GeometryTree`].
//!
//! The navigator is stateless apart from its configuration; the caller's
//! [`VolumePath`] is the only cursor carried between queries, so one
//! navigator can serve many particles (each with its own path) in parallel.

use tracing::{debug, instrument, trace};
use vecnav_core::backend::{load_padded, store_mask_partial, store_partial};
use vecnav_core::{Backend, Precision, Soa3, TransformKernel, Vec3, INFINITY};

use crate::config::NavigatorConfig;
use crate::error::{GeometryError, NavError};
use crate::path::VolumePath;
use crate::shapes::ShapeKernel;
use crate::volume::{GeometryTree, VolumeId};

/// Result of a point location: the deepest containing volume and the point
/// in that volume's frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Location {
    /// Deepest volume containing the point.
    pub volume: VolumeId,
    /// The point in `volume`'s frame.
    pub local: Vec3,
}

/// Outcome of [`Navigator::find_next_boundary_and_step`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Step {
    /// Distance to the boundary, or [`INFINITY`] when none lies within the step.
    pub distance: Precision,
    /// Position after the step, in the frame of the path's outermost volume.
    pub point: Vec3,
    /// Volume whose boundary was hit: the starting volume when leaving it,
    /// a daughter when entering one.
    pub boundary: Option<VolumeId>,
    /// Volume containing the new position; `None` once it left the world.
    pub next: Option<VolumeId>,
}

/// Lane count per rayon task; a multiple of every backend width.
#[cfg(feature = "parallel")]
const PAR_CHUNK: usize = 512;

/// Query engine bound to one tree.
#[derive(Debug, Clone, Copy)]
pub struct Navigator<'g> {
    tree: &'g GeometryTree,
    config: NavigatorConfig,
}

impl<'g> Navigator<'g> {
    /// Navigator with default configuration.
    pub fn new(tree: &'g GeometryTree) -> Self {
        Self::with_config(tree, NavigatorConfig::default())
    }

    /// Navigator with explicit configuration.
    pub fn with_config(tree: &'g GeometryTree, config: NavigatorConfig) -> Self {
        Self { tree, config }
    }

    /// The tree being navigated.
    pub fn tree(&self) -> &'g GeometryTree {
        self.tree
    }

    /// Active configuration.
    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Empty path sized for this tree (or `max_depth` from the config).
    pub fn new_path(&self) -> Result<VolumePath, GeometryError> {
        let depth = match self.config.max_depth {
            Some(d) => d,
            None => self.tree.max_depth()?,
        };
        Ok(VolumePath::new(depth))
    }

    /// Finds the deepest volume under `root` containing `point`.
    ///
    /// `point` is in `root`'s own frame. With `top`, the point is first
    /// tested against `root` itself and `Ok(None)` means it lies outside
    /// the world; without it, containment in `root` is assumed. `root` and
    /// every volume descended into are pushed onto `path`.
    ///
    /// Daughters are tried in order and the first that contains the point
    /// is entered; overlapping daughters are invalid geometry.
    #[instrument(level = "trace", skip(self, path))]
    pub fn locate_point(
        &self,
        root: VolumeId,
        point: Vec3,
        path: &mut VolumePath,
        top: bool,
    ) -> Result<Option<Location>, NavError> {
        let node = self.tree.node(root)?;
        if top && !node.unplaced_contains(point) {
            return Ok(None);
        }
        path.push(root)?;

        let mut current = root;
        let mut local = point;
        'descend: loop {
            for &daughter in self.tree[current].daughters() {
                if let Some(inner) = self.tree[daughter].contains(local) {
                    path.push(daughter)?;
                    trace!(from = %current, to = %daughter, level = path.level(), "descend");
                    current = daughter;
                    local = inner;
                    continue 'descend;
                }
            }
            break;
        }
        Ok(Some(Location { volume: current, local }))
    }

    /// Relocates a point given in the frame of `path`'s top volume.
    ///
    /// Pops volumes until one contains the point (moving it into each
    /// parent's frame on the way up), then descends as
    /// [`Navigator::locate_point`] does. Returns `Ok(None)`, with `path`
    /// emptied, when the point left the outermost volume.
    #[instrument(level = "trace", skip(self, path))]
    pub fn relocate(&self, local_point: Vec3, path: &mut VolumePath) -> Result<Option<Location>, NavError> {
        let mut current = path.top().ok_or(NavError::EmptyPath)?;
        let mut local = local_point;
        while !self.tree.node(current)?.unplaced_contains(local) {
            local = self.tree[current].transform().apply_inverse(local);
            path.pop();
            match path.top() {
                Some(parent) => {
                    trace!(from = %current, to = %parent, level = path.level(), "ascend");
                    current = parent;
                }
                None => return Ok(None),
            }
        }
        path.pop();
        self.locate_point(current, local, path, false)
    }

    /// Distance to the next boundary for a ray inside `current`.
    ///
    /// `point` and `dir` are in `current`'s frame. Returns the nearest of
    /// the exit distance of `current` and the entry distances of its
    /// daughters, together with the volume owning that boundary. Exiting
    /// wins ties; among daughters the first in order wins. With no boundary
    /// within `step_max` the result is `(INFINITY, None)`.
    pub fn distance_to_next_boundary(
        &self,
        current: VolumeId,
        point: Vec3,
        dir: Vec3,
        step_max: Precision,
    ) -> Result<(Precision, Option<VolumeId>), NavError> {
        let node = self.tree.node(current)?;
        let mut best = node.distance_to_out(point, dir, step_max);
        let mut next = (best < INFINITY).then_some(current);
        for &daughter in node.daughters() {
            let dist = self.tree[daughter].distance_to_in(point, dir, step_max);
            if dist < best {
                best = dist;
                next = Some(daughter);
            }
        }
        Ok((best, next))
    }

    /// [`Navigator::distance_to_next_boundary`] for a batch, `B::LANES`
    /// points at a time.
    ///
    /// Loops volume by volume over the whole batch, so each daughter's
    /// transform routines are selected once. Entry `i` of the outputs is
    /// bit-identical to the single-point query for point `i`.
    #[instrument(level = "debug", skip_all, fields(current = %current, n = points.len(), lanes = B::LANES))]
    pub fn distance_to_next_boundary_batch<B: Backend>(
        &self,
        current: VolumeId,
        points: &Soa3,
        dirs: &Soa3,
        step_max: &[Precision],
        distances: &mut [Precision],
        next: &mut [Option<VolumeId>],
    ) -> Result<(), NavError> {
        let n = points.len();
        check_len(n, dirs.len())?;
        check_len(n, step_max.len())?;
        check_len(n, distances.len())?;
        check_len(n, next.len())?;
        let node = self.tree.node(current)?;

        for start in (0..n).step_by(B::LANES) {
            let p = points.gather::<B>(start);
            let d = dirs.gather::<B>(start);
            let limit = load_padded::<B>(step_max, start);
            let out = node.shape().distance_to_out::<B>(&p, &d, limit);
            store_partial::<B>(out, distances, start);
        }
        for (slot, dist) in next.iter_mut().zip(distances.iter()) {
            *slot = (*dist < INFINITY).then_some(current);
        }

        let mut closer = vec![false; n];
        for &daughter in node.daughters() {
            let dnode = &self.tree[daughter];
            let placement = dnode.transform();
            let kernel = TransformKernel::<B>::for_transform(placement);
            for start in (0..n).step_by(B::LANES) {
                let p = (kernel.apply)(placement, &points.gather::<B>(start));
                let d = (kernel.apply_rotation)(placement, &dirs.gather::<B>(start));
                let limit = load_padded::<B>(step_max, start);
                let best = load_padded::<B>(distances, start);
                let dist = dnode.shape().distance_to_in::<B>(&p, &d, limit);
                let hit = B::lt(dist, best);
                store_partial::<B>(B::select(hit, dist, best), distances, start);
                store_mask_partial::<B>(hit, &mut closer, start);
            }
            for (slot, &hit) in next.iter_mut().zip(&closer) {
                if hit {
                    *slot = Some(daughter);
                }
            }
        }
        debug!(hits = next.iter().filter(|n| n.is_some()).count(), "batch done");
        Ok(())
    }

    /// [`Navigator::distance_to_next_boundary_batch`] split across rayon
    /// workers. Results equal the serial batch.
    #[cfg(feature = "parallel")]
    pub fn distance_to_next_boundary_par<B: Backend>(
        &self,
        current: VolumeId,
        points: &Soa3,
        dirs: &Soa3,
        step_max: &[Precision],
        distances: &mut [Precision],
        next: &mut [Option<VolumeId>],
    ) -> Result<(), NavError> {
        use rayon::prelude::*;

        let n = points.len();
        check_len(n, dirs.len())?;
        check_len(n, step_max.len())?;
        check_len(n, distances.len())?;
        check_len(n, next.len())?;

        distances
            .par_chunks_mut(PAR_CHUNK)
            .zip(next.par_chunks_mut(PAR_CHUNK))
            .enumerate()
            .try_for_each(|(chunk, (dist, nx))| {
                let range = chunk * PAR_CHUNK..chunk * PAR_CHUNK + dist.len();
                self.distance_to_next_boundary_batch::<B>(
                    current,
                    &points.slice(range.clone()),
                    &dirs.slice(range.clone()),
                    &step_max[range],
                    dist,
                    nx,
                )
            })
    }

    /// Moves a particle to its next boundary and relocates it.
    ///
    /// `point` and `dir` are in the frame of `in_path`'s outermost volume.
    /// The particle is moved by the boundary distance plus the configured
    /// push and relocated starting from `in_path`; `out_path` receives the
    /// resulting path. With no boundary within `step_max` the particle moves
    /// the full step (when finite) and stays in its volume.
    #[instrument(level = "debug", skip(self, in_path, out_path))]
    pub fn find_next_boundary_and_step(
        &self,
        point: Vec3,
        dir: Vec3,
        in_path: &VolumePath,
        out_path: &mut VolumePath,
        step_max: Precision,
    ) -> Result<Step, NavError> {
        let current = in_path.top().ok_or(NavError::EmptyPath)?;
        let global = in_path.global_transform(self.tree)?;
        let local_point = global.apply(point);
        let local_dir = global.apply_rotation(dir);
        let (distance, boundary) = self.distance_to_next_boundary(current, local_point, local_dir, step_max)?;

        out_path.clone_from(in_path);
        if boundary.is_none() {
            let moved = if step_max.is_finite() { point + dir * step_max } else { point };
            return Ok(Step { distance, point: moved, boundary, next: Some(current) });
        }

        let moved = point + dir * (distance + self.config.boundary_push);
        let located = self.relocate(global.apply(moved), out_path)?;
        debug!(%distance, path = %out_path, "stepped");
        Ok(Step { distance, point: moved, boundary, next: located.map(|l| l.volume) })
    }

    /// [`Navigator::find_next_boundary_and_step`] with the configured
    /// default step limit.
    pub fn step(&self, point: Vec3, dir: Vec3, in_path: &VolumePath, out_path: &mut VolumePath) -> Result<Step, NavError> {
        self.find_next_boundary_and_step(point, dir, in_path, out_path, self.config.default_step_max)
    }
}

fn check_len(expected: usize, found: usize) -> Result<(), NavError> {
    if expected == found {
        Ok(())
    } else {
        Err(NavError::LengthMismatch { expected, found })
    }
}
