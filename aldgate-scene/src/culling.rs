/*
 * Copyright (C) Oscar Shrimpton 2020
 *
 * This program is free software: you can redistribute it and/or modify it
 * under the terms of the GNU General Public License as published by the Free
 * Software Foundation, either version 3 of the License, or (at your option)
 * any later version.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT
 * ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
 * FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
 * more details.
 *
 * You should have received a copy of the GNU General Public License along
 * with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Functions for figuring out what can be seen

use aldgate_levels::prelude::*;
use aldgate_levels::traits::tree::{Contents, Leaf, LeafFlags};
use aldgate_levels::traits::visdata::ClusterId;
use aldgate_types::{Aabb, BoundingVolume, Vector3};
use log::debug;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

/// A leaf in a visible set, with what culling queries need copied out of the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleLeaf {
    pub leaf: u32,
    pub bounds: Aabb,
    pub flags: LeafFlags,
    pub contents: Contents,
    pub area: u16,
}

/// The leaves potentially visible from one viewer leaf. Never modified once built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VisibleLeafSet {
    viewer_leaf: Option<u32>,
    viewer_cluster: ClusterId,
    has_pvs_data: bool,
    leaves: Vec<VisibleLeaf>,
}

impl VisibleLeafSet {
    /// Gather the leaves visible from `viewer_leaf`, which comes first.
    /// Leaves in the void (cluster 0) are visible from everywhere.
    pub fn build<M: MinVisFeatures>(map: &M, viewer_leaf: u32) -> VisibleLeafSet {
        let mut leaves = vec![];
        let viewer_cluster = match map.get_leaf(viewer_leaf) {
            Some(leaf) => {
                leaves.push(visible_leaf(viewer_leaf, leaf));
                leaf.vis_cluster()
            }
            None => 0,
        };

        for cluster in 0..=map.num_clusters() {
            if !map.cluster_visible_from(viewer_cluster, cluster) {
                continue;
            }

            for &idx in map.leaves_in_cluster(cluster) {
                if idx == viewer_leaf {
                    continue;
                }
                if let Some(leaf) = map.get_leaf(idx) {
                    leaves.push(visible_leaf(idx, leaf));
                }
            }
        }

        VisibleLeafSet {
            viewer_leaf: Some(viewer_leaf),
            viewer_cluster,
            has_pvs_data: map.has_pvs_data(),
            leaves,
        }
    }

    pub fn viewer_leaf(&self) -> Option<u32> {
        self.viewer_leaf
    }

    pub fn viewer_cluster(&self) -> ClusterId {
        self.viewer_cluster
    }

    pub fn has_pvs_data(&self) -> bool {
        self.has_pvs_data
    }

    pub fn leaves(&self) -> &[VisibleLeaf] {
        &self.leaves
    }

    pub fn get(&self, idx: usize) -> Option<&VisibleLeaf> {
        self.leaves.get(idx)
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn contains_leaf(&self, leaf: u32) -> bool {
        self.leaves.iter().any(|l| l.leaf == leaf)
    }

    /// True if `volume` touches any leaf in the set whose flags share a bit with `required_flags`.
    /// Empty `required_flags` matches every leaf.
    pub fn intersects(&self, volume: &BoundingVolume, required_flags: LeafFlags) -> bool {
        self.leaves.iter().any(|leaf| {
            (required_flags.is_empty() || leaf.flags.intersects(required_flags))
                && volume.intersects_aabb(&leaf.bounds)
        })
    }

    /// Faces of all visible leaves, each once, in leaf order.
    pub fn visible_faces<M: HasBspTree>(&self, map: &M) -> Vec<u32> {
        let mut seen = HashSet::new();
        let mut visible = vec![];

        for entry in self.leaves.iter() {
            if let Some(leaf) = map.get_leaf(entry.leaf) {
                for &face in leaf.faces_idx.iter() {
                    if seen.insert(face) {
                        visible.push(face);
                    }
                }
            }
        }

        visible
    }
}

fn visible_leaf(idx: u32, leaf: &Leaf) -> VisibleLeaf {
    VisibleLeaf {
        leaf: idx,
        bounds: leaf.bounds(),
        flags: leaf.flags,
        contents: leaf.contents,
        area: leaf.area,
    }
}

/// Tracks which leaf the viewer is in, and publishes the set of leaves visible from it.
///
/// Updates replace the whole set. Readers clone the current [`Arc`] and never see a set
/// that is partially built.
#[derive(Debug, Default)]
pub struct LeafVisibilityTracker {
    current: RwLock<Option<Arc<VisibleLeafSet>>>,
}

impl LeafVisibilityTracker {
    pub fn new() -> LeafVisibilityTracker {
        LeafVisibilityTracker::default()
    }

    /// Locate the viewer and rebuild the visible set if they changed leaf.
    /// Returns true if a new set was published.
    pub fn update<M: MinVisFeatures>(&self, map: &M, viewer: &Vector3) -> bool {
        if !map.is_active() {
            return false;
        }

        let leaf = map.find_leaf(viewer, 0);
        if self.current_leaf() == Some(leaf) {
            return false;
        }

        let set = VisibleLeafSet::build(map, leaf);
        debug!(
            "Viewer moved to leaf {} (cluster {}), {} leaves visible",
            leaf,
            set.viewer_cluster(),
            set.len()
        );

        *self.current.write() = Some(Arc::new(set));
        true
    }

    /// The current set, if one has been built.
    pub fn snapshot(&self) -> Option<Arc<VisibleLeafSet>> {
        self.current.read().clone()
    }

    /// Conservative test of whether `volume` could be visible.
    /// Without a set, or without PVS data, everything could be.
    pub fn bounds_test(&self, volume: &BoundingVolume, required_flags: LeafFlags) -> bool {
        match self.snapshot() {
            Some(set) if set.has_pvs_data() => set.intersects(volume, required_flags),
            _ => true,
        }
    }

    pub fn get_leaf(&self, idx: usize) -> Option<VisibleLeaf> {
        self.snapshot()?.get(idx).copied()
    }

    pub fn get_num_visible(&self) -> usize {
        self.snapshot().map_or(0, |set| set.len())
    }

    pub fn current_leaf(&self) -> Option<u32> {
        self.current.read().as_ref().and_then(|set| set.viewer_leaf())
    }

    /// Forget the current set, eg when the level is unloaded.
    pub fn reset(&self) {
        *self.current.write() = None;
    }
}
