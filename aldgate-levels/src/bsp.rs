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

//! Point location within a BSP tree

use aldgate_types::Vector3;
use bitvec::prelude::*;
use log::warn;

use crate::coords::CoordSystem;
use crate::source::BspFile;
use crate::traits::models::*;
use crate::traits::planes::*;
use crate::traits::tree::*;
use crate::traits::visdata::ClusterId;

/// The nodes, leaves and planes of a level, plus lookups from cluster to leaf.
/// Built once when a level loads and never modified afterwards.
#[derive(Debug, Clone, Default)]
pub struct BspTree {
    planes: Box<[Plane]>,
    nodes: Box<[Node]>,
    leaves: Box<[Leaf]>,
    models: Box<[Model]>,

    /// Leaves reachable from the world model's head node, ascending.
    world_leaves: Box<[u32]>,

    /// World leaves by vis cluster. Entry 0 holds leaves in the void.
    cluster_leaves: Box<[Box<[u32]>]>,
}

impl BspTree {
    /// A tree with nothing in it, used while no level is loaded.
    pub fn empty() -> BspTree {
        BspTree::default()
    }

    pub fn new(
        planes: Box<[Plane]>,
        nodes: Box<[Node]>,
        leaves: Box<[Leaf]>,
        models: Box<[Model]>,
    ) -> BspTree {
        let mut tree = BspTree {
            planes,
            nodes,
            leaves,
            models,
            world_leaves: Box::new([]),
            cluster_leaves: Box::new([]),
        };

        tree.world_leaves = tree.collect_world_leaves();

        let num_clusters = tree
            .world_leaves
            .iter()
            .map(|&l| tree.leaves[l as usize].vis_cluster())
            .max()
            .unwrap_or(0);

        let mut cluster_leaves = vec![Vec::new(); num_clusters as usize + 1];
        for &leaf in tree.world_leaves.iter() {
            cluster_leaves[tree.leaves[leaf as usize].vis_cluster() as usize].push(leaf);
        }
        tree.cluster_leaves = cluster_leaves
            .into_iter()
            .map(Vec::into_boxed_slice)
            .collect();

        tree
    }

    /// Copy the tree out of a parsed file.
    pub fn from_file<S: CoordSystem>(file: &BspFile<S>) -> BspTree {
        BspTree::new(
            file.planes.clone(),
            file.nodes.clone(),
            file.leaves.clone(),
            file.models.clone(),
        )
    }

    /// Walk the tree from the world head and gather every leaf it reaches.
    fn collect_world_leaves(&self) -> Box<[u32]> {
        if self.nodes.is_empty() {
            return (0..self.leaves.len() as u32).collect();
        }

        let mut seen_nodes = bitvec![0; self.nodes.len()];
        let mut seen_leaves = bitvec![0; self.leaves.len()];
        let mut stack = vec![self.world_head_node()];

        while let Some(idx) = stack.pop() {
            let node = match self.nodes.get(idx as usize) {
                Some(n) if !seen_nodes[idx as usize] => n,
                Some(_) => {
                    warn!("BSP node {} is reachable more than once", idx);
                    continue;
                }
                None => continue,
            };
            seen_nodes.set(idx as usize, true);

            for child in node.children.iter() {
                match *child {
                    NodeRef::Node(n) => stack.push(n),
                    NodeRef::Leaf(l) => {
                        if (l as usize) < self.leaves.len() {
                            seen_leaves.set(l as usize, true);
                        }
                    }
                }
            }
        }

        seen_leaves.iter_ones().map(|l| l as u32).collect()
    }

    /// Follows the tree from `head_node` to a leaf.
    /// Returns the last node visited and the leaf reached.
    fn walk(&self, point: &Vector3, head_node: u32) -> (u32, u32) {
        let mut idx = head_node;

        // Bounded, so a malformed tree with a cycle still terminates
        for _ in 0..=self.nodes.len() {
            let node = match self.nodes.get(idx as usize) {
                Some(n) => n,
                None => break,
            };

            let dist = self
                .planes
                .get(node.plane_idx as usize)
                .map_or(0.0, |plane| plane.distance(point));

            let child = if dist >= 0.0 {
                node.children[0]
            } else {
                node.children[1]
            };

            match child {
                NodeRef::Leaf(leaf) => return (idx, leaf),
                NodeRef::Node(next) => idx = next,
            }
        }

        (idx, 0)
    }

    /// The leaf containing `point`. Points exactly on a plane go to the front child.
    /// Returns 0 if the tree is inactive.
    pub fn find_leaf(&self, point: &Vector3, head_node: u32) -> u32 {
        if !self.is_active() || self.nodes.is_empty() {
            return 0;
        }

        self.walk(point, head_node).1
    }

    /// The last internal node visited while locating `point`.
    pub fn find_node(&self, point: &Vector3, head_node: u32) -> u32 {
        if !self.is_active() || self.nodes.is_empty() {
            return 0;
        }

        self.walk(point, head_node).0
    }

    /// Point location within a brush model's own subtree.
    pub fn find_leaf_in_model(&self, point: &Vector3, model: u32) -> Option<u32> {
        let model = self.models.get(model as usize)?;
        Some(self.find_leaf(point, model.head_node))
    }

    pub fn world_head_node(&self) -> u32 {
        self.models.first().map_or(0, |m| m.head_node)
    }

    pub fn leaf(&self, idx: u32) -> Option<&Leaf> {
        self.leaves.get(idx as usize)
    }

    pub fn node(&self, idx: u32) -> Option<&Node> {
        self.nodes.get(idx as usize)
    }

    pub fn plane(&self, idx: u32) -> Option<&Plane> {
        self.planes.get(idx as usize)
    }

    pub fn model(&self, idx: u32) -> Option<&Model> {
        self.models.get(idx as usize)
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn world_leaves(&self) -> &[u32] {
        &self.world_leaves
    }

    pub fn leaves_in_cluster(&self, cluster: ClusterId) -> &[u32] {
        self.cluster_leaves
            .get(cluster as usize)
            .map_or(&[][..], |leaves| &leaves[..])
    }

    /// The highest vis cluster used by a world leaf.
    pub fn num_clusters(&self) -> u32 {
        self.cluster_leaves.len().saturating_sub(1) as u32
    }

    pub fn is_active(&self) -> bool {
        !self.leaves.is_empty()
    }
}

impl HasBspTree for BspTree {
    fn is_active(&self) -> bool {
        BspTree::is_active(self)
    }

    fn find_leaf(&self, point: &Vector3, head_node: u32) -> u32 {
        BspTree::find_leaf(self, point, head_node)
    }

    fn find_node(&self, point: &Vector3, head_node: u32) -> u32 {
        BspTree::find_node(self, point, head_node)
    }

    fn get_leaf(&self, idx: u32) -> Option<&Leaf> {
        self.leaf(idx)
    }

    fn leaves_in_cluster(&self, cluster: ClusterId) -> &[u32] {
        BspTree::leaves_in_cluster(self, cluster)
    }

    fn num_clusters(&self) -> u32 {
        BspTree::num_clusters(self)
    }
}

impl HasPlanes for BspTree {
    type PlanesIter<'a> = std::slice::Iter<'a, Plane> where Self: 'a;

    fn planes_iter(&self) -> Self::PlanesIter<'_> {
        self.planes.iter()
    }

    fn get_plane(&self, idx: u32) -> Option<&Plane> {
        self.plane(idx)
    }
}

impl HasModels for BspTree {
    type ModelsIter<'a> = std::slice::Iter<'a, Model> where Self: 'a;

    fn models_iter(&self) -> Self::ModelsIter<'_> {
        self.models.iter()
    }

    fn get_model(&self, index: u32) -> Option<&Model> {
        self.model(index)
    }
}
