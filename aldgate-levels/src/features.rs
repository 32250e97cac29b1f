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

//! Marker traits for groups of features, and a type bundling the ones needed at runtime.

use aldgate_types::Vector3;

use crate::bsp::BspTree;
use crate::coords::CoordSystem;
use crate::pvs::{VisKind, VisibilityTable, VisibleClusters};
use crate::source::BspFile;
use crate::traits::tree::{HasBspTree, Leaf};
use crate::traits::visdata::{ClusterId, HasVisData};

/// Everything needed to answer "what can be seen from here".
pub trait MinVisFeatures: HasBspTree + HasVisData {}
impl<T> MinVisFeatures for T where T: HasBspTree + HasVisData {}

/// A tree and its PVS table.
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    pub tree: BspTree,
    pub vis: VisibilityTable,
}

impl SpatialIndex {
    pub fn new(tree: BspTree, vis: VisibilityTable) -> SpatialIndex {
        SpatialIndex { tree, vis }
    }

    pub fn from_file<S: CoordSystem>(file: &BspFile<S>) -> SpatialIndex {
        SpatialIndex {
            tree: BspTree::from_file(file),
            vis: VisibilityTable::from_lump(file.vis_lump(), VisKind::Pvs),
        }
    }
}

impl HasBspTree for SpatialIndex {
    fn is_active(&self) -> bool {
        self.tree.is_active()
    }

    fn find_leaf(&self, point: &Vector3, head_node: u32) -> u32 {
        self.tree.find_leaf(point, head_node)
    }

    fn find_node(&self, point: &Vector3, head_node: u32) -> u32 {
        self.tree.find_node(point, head_node)
    }

    fn get_leaf(&self, idx: u32) -> Option<&Leaf> {
        self.tree.leaf(idx)
    }

    fn leaves_in_cluster(&self, cluster: ClusterId) -> &[u32] {
        self.tree.leaves_in_cluster(cluster)
    }

    fn num_clusters(&self) -> u32 {
        self.tree.num_clusters()
    }
}

impl HasVisData for SpatialIndex {
    type VisibleIterator<'a> = VisibleClusters<'a> where Self: 'a;

    fn has_pvs_data(&self) -> bool {
        self.vis.has_pvs_data()
    }

    fn all_visible_from(&self, from: ClusterId) -> Self::VisibleIterator<'_> {
        let last = self.tree.num_clusters().max(self.vis.num_clusters());
        self.vis.visible_among(from, last)
    }

    fn cluster_visible_from(&self, from: ClusterId, dest: ClusterId) -> bool {
        self.vis.is_visible(from, dest)
    }
}
