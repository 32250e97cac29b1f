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

use aldgate_types::{Aabb, Vector3};
use bitflags::bitflags;
use std::ops::Range;

use super::ambient::AmbientCube;
use super::visdata::ClusterId;

/// A reference to a child of a node.
/// On disk, children are plain integers where negative values are bit-complemented leaf indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Node(u32),
    Leaf(u32),
}

impl NodeRef {
    pub fn from_raw(raw: i32) -> NodeRef {
        if raw >= 0 {
            NodeRef::Node(raw as u32)
        } else {
            NodeRef::Leaf(!raw as u32)
        }
    }

    pub fn to_raw(self) -> i32 {
        match self {
            NodeRef::Node(n) => n as i32,
            NodeRef::Leaf(l) => !(l as i32),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub plane_idx: u32,

    /// Front (distance >= 0) then back.
    pub children: [NodeRef; 2],
    pub mins: Vector3,
    pub maxs: Vector3,
    pub faces_idx: Range<u32>,
    pub area: i16,
}

impl Node {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.mins, self.maxs)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub contents: Contents,

    /// Cluster as stored on disk. -1 means this leaf is never visible.
    pub cluster: i16,

    /// 9 bits on disk.
    pub area: u16,

    /// 7 bits on disk.
    pub flags: LeafFlags,
    pub mins: Vector3,
    pub maxs: Vector3,
    pub faces_idx: Box<[u32]>,
    pub brushes_idx: Box<[u32]>,
    pub water_data_id: i16,

    /// Only present in version 0 leaf lumps.
    pub ambient: Option<AmbientCube>,
}

impl Leaf {
    /// The cluster used for visibility queries. Clusters on disk are shifted up by one
    /// so that 0 can stand for the void.
    pub fn vis_cluster(&self) -> ClusterId {
        if self.cluster < 0 {
            0
        } else {
            self.cluster as ClusterId + 1
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.mins, self.maxs)
    }

    pub fn is_solid(&self) -> bool {
        self.contents.contains(Contents::SOLID)
    }
}

bitflags! {
    /// Leaf flags, computed by the map compiler.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LeafFlags: u8 {
        /// The 3D skybox can be seen from this leaf
        const SKY = 0x01;

        /// Radial lighting has been computed
        const RADIAL = 0x02;

        /// The 2D skybox can be seen from this leaf
        const SKY2D = 0x04;
    }
}

bitflags! {
    /// Source engine contents flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Contents: u32 {
        /// an eye is never valid in a solid
        const SOLID = 0x1;
        const WINDOW = 0x2;
        const AUX = 0x4;

        /// alpha-tested "grate" textures
        const GRATE = 0x8;
        const SLIME = 0x10;
        const WATER = 0x20;

        /// block AI line of sight
        const BLOCK_LOS = 0x40;

        /// things that cannot be seen through
        const OPAQUE = 0x80;
        const TEST_FOG_VOLUME = 0x100;
        const TEAM1 = 0x800;
        const TEAM2 = 0x1000;
        const IGNORE_NODRAW_OPAQUE = 0x2000;
        const MOVEABLE = 0x4000;
        const AREA_PORTAL = 0x8000;
        const PLAYER_CLIP = 0x1_0000;
        const MONSTER_CLIP = 0x2_0000;
        const CURRENT_0 = 0x4_0000;
        const CURRENT_90 = 0x8_0000;
        const CURRENT_180 = 0x10_0000;
        const CURRENT_270 = 0x20_0000;
        const CURRENT_UP = 0x40_0000;
        const CURRENT_DOWN = 0x80_0000;

        /// removed before bsping an entity
        const ORIGIN = 0x100_0000;

        /// should never be on a brush, only in game
        const MONSTER = 0x200_0000;
        const DEBRIS = 0x400_0000;

        /// brushes to be added after vis leafs
        const DETAIL = 0x800_0000;

        /// auto set if any surface has trans
        const TRANSLUCENT = 0x1000_0000;
        const LADDER = 0x2000_0000;

        /// use accurate hitboxes on trace
        const HITBOX = 0x4000_0000;
    }
}

/// Point location within a BSP tree.
pub trait HasBspTree {
    /// False for the empty tree used when no level is loaded.
    fn is_active(&self) -> bool;

    /// The leaf containing `point`, walking down from `head_node`.
    fn find_leaf(&self, point: &Vector3, head_node: u32) -> u32;

    /// The last internal node visited while locating `point`.
    fn find_node(&self, point: &Vector3, head_node: u32) -> u32;

    fn get_leaf(&self, idx: u32) -> Option<&Leaf>;

    /// World leaves belonging to `cluster`.
    fn leaves_in_cluster(&self, cluster: ClusterId) -> &[u32];

    /// The highest vis cluster id any world leaf uses.
    fn num_clusters(&self) -> u32;
}
