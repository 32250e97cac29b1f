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

use std::ops::Range;

#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub plane_idx: u32,

    /// Faces on the back of their plane
    pub back_side: bool,
    pub on_node: bool,
    pub edges_idx: Range<u32>,
    pub texinfo_idx: Option<u32>,
    pub dispinfo_idx: Option<u32>,

    /// Lightstyles, 255 for none
    pub styles: [u8; 4],

    /// Byte offset into the lighting lump
    pub light_offset: Option<u32>,

    /// Surface area, in squared units of the level's coordinate system
    pub area: f32,
    pub lightmap_mins: [i32; 2],
    pub lightmap_size: [i32; 2],
    pub orig_face: i32,
    pub smoothing_groups: u32,
}

pub trait HasFaces {
    type FacesIter<'a>: Iterator<Item = &'a Face>
    where
        Self: 'a;

    fn faces_iter(&self) -> Self::FacesIter<'_>;
    fn faces_len(&self) -> u32;
    fn get_face(&self, index: u32) -> Option<&Face>;
}
