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

use super::BspFile;
use crate::coords::CoordSystem;
use crate::helpers::{slice_to_f32, slice_to_i16, slice_to_i32, slice_to_u16, slice_to_u32};
use crate::traits::faces::*;
use crate::types::{ParseError, Result};

const FACE_SIZE: usize = 56;

/// -1 on disk means "none" for several face fields.
fn optional_index(raw: i32) -> Option<u32> {
    if raw < 0 {
        None
    } else {
        Some(raw as u32)
    }
}

pub fn from_data(data: &[u8], n_planes: u32) -> Result<Box<[Face]>> {
    if data.len() % FACE_SIZE != 0 {
        return Err(ParseError::Invalid("faces lump size"));
    }

    let mut faces = Vec::with_capacity(data.len() / FACE_SIZE);
    for raw in data.chunks_exact(FACE_SIZE) {
        let plane_idx = slice_to_u16(&raw[0..2]) as u32;
        if plane_idx >= n_planes {
            return Err(ParseError::Invalid("face plane index"));
        }

        let first_edge = slice_to_i32(&raw[4..8]);
        let num_edges = slice_to_i16(&raw[8..10]);
        if first_edge < 0 || num_edges < 0 {
            return Err(ParseError::Invalid("face edge range"));
        }

        faces.push(Face {
            plane_idx,
            back_side: raw[2] != 0,
            on_node: raw[3] != 0,
            edges_idx: Range {
                start: first_edge as u32,
                end: first_edge as u32 + num_edges as u32,
            },
            texinfo_idx: optional_index(slice_to_i16(&raw[10..12]) as i32),
            dispinfo_idx: optional_index(slice_to_i16(&raw[12..14]) as i32),
            // 14..16 = surface fog volume
            styles: [raw[16], raw[17], raw[18], raw[19]],
            light_offset: optional_index(slice_to_i32(&raw[20..24])),
            area: slice_to_f32(&raw[24..28]),
            lightmap_mins: [slice_to_i32(&raw[28..32]), slice_to_i32(&raw[32..36])],
            lightmap_size: [slice_to_i32(&raw[36..40]), slice_to_i32(&raw[40..44])],
            orig_face: slice_to_i32(&raw[44..48]),
            // 48..52 = primitives
            smoothing_groups: slice_to_u32(&raw[52..56]),
        });
    }

    Ok(faces.into_boxed_slice())
}

impl<S: CoordSystem> HasFaces for BspFile<S> {
    type FacesIter<'a> = std::slice::Iter<'a, Face> where Self: 'a;

    fn faces_iter(&self) -> Self::FacesIter<'_> {
        self.faces.iter()
    }

    fn faces_len(&self) -> u32 {
        self.faces.len() as u32
    }

    fn get_face(&self, index: u32) -> Option<&Face> {
        self.faces.get(index as usize)
    }
}
