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

//! Parses the BSP tree into nodes and leaves

use std::ops::Range;

use crate::helpers::{slice_to_i16, slice_to_i32, slice_to_u16, slice_to_u16s, slice_to_u32, slice_to_vec3s};
use crate::traits::ambient::AmbientCube;
use crate::traits::tree::*;
use crate::types::{ParseError, Result};

const NODE_SIZE: usize = 4 + (4 * 2) + (2 * 3 * 2) + (2 * 2) + 2 + 2;
const LEAF_SIZE_V1: usize = 4 + 2 + 2 + (2 * 3 * 2) + (2 * 4) + 2 + 2;
const LEAF_SIZE_V0: usize = LEAF_SIZE_V1 + 24;

/// Resolve `n` entries of an index list starting at `start`, checking each against `limit`.
fn resolve_list(
    list: &[u16],
    start: u16,
    n: u16,
    limit: u32,
    what: &'static str,
) -> Result<Box<[u32]>> {
    let range = start as usize..start as usize + n as usize;
    let entries = list.get(range).ok_or(ParseError::Invalid(what))?;

    entries
        .iter()
        .map(|&idx| {
            if (idx as u32) < limit {
                Ok(idx as u32)
            } else {
                Err(ParseError::Invalid(what))
            }
        })
        .collect()
}

/// Parse the leafs lump, resolving each leaf's faces and brushes.
/// `version` is the lump's version from the directory, and decides the record size.
pub fn leaves_from_data(
    data: &[u8],
    version: i32,
    leaf_faces: &[u8],
    leaf_brushes: &[u8],
    n_faces: u32,
    n_brushes: u32,
) -> Result<Box<[Leaf]>> {
    // Nothing to decode, so the version doesn't matter
    if data.is_empty() {
        return Ok(Box::new([]));
    }

    let leaf_size = match version {
        0 => LEAF_SIZE_V0,
        1 => LEAF_SIZE_V1,
        found => {
            return Err(ParseError::UnsupportedVersion {
                what: "leafs lump",
                found,
            })
        }
    };

    if data.len() % leaf_size != 0 {
        return Err(ParseError::Invalid("leafs lump size"));
    }

    let leaf_faces = slice_to_u16s(leaf_faces);
    let leaf_brushes = slice_to_u16s(leaf_brushes);

    let mut leaves = Vec::with_capacity(data.len() / leaf_size);
    for raw in data.chunks_exact(leaf_size) {
        let area_flags = slice_to_u16(&raw[6..8]);

        let faces_idx = resolve_list(
            &leaf_faces,
            slice_to_u16(&raw[20..22]),
            slice_to_u16(&raw[22..24]),
            n_faces,
            "leaf face index",
        )?;
        let brushes_idx = resolve_list(
            &leaf_brushes,
            slice_to_u16(&raw[24..26]),
            slice_to_u16(&raw[26..28]),
            n_brushes,
            "leaf brush index",
        )?;

        leaves.push(Leaf {
            contents: Contents::from_bits_retain(slice_to_u32(&raw[0..4])),
            cluster: slice_to_i16(&raw[4..6]),
            area: area_flags & 0x1FF,
            flags: LeafFlags::from_bits_retain((area_flags >> 9) as u8),
            mins: slice_to_vec3s(&raw[8..14]),
            maxs: slice_to_vec3s(&raw[14..20]),
            faces_idx,
            brushes_idx,
            water_data_id: slice_to_i16(&raw[28..30]),
            ambient: if version == 0 {
                Some(AmbientCube::from_compressed(&raw[30..54]))
            } else {
                None
            },
        });
    }

    Ok(leaves.into_boxed_slice())
}

/// Parse the nodes lump. Every plane, child and face reference must point inside the file.
pub fn nodes_from_data(
    data: &[u8],
    n_planes: u32,
    n_leaves: u32,
    n_faces: u32,
) -> Result<Box<[Node]>> {
    if data.len() % NODE_SIZE != 0 {
        return Err(ParseError::Invalid("nodes lump size"));
    }
    let n_nodes = (data.len() / NODE_SIZE) as u32;

    let check_child = |raw: i32| match NodeRef::from_raw(raw) {
        NodeRef::Node(n) if n < n_nodes => Ok(NodeRef::Node(n)),
        NodeRef::Leaf(l) if l < n_leaves => Ok(NodeRef::Leaf(l)),
        _ => Err(ParseError::Invalid("node child index")),
    };

    let mut nodes = Vec::with_capacity(n_nodes as usize);
    for raw in data.chunks_exact(NODE_SIZE) {
        let plane_idx = slice_to_i32(&raw[0..4]);
        if plane_idx < 0 || plane_idx as u32 >= n_planes {
            return Err(ParseError::Invalid("node plane index"));
        }

        let faces_idx = {
            let start = slice_to_u16(&raw[24..26]) as u32;
            let n = slice_to_u16(&raw[26..28]) as u32;
            if start + n > n_faces {
                return Err(ParseError::Invalid("node face range"));
            }

            Range {
                start,
                end: start + n,
            }
        };

        nodes.push(Node {
            plane_idx: plane_idx as u32,
            children: [
                check_child(slice_to_i32(&raw[4..8]))?,
                check_child(slice_to_i32(&raw[8..12]))?,
            ],
            mins: slice_to_vec3s(&raw[12..18]),
            maxs: slice_to_vec3s(&raw[18..24]),
            faces_idx,
            area: slice_to_i16(&raw[28..30]),
        });
    }

    Ok(nodes.into_boxed_slice())
}
