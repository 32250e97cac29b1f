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

//! Writing small synthetic VBSP files, for tests in this and dependent crates.

use bitvec::prelude::*;

use crate::pvs::compress_row;
use crate::source::header::{HEADER_LEN, HEADER_LUMPS};
use crate::source::Lump;
use crate::traits::tree::NodeRef;

/// A leaf as written to disk. Face and brush lists are gathered into the leaf face/brush lumps.
#[derive(Debug, Clone)]
pub struct LeafSpec {
    pub contents: u32,
    pub cluster: i16,
    pub area: u16,
    pub flags: u8,
    pub mins: [i16; 3],
    pub maxs: [i16; 3],
    pub faces: Vec<u16>,
    pub brushes: Vec<u16>,

    /// Only written for version 0 leaf lumps.
    pub ambient: Option<[u8; 24]>,
}

impl Default for LeafSpec {
    fn default() -> Self {
        LeafSpec {
            contents: 0,
            cluster: -1,
            area: 0,
            flags: 0,
            mins: [0; 3],
            maxs: [0; 3],
            faces: vec![],
            brushes: vec![],
            ambient: None,
        }
    }
}

/// A compressed light cube with the same colour on every face.
pub fn uniform_cube(r: u8, g: u8, b: u8, exponent: i8) -> [u8; 24] {
    let mut cube = [0u8; 24];
    for face in cube.chunks_exact_mut(4) {
        face.copy_from_slice(&[r, g, b, exponent as u8]);
    }
    cube
}

#[derive(Debug, Clone, Default)]
struct AmbientLumps {
    index: Vec<(u16, u16)>,
    samples: Vec<([u8; 24], [u8; 3])>,
}

/// Builds a VBSP file in memory.
#[derive(Debug, Clone)]
pub struct MapBuilder {
    version: i32,
    map_revision: i32,
    leaf_version: i32,
    entities: String,
    planes: Vec<u8>,
    nodes: Vec<u8>,
    leaves: Vec<LeafSpec>,
    models: Vec<u8>,
    faces: Vec<u8>,
    brushes: u32,
    vis: Option<Vec<Option<Vec<bool>>>>,
    ambient_ldr: Option<AmbientLumps>,
    ambient_hdr: Option<AmbientLumps>,
    overrides: Vec<(Lump, i32, Vec<u8>)>,
}

impl Default for MapBuilder {
    fn default() -> Self {
        MapBuilder::new()
    }
}

fn push_vec3f(out: &mut Vec<u8>, v: [f32; 3]) {
    for x in v {
        out.extend_from_slice(&x.to_le_bytes());
    }
}

fn push_vec3s(out: &mut Vec<u8>, v: [i16; 3]) {
    for x in v {
        out.extend_from_slice(&x.to_le_bytes());
    }
}

impl MapBuilder {
    pub fn new() -> MapBuilder {
        MapBuilder {
            version: 20,
            map_revision: 1,
            leaf_version: 1,
            entities: String::new(),
            planes: vec![],
            nodes: vec![],
            leaves: vec![],
            models: vec![],
            faces: vec![],
            brushes: 0,
            vis: None,
            ambient_ldr: None,
            ambient_hdr: None,
            overrides: vec![],
        }
    }

    pub fn version(&mut self, version: i32) -> &mut Self {
        self.version = version;
        self
    }

    pub fn map_revision(&mut self, revision: i32) -> &mut Self {
        self.map_revision = revision;
        self
    }

    /// 0 writes 56 byte leaves with light cubes, 1 writes 32 byte leaves.
    pub fn leaf_version(&mut self, version: i32) -> &mut Self {
        self.leaf_version = version;
        self
    }

    pub fn entities(&mut self, text: &str) -> &mut Self {
        self.entities = text.to_owned();
        self
    }

    /// Add a plane, working out its type from the normal.
    pub fn plane(&mut self, normal: [f32; 3], dist: f32) -> &mut Self {
        let abs = normal.map(f32::abs);
        let plane_type = if abs[0] == 1.0 {
            0
        } else if abs[1] == 1.0 {
            1
        } else if abs[2] == 1.0 {
            2
        } else if abs[0] >= abs[1] && abs[0] >= abs[2] {
            3
        } else if abs[1] >= abs[2] {
            4
        } else {
            5
        };

        push_vec3f(&mut self.planes, normal);
        self.planes.extend_from_slice(&dist.to_le_bytes());
        self.planes.extend_from_slice(&(plane_type as i32).to_le_bytes());
        self
    }

    pub fn node(
        &mut self,
        plane: u32,
        front: NodeRef,
        back: NodeRef,
        mins: [i16; 3],
        maxs: [i16; 3],
    ) -> &mut Self {
        let out = &mut self.nodes;
        out.extend_from_slice(&(plane as i32).to_le_bytes());
        out.extend_from_slice(&front.to_raw().to_le_bytes());
        out.extend_from_slice(&back.to_raw().to_le_bytes());
        push_vec3s(out, mins);
        push_vec3s(out, maxs);
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0i16.to_le_bytes());
        out.extend_from_slice(&0i16.to_le_bytes());
        self
    }

    pub fn leaf(&mut self, leaf: LeafSpec) -> &mut Self {
        self.leaves.push(leaf);
        self
    }

    pub fn model(&mut self, mins: [f32; 3], maxs: [f32; 3], head_node: i32) -> &mut Self {
        let out = &mut self.models;
        push_vec3f(out, mins);
        push_vec3f(out, maxs);
        push_vec3f(out, [0.0; 3]);
        out.extend_from_slice(&head_node.to_le_bytes());
        out.extend_from_slice(&0i32.to_le_bytes());
        out.extend_from_slice(&0i32.to_le_bytes());
        self
    }

    /// Add a face on `plane` with no texture, displacement or lightmap.
    pub fn face(&mut self, plane: u16, area: f32) -> &mut Self {
        let mut raw = [0u8; 56];
        raw[0..2].copy_from_slice(&plane.to_le_bytes());
        raw[10..12].copy_from_slice(&(-1i16).to_le_bytes());
        raw[12..14].copy_from_slice(&(-1i16).to_le_bytes());
        raw[14..16].copy_from_slice(&(-1i16).to_le_bytes());
        raw[16..20].copy_from_slice(&[0, 255, 255, 255]);
        raw[20..24].copy_from_slice(&(-1i32).to_le_bytes());
        raw[24..28].copy_from_slice(&area.to_le_bytes());
        raw[44..48].copy_from_slice(&(-1i32).to_le_bytes());
        self.faces.extend_from_slice(&raw);
        self
    }

    pub fn brushes(&mut self, count: u32) -> &mut Self {
        self.brushes = count;
        self
    }

    /// Set the PVS, one row per on-disk cluster. `None` writes an offset of -1.
    /// The PHS is written with the same rows.
    pub fn vis(&mut self, rows: Vec<Option<Vec<bool>>>) -> &mut Self {
        self.vis = Some(rows);
        self
    }

    /// Set the leaf ambient lumps. `index` is `(sample_count, first_sample)` per leaf, and
    /// each sample is a compressed cube and a position within its leaf.
    pub fn ambient(
        &mut self,
        hdr: bool,
        index: Vec<(u16, u16)>,
        samples: Vec<([u8; 24], [u8; 3])>,
    ) -> &mut Self {
        let lumps = Some(AmbientLumps { index, samples });
        if hdr {
            self.ambient_hdr = lumps;
        } else {
            self.ambient_ldr = lumps;
        }
        self
    }

    /// Replace a lump's contents and version outright.
    pub fn raw_lump(&mut self, lump: Lump, version: i32, data: Vec<u8>) -> &mut Self {
        self.overrides.retain(|(l, _, _)| *l != lump);
        self.overrides.push((lump, version, data));
        self
    }

    fn leaf_lumps(&self) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        let mut leaves = vec![];
        let mut leaf_faces: Vec<u8> = vec![];
        let mut leaf_brushes: Vec<u8> = vec![];

        for leaf in self.leaves.iter() {
            let first_face = (leaf_faces.len() / 2) as u16;
            for face in leaf.faces.iter() {
                leaf_faces.extend_from_slice(&face.to_le_bytes());
            }
            let first_brush = (leaf_brushes.len() / 2) as u16;
            for brush in leaf.brushes.iter() {
                leaf_brushes.extend_from_slice(&brush.to_le_bytes());
            }

            leaves.extend_from_slice(&leaf.contents.to_le_bytes());
            leaves.extend_from_slice(&leaf.cluster.to_le_bytes());
            let area_flags = (leaf.area & 0x1FF) | ((leaf.flags as u16) << 9);
            leaves.extend_from_slice(&area_flags.to_le_bytes());
            push_vec3s(&mut leaves, leaf.mins);
            push_vec3s(&mut leaves, leaf.maxs);
            leaves.extend_from_slice(&first_face.to_le_bytes());
            leaves.extend_from_slice(&(leaf.faces.len() as u16).to_le_bytes());
            leaves.extend_from_slice(&first_brush.to_le_bytes());
            leaves.extend_from_slice(&(leaf.brushes.len() as u16).to_le_bytes());
            leaves.extend_from_slice(&(-1i16).to_le_bytes());
            if self.leaf_version == 0 {
                leaves.extend_from_slice(&leaf.ambient.unwrap_or([0; 24]));
            }
            leaves.extend_from_slice(&[0, 0]);
        }

        (leaves, leaf_faces, leaf_brushes)
    }

    fn vis_lump(rows: &[Option<Vec<bool>>]) -> Vec<u8> {
        let mut offsets = vec![];
        let mut data = vec![];
        let table_len = 4 + rows.len() * 8;

        for row in rows.iter() {
            match row {
                Some(bits) => {
                    let offset = (table_len + data.len()) as i32;
                    let row: BitVec<u8, Lsb0> = bits.iter().copied().collect();
                    data.extend(compress_row(&row));
                    offsets.push(offset);
                }
                None => offsets.push(-1),
            }
        }

        let mut out = vec![];
        out.extend_from_slice(&(rows.len() as i32).to_le_bytes());
        for offset in offsets {
            out.extend_from_slice(&offset.to_le_bytes());
            out.extend_from_slice(&offset.to_le_bytes());
        }
        out.extend(data);
        out
    }

    fn ambient_lumps(ambient: &AmbientLumps) -> (Vec<u8>, Vec<u8>) {
        let mut index = vec![];
        for (count, first) in ambient.index.iter() {
            index.extend_from_slice(&count.to_le_bytes());
            index.extend_from_slice(&first.to_le_bytes());
        }

        let mut samples = vec![];
        for (cube, pos) in ambient.samples.iter() {
            samples.extend_from_slice(cube);
            samples.extend_from_slice(pos);
            samples.push(0);
        }

        (index, samples)
    }

    /// Write out the file.
    pub fn build(&self) -> Vec<u8> {
        let mut lumps: Vec<(Lump, i32, Vec<u8>)> = vec![];

        if !self.entities.is_empty() {
            let mut text = self.entities.clone().into_bytes();
            text.push(0);
            lumps.push((Lump::Entities, 0, text));
        }

        let (leaves, leaf_faces, leaf_brushes) = self.leaf_lumps();
        lumps.push((Lump::Planes, 0, self.planes.clone()));
        lumps.push((Lump::Nodes, 0, self.nodes.clone()));
        lumps.push((Lump::Leafs, self.leaf_version, leaves));
        lumps.push((Lump::LeafFaces, 0, leaf_faces));
        lumps.push((Lump::LeafBrushes, 0, leaf_brushes));
        lumps.push((Lump::Brushes, 0, vec![0; self.brushes as usize * 12]));
        lumps.push((Lump::Models, 0, self.models.clone()));
        lumps.push((Lump::Faces, 0, self.faces.clone()));

        if let Some(rows) = &self.vis {
            lumps.push((Lump::Visibility, 0, MapBuilder::vis_lump(rows)));
        }

        if let Some(ambient) = &self.ambient_ldr {
            let (index, samples) = MapBuilder::ambient_lumps(ambient);
            lumps.push((Lump::LeafAmbientIndex, 0, index));
            lumps.push((Lump::LeafAmbientLighting, 1, samples));
        }

        if let Some(ambient) = &self.ambient_hdr {
            let (index, samples) = MapBuilder::ambient_lumps(ambient);
            lumps.push((Lump::LeafAmbientIndexHdr, 0, index));
            lumps.push((Lump::LeafAmbientLightingHdr, 1, samples));
        }

        for (lump, version, data) in self.overrides.iter() {
            lumps.retain(|(l, _, _)| l != lump);
            lumps.push((*lump, *version, data.clone()));
        }

        let mut entries = [(0i32, 0i32, 0i32); HEADER_LUMPS];
        let mut body = vec![];
        for (lump, version, data) in lumps {
            if data.is_empty() {
                continue;
            }
            entries[lump.index()] = (
                (HEADER_LEN + body.len()) as i32,
                data.len() as i32,
                version,
            );
            body.extend(data);
            while body.len() % 4 != 0 {
                body.push(0);
            }
        }

        let mut out = Vec::with_capacity(HEADER_LEN + body.len());
        out.extend_from_slice(b"VBSP");
        out.extend_from_slice(&self.version.to_le_bytes());
        for (offset, length, version) in entries.iter() {
            out.extend_from_slice(&offset.to_le_bytes());
            out.extend_from_slice(&length.to_le_bytes());
            out.extend_from_slice(&version.to_le_bytes());
            out.extend_from_slice(&[0; 4]);
        }
        out.extend_from_slice(&self.map_revision.to_le_bytes());
        out.extend(body);

        out
    }
}

/// Two rooms either side of the plane x = 0, each its own cluster, that can see each other.
///
/// * leaf 0: solid, in the void and not part of the tree
/// * leaf 1: room A, x < 0, on-disk cluster 0, face 0
/// * leaf 2: room B, x > 0, on-disk cluster 1, face 1
///
/// Each room is 512 x 512 x 512 source units.
pub fn two_room_map() -> MapBuilder {
    let mut builder = MapBuilder::new();
    builder
        .entities("{\n\"classname\" \"worldspawn\"\n}\n")
        .plane([1.0, 0.0, 0.0], 0.0)
        .face(0, 512.0 * 512.0)
        .face(0, 512.0 * 512.0)
        .leaf(LeafSpec {
            contents: 1,
            ..LeafSpec::default()
        })
        .leaf(LeafSpec {
            cluster: 0,
            mins: [-512, -256, -256],
            maxs: [0, 256, 256],
            faces: vec![0],
            ..LeafSpec::default()
        })
        .leaf(LeafSpec {
            cluster: 1,
            mins: [0, -256, -256],
            maxs: [512, 256, 256],
            faces: vec![1],
            ..LeafSpec::default()
        })
        .node(
            0,
            NodeRef::Leaf(2),
            NodeRef::Leaf(1),
            [-512, -256, -256],
            [512, 256, 256],
        )
        .model([-512.0, -256.0, -256.0], [512.0, 256.0, 256.0], 0)
        .vis(vec![Some(vec![true, true]), Some(vec![true, true])]);

    builder
}
