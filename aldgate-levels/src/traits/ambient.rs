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

use aldgate_types::Vector3;

use crate::types::ColorRgbExp32;

/// Irradiance from the six axis directions, in the order +X, -X, +Y, -Y, +Z, -Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientCube {
    pub faces: [Vector3; 6],
}

impl AmbientCube {
    /// The same colour on every face.
    pub fn uniform(value: f32) -> AmbientCube {
        AmbientCube {
            faces: [Vector3::repeat(value); 6],
        }
    }

    /// Decode a 24 byte compressed light cube.
    /// # Panics
    /// If slice is shorter than 24 bytes.
    pub fn from_compressed(slice: &[u8]) -> AmbientCube {
        let mut faces = [Vector3::zeros(); 6];
        for (i, face) in faces.iter_mut().enumerate() {
            *face = ColorRgbExp32::from_slice(&slice[i * 4..i * 4 + 4]).to_linear();
        }

        AmbientCube { faces }
    }

    /// Irradiance arriving at a surface with the given unit normal.
    /// Each axis contributes by the square of the normal's component along it.
    pub fn evaluate(&self, normal: &Vector3) -> Vector3 {
        let sq = normal.component_mul(normal);
        let pick = |axis: usize| {
            if normal[axis] < 0.0 {
                self.faces[axis * 2 + 1]
            } else {
                self.faces[axis * 2]
            }
        };

        pick(0) * sq.x + pick(1) * sq.y + pick(2) * sq.z
    }

    /// Mean colour over all faces.
    pub fn average(&self) -> Vector3 {
        self.faces.iter().sum::<Vector3>() / 6.0
    }
}

/// Where a leaf's samples live in the sample array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LeafAmbientIndex {
    pub sample_count: u16,
    pub first_sample: u16,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafAmbientSample {
    pub cube: AmbientCube,

    /// Position within the owning leaf's bounds, where 0 is mins and 255 is maxs.
    pub position: [u8; 3],
}

/// Per leaf ambient lighting, as baked by the lighting compiler.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LeafAmbient {
    pub index: Box<[LeafAmbientIndex]>,
    pub samples: Box<[LeafAmbientSample]>,
}

impl LeafAmbient {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples baked in the given leaf.
    pub fn samples_for_leaf(&self, leaf: u32) -> &[LeafAmbientSample] {
        match self.index.get(leaf as usize) {
            Some(idx) => {
                let start = idx.first_sample as usize;
                let end = start + idx.sample_count as usize;
                self.samples.get(start..end).unwrap_or(&[])
            }
            None => &[],
        }
    }
}

pub trait HasLeafAmbient {
    /// The HDR samples if asked for and present, otherwise the LDR ones.
    fn leaf_ambient(&self, prefer_hdr: bool) -> &LeafAmbient;
}
