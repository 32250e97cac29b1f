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

use super::BspFile;
use crate::coords::CoordSystem;
use crate::helpers::slice_to_u16;
use crate::traits::ambient::*;
use crate::types::{ParseError, Result};

const INDEX_SIZE: usize = 4;
const SAMPLE_SIZE: usize = 24 + 4;

/// Parse a leaf ambient index lump and its matching lighting lump.
/// Each index entry must point at samples that exist.
pub fn from_data(index: &[u8], lighting: &[u8]) -> Result<LeafAmbient> {
    if index.len() % INDEX_SIZE != 0 {
        return Err(ParseError::Invalid("leaf ambient index lump size"));
    }
    if lighting.len() % SAMPLE_SIZE != 0 {
        return Err(ParseError::Invalid("leaf ambient lighting lump size"));
    }

    let samples: Box<[LeafAmbientSample]> = lighting
        .chunks_exact(SAMPLE_SIZE)
        .map(|raw| LeafAmbientSample {
            cube: AmbientCube::from_compressed(&raw[0..24]),
            position: [raw[24], raw[25], raw[26]],
        })
        .collect();

    let index: Box<[LeafAmbientIndex]> = index
        .chunks_exact(INDEX_SIZE)
        .map(|raw| LeafAmbientIndex {
            sample_count: slice_to_u16(&raw[0..2]),
            first_sample: slice_to_u16(&raw[2..4]),
        })
        .collect();

    for idx in index.iter() {
        if idx.first_sample as usize + idx.sample_count as usize > samples.len() {
            return Err(ParseError::Invalid("leaf ambient sample range"));
        }
    }

    Ok(LeafAmbient { index, samples })
}

impl<S: CoordSystem> HasLeafAmbient for BspFile<S> {
    fn leaf_ambient(&self, prefer_hdr: bool) -> &LeafAmbient {
        if prefer_hdr && !self.ambient_hdr.is_empty() {
            &self.ambient_hdr
        } else {
            &self.ambient_ldr
        }
    }
}
