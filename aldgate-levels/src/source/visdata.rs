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

//! The visibility lump, kept compressed until a table is built from it

use crate::helpers::slice_to_i32;
use crate::pvs::VisKind;
use crate::types::{ParseError, Result};

/// The raw visibility lump.
/// Row offsets are relative to the start of `data`, which is the whole lump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisLump {
    pub num_clusters: u32,

    /// `[pvs, phs]` per cluster
    pub offsets: Box<[[i32; 2]]>,
    pub data: Box<[u8]>,
}

impl VisLump {
    pub fn is_empty(&self) -> bool {
        self.num_clusters == 0
    }

    /// The row offsets for the given kind of set, one per cluster.
    pub fn offsets(&self, kind: VisKind) -> Vec<i32> {
        let column = match kind {
            VisKind::Pvs => 0,
            VisKind::Phs => 1,
        };

        self.offsets.iter().map(|pair| pair[column]).collect()
    }
}

/// Read the cluster count and offset table. The rows themselves stay compressed.
/// # Format
/// int num_clusters
/// int[num_clusters][2] offsets
/// ubyte[] rle rows
pub fn from_data(data: &[u8]) -> Result<VisLump> {
    if data.is_empty() {
        return Ok(VisLump::default());
    }

    if data.len() < 4 {
        return Err(ParseError::Invalid("visibility lump size"));
    }

    let num_clusters = slice_to_i32(&data[0..4]);
    if num_clusters < 0 || 4 + (num_clusters as u64 * 8) > data.len() as u64 {
        return Err(ParseError::Invalid("visibility cluster count"));
    }

    let offsets = data[4..4 + num_clusters as usize * 8]
        .chunks_exact(8)
        .map(|raw| [slice_to_i32(&raw[0..4]), slice_to_i32(&raw[4..8])])
        .collect();

    Ok(VisLump {
        num_clusters: num_clusters as u32,
        offsets,
        data: data.into(),
    })
}
