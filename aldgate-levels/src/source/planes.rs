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
use crate::helpers::{slice_to_f32, slice_to_i32, slice_to_vec3};
use crate::traits::planes::*;
use crate::types::{ParseError, Result};

/// The size of one plane record.
const PLANE_SIZE: usize = (4 * 3) + 4 + 4;

/// Parse a lump of planes.
/// A lump is (data length / plane size) planes long
pub fn from_data(data: &[u8]) -> Result<Box<[Plane]>> {
    if data.len() % PLANE_SIZE != 0 {
        return Err(ParseError::Invalid("planes lump size"));
    }

    Ok(data
        .chunks_exact(PLANE_SIZE)
        .map(|raw| Plane {
            normal: slice_to_vec3(&raw[0..12]),
            dist: slice_to_f32(&raw[12..16]),
            plane_type: PlaneType::from_raw(slice_to_i32(&raw[16..20])),
        })
        .collect())
}

impl<S: CoordSystem> HasPlanes for BspFile<S> {
    type PlanesIter<'a> = std::slice::Iter<'a, Plane> where Self: 'a;

    fn planes_iter(&self) -> Self::PlanesIter<'_> {
        self.planes.iter()
    }

    fn get_plane(&self, idx: u32) -> Option<&Plane> {
        self.planes.get(idx as usize)
    }
}
