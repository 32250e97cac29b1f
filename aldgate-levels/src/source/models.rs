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
use crate::helpers::{slice_to_i32, slice_to_vec3};
use crate::traits::models::*;
use crate::types::{ParseError, Result};

const MODEL_SIZE: usize = (4 * 3 * 3) + (4 * 3);

/// Parse the models lump, checking head nodes and face ranges against the rest of the file.
pub fn from_data(data: &[u8], n_nodes: u32, n_faces: u32) -> Result<Box<[Model]>> {
    if data.len() % MODEL_SIZE != 0 {
        return Err(ParseError::Invalid("models lump size"));
    }

    let mut models = Vec::with_capacity(data.len() / MODEL_SIZE);
    for raw in data.chunks_exact(MODEL_SIZE) {
        let head_node = slice_to_i32(&raw[36..40]);
        if head_node < 0 || head_node as u32 >= n_nodes {
            return Err(ParseError::Invalid("model head node"));
        }

        let faces_idx = {
            let start = slice_to_i32(&raw[40..44]);
            let n = slice_to_i32(&raw[44..48]);
            if start < 0 || n < 0 || start as u64 + n as u64 > n_faces as u64 {
                return Err(ParseError::Invalid("model face range"));
            }

            Range {
                start: start as u32,
                end: (start + n) as u32,
            }
        };

        models.push(Model {
            mins: slice_to_vec3(&raw[0..12]),
            maxs: slice_to_vec3(&raw[12..24]),
            origin: slice_to_vec3(&raw[24..36]),
            head_node: head_node as u32,
            faces_idx,
        });
    }

    Ok(models.into_boxed_slice())
}

impl<S: CoordSystem> HasModels for BspFile<S> {
    type ModelsIter<'a> = std::slice::Iter<'a, Model> where Self: 'a;

    fn models_iter(&self) -> Self::ModelsIter<'_> {
        self.models.iter()
    }

    fn get_model(&self, index: u32) -> Option<&Model> {
        self.models.get(index as usize)
    }
}
