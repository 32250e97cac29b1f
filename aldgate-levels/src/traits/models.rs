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
use std::ops::Range;

/// A group of faces with its own subtree. Model 0 is the world, the rest are brush entities.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub mins: Vector3,
    pub maxs: Vector3,
    pub origin: Vector3,
    pub head_node: u32,
    pub faces_idx: Range<u32>,
}

impl Model {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.mins, self.maxs)
    }
}

pub trait HasModels {
    type ModelsIter<'a>: Iterator<Item = &'a Model>
    where
        Self: 'a;

    fn models_iter(&self) -> Self::ModelsIter<'_>;
    fn get_model(&self, index: u32) -> Option<&Model>;
}
