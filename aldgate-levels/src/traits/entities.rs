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
use std::collections::HashMap;
use std::iter::Iterator;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entity {
    pub attributes: HashMap<String, String>,
}

impl Entity {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn classname(&self) -> Option<&str> {
        self.get("classname")
    }

    /// A single float value, eg `"_cone" "45"`.
    pub fn get_f32(&self, key: &str) -> Option<f32> {
        self.get(key)?.trim().parse().ok()
    }

    /// Whitespace separated floats, eg `"_light" "255 255 255 200"`.
    pub fn get_floats(&self, key: &str) -> Option<Vec<f32>> {
        self.get(key)?
            .split_whitespace()
            .map(|x| x.parse().ok())
            .collect()
    }

    /// A vector value, eg `"origin" "0 128 -64"`.
    pub fn get_vector(&self, key: &str) -> Option<Vector3> {
        match self.get_floats(key)?.as_slice() {
            [x, y, z, ..] => Some(Vector3::new(*x, *y, *z)),
            _ => None,
        }
    }
}

pub trait HasEntities {
    type EntitiesIter<'a>: Iterator<Item = &'a Entity>
    where
        Self: 'a;

    fn entities_iter(&self) -> Self::EntitiesIter<'_>;
}
