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
use std::iter::Iterator;

/// Which axis, if any, a plane's normal lies along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneType {
    X,
    Y,
    Z,
    /// Non-axial, closest to the given axis.
    AnyX,
    AnyY,
    AnyZ,
}

impl PlaneType {
    /// Unknown values are treated as non-axial.
    pub fn from_raw(raw: i32) -> PlaneType {
        match raw {
            0 => PlaneType::X,
            1 => PlaneType::Y,
            2 => PlaneType::Z,
            3 => PlaneType::AnyX,
            4 => PlaneType::AnyY,
            _ => PlaneType::AnyZ,
        }
    }

    /// The axis index for axial planes.
    pub fn axis(self) -> Option<usize> {
        match self {
            PlaneType::X => Some(0),
            PlaneType::Y => Some(1),
            PlaneType::Z => Some(2),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Plane normal
    pub normal: Vector3,

    /// Distance from origin to plane along normal
    pub dist: f32,

    pub plane_type: PlaneType,
}

impl Plane {
    /// Signed distance from the plane to `point`. Positive is in front.
    #[inline]
    pub fn distance(&self, point: &Vector3) -> f32 {
        match self.plane_type.axis() {
            Some(axis) => self.normal[axis] * point[axis] - self.dist,
            None => self.normal.dot(point) - self.dist,
        }
    }
}

pub trait HasPlanes {
    type PlanesIter<'a>: Iterator<Item = &'a Plane>
    where
        Self: 'a;

    fn planes_iter(&self) -> Self::PlanesIter<'_>;
    fn get_plane(&self, idx: u32) -> Option<&Plane>;
}
