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

//! Bounding volumes used for culling queries.

use crate::Vector3;

/// An axis-aligned bounding box. Boxes that only touch still intersect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub mins: Vector3,
    pub maxs: Vector3,
}

impl Aabb {
    /// Create a box from two opposite corners, in any order.
    pub fn new(a: Vector3, b: Vector3) -> Aabb {
        Aabb {
            mins: a.inf(&b),
            maxs: a.sup(&b),
        }
    }

    /// A box of the given half-size around `center`.
    pub fn from_center(center: Vector3, half_extents: Vector3) -> Aabb {
        Aabb::new(center - half_extents, center + half_extents)
    }

    pub fn center(&self) -> Vector3 {
        (self.mins + self.maxs) * 0.5
    }

    /// Size of the box along each axis.
    pub fn extents(&self) -> Vector3 {
        self.maxs - self.mins
    }

    pub fn contains_point(&self, point: &Vector3) -> bool {
        (0..3).all(|i| point[i] >= self.mins[i] && point[i] <= self.maxs[i])
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        (0..3).all(|i| self.mins[i] <= other.maxs[i] && self.maxs[i] >= other.mins[i])
    }

    /// The point inside the box closest to `point`.
    pub fn closest_point(&self, point: &Vector3) -> Vector3 {
        point.sup(&self.mins).inf(&self.maxs)
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            mins: self.mins.inf(&other.mins),
            maxs: self.maxs.sup(&other.maxs),
        }
    }

    /// Scale both corners, used when converting between unit systems.
    pub fn scaled(&self, factor: f32) -> Aabb {
        Aabb::new(self.mins * factor, self.maxs * factor)
    }
}

/// A volume tested against leaf bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundingVolume {
    Box(Aabb),
    Sphere { center: Vector3, radius: f32 },
}

impl BoundingVolume {
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        match self {
            BoundingVolume::Box(b) => b.intersects(aabb),
            BoundingVolume::Sphere { center, radius } => {
                let closest = aabb.closest_point(center);
                (closest - center).norm_squared() <= radius * radius
            }
        }
    }

    /// The tightest box enclosing this volume.
    pub fn bounds(&self) -> Aabb {
        match self {
            BoundingVolume::Box(b) => *b,
            BoundingVolume::Sphere { center, radius } => {
                Aabb::from_center(*center, Vector3::repeat(*radius))
            }
        }
    }
}

impl From<Aabb> for BoundingVolume {
    fn from(aabb: Aabb) -> Self {
        BoundingVolume::Box(aabb)
    }
}
