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

//! Marker traits for the unit systems a level can be expressed in, and functions to rescale between them

use aldgate_types::Vector3;

/// Source units in one world unit. Every length read from disk is divided by this.
pub const SOURCE_UNITS_PER_WORLD_UNIT: f32 = 16.0;

pub trait CoordSystem {
    /// How many of this system's units make up one world unit.
    const UNITS_PER_WORLD_UNIT: f32;
}

/// Lengths as stored on disk.
#[derive(Debug, Clone, Copy)]
pub struct SourceUnits;
impl CoordSystem for SourceUnits {
    const UNITS_PER_WORLD_UNIT: f32 = SOURCE_UNITS_PER_WORLD_UNIT;
}

/// Lengths as the rest of the engine uses them.
#[derive(Debug, Clone, Copy)]
pub struct WorldUnits;
impl CoordSystem for WorldUnits {
    const UNITS_PER_WORLD_UNIT: f32 = 1.0;
}

pub struct Rescaler;

pub trait RescaleFromTo<F: CoordSystem, T: CoordSystem> {
    /// Multiply lengths in `F` by this to get lengths in `T`.
    fn factor() -> f32 {
        T::UNITS_PER_WORLD_UNIT / F::UNITS_PER_WORLD_UNIT
    }

    fn rescale(vec: &mut Vector3) {
        *vec *= Self::factor();
    }

    fn rescale_length(len: &mut f32) {
        *len *= Self::factor();
    }
}

impl RescaleFromTo<SourceUnits, WorldUnits> for Rescaler {}
impl RescaleFromTo<WorldUnits, SourceUnits> for Rescaler {}

/// Convert a point given in source units, such as an entity origin, to world units.
pub fn source_to_world(vec: Vector3) -> Vector3 {
    vec / SOURCE_UNITS_PER_WORLD_UNIT
}
