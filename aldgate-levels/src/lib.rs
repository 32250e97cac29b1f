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

//! Parsing data from Source-format (VBSP) levels, and the point location and
//! visibility structures built from them.

pub mod bsp;
pub mod coords;
pub mod features;
mod helpers;
pub mod pvs;
pub mod source;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod traits;
pub mod types;

pub use bsp::BspTree;
pub use features::SpatialIndex;
pub use pvs::VisibilityTable;
pub use source::BspFile;

pub mod prelude {
    pub use crate::coords::{CoordSystem, SourceUnits, WorldUnits};
    pub use crate::features::MinVisFeatures;
    pub use crate::traits::*;
}
