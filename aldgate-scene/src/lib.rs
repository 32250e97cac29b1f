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

//! Visibility tracking and ambient lighting for a loaded level.
//!
//! [`LevelContext`] is the entry point: it owns at most one [`Level`], and answers
//! point location, PVS and lighting queries against it.

pub mod config;
pub mod culling;
pub mod error;
pub mod level;
pub mod lighting;

pub use config::{LevelConfig, LevelConfigBuilder};
pub use culling::{LeafVisibilityTracker, VisibleLeaf, VisibleLeafSet};
pub use level::{Level, LevelContext};
pub use lighting::{AmbientLightIndex, LightingSample};
