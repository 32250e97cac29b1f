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

use std::iter::Iterator;

/// A 1-based cluster id. 0 is the void, which sees and is seen by everything.
pub type ClusterId = u32;

pub trait HasVisData {
    /// The iterator returned from all_visible_from
    type VisibleIterator<'a>: Iterator<Item = ClusterId>
    where
        Self: 'a;

    /// False when some or all clusters had no visibility information, and are
    /// treated as seeing everything.
    fn has_pvs_data(&self) -> bool;

    /// Returns an iterator of all clusters visible from the given Cluster ID
    fn all_visible_from(&self, from: ClusterId) -> Self::VisibleIterator<'_>;

    /// Returns true if `dest` is visible from `from`.
    fn cluster_visible_from(&self, from: ClusterId, dest: ClusterId) -> bool;
}
